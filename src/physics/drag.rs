use nalgebra::Vector3;

/// Quadratic drag acceleration opposing the relative velocity.
///
/// `coefficient` lumps density, drag coefficient, area and mass into a
/// single 1/m factor: `a = -k |v| v`.
pub fn drag_acceleration(vel: &Vector3<f64>, coefficient: f64) -> Vector3<f64> {
    let speed = vel.norm();
    if speed > 1e-12 {
        -vel * (coefficient * speed)
    } else {
        Vector3::zeros()
    }
}
