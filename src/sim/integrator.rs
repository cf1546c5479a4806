use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta for second-order translational dynamics
// ---------------------------------------------------------------------------

/// Single RK4 step of `r' = v, v' = accel(r, v)`.
///
/// The same acceleration function is evaluated at all four stages; any
/// control input is captured by the closure and held constant over the step.
pub fn rk4_step<F>(
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    dt: f64,
    accel: F,
) -> (Vector3<f64>, Vector3<f64>)
where
    F: Fn(&Vector3<f64>, &Vector3<f64>) -> Vector3<f64>,
{
    let k1_dr = *vel;
    let k1_dv = accel(pos, vel);

    let p2 = pos + k1_dr * (dt * 0.5);
    let v2 = vel + k1_dv * (dt * 0.5);
    let k2_dr = v2;
    let k2_dv = accel(&p2, &v2);

    let p3 = pos + k2_dr * (dt * 0.5);
    let v3 = vel + k2_dv * (dt * 0.5);
    let k3_dr = v3;
    let k3_dv = accel(&p3, &v3);

    let p4 = pos + k3_dr * dt;
    let v4 = vel + k3_dv * dt;
    let k4_dr = v4;
    let k4_dv = accel(&p4, &v4);

    (
        pos + (k1_dr + 2.0 * k2_dr + 2.0 * k3_dr + k4_dr) * (dt / 6.0),
        vel + (k1_dv + 2.0 * k2_dv + 2.0 * k3_dv + k4_dv) * (dt / 6.0),
    )
}
