use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Earth gravity field constants (ECI)
// ---------------------------------------------------------------------------

pub const MU_EARTH: f64 = 3.986_004_418e14; // m^3/s^2
pub const R_EARTH: f64 = 6_378_137.0; // equatorial radius, m
pub const J2_EARTH: f64 = 1.082_629_82e-3;
pub const G0: f64 = 9.80665; // standard gravity, m/s^2

/// Which terms of the gravity field the propagator integrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityModel {
    /// Keplerian two-body only.
    PointMass,
    /// Two-body plus the J2 oblateness term.
    #[default]
    J2,
}

impl GravityModel {
    pub fn acceleration(&self, pos: &Vector3<f64>) -> Vector3<f64> {
        match self {
            Self::PointMass => gravity_pointmass_eci(pos),
            Self::J2 => gravity_j2_eci(pos),
        }
    }
}

/// Point-mass gravity in ECI.
pub fn gravity_pointmass_eci(pos: &Vector3<f64>) -> Vector3<f64> {
    let r = pos.norm();
    if r < 1.0 {
        return Vector3::zeros();
    }
    -MU_EARTH / (r * r * r) * pos
}

/// Two-body plus J2 acceleration in ECI.
/// `pos` is the position vector in ECI coordinates (m).
pub fn gravity_j2_eci(pos: &Vector3<f64>) -> Vector3<f64> {
    gravity_pointmass_eci(pos) + j2_perturbation(pos)
}

/// J2 correction alone, closed form in x, y, z and r.
pub fn j2_perturbation(pos: &Vector3<f64>) -> Vector3<f64> {
    let r = pos.norm();
    if r < 1.0 {
        return Vector3::zeros();
    }
    let r2 = r * r;
    let z2_r2 = pos.z * pos.z / r2;
    let factor = 1.5 * J2_EARTH * MU_EARTH * R_EARTH * R_EARTH / (r2 * r2 * r);

    Vector3::new(
        factor * pos.x * (5.0 * z2_r2 - 1.0),
        factor * pos.y * (5.0 * z2_r2 - 1.0),
        factor * pos.z * (5.0 * z2_r2 - 3.0),
    )
}

/// Circular orbit speed at radius `r` (m).
pub fn circular_velocity(r: f64) -> f64 {
    circular_velocity_mu(r, MU_EARTH)
}

pub fn circular_velocity_mu(r: f64, mu: f64) -> f64 {
    (mu / r).sqrt()
}

/// Vis-viva: speed at radius `r` on a conic of semi-major axis `a`.
pub fn vis_viva(r: f64, a: f64) -> f64 {
    (MU_EARTH * (2.0 / r - 1.0 / a)).sqrt()
}
