use std::f64::consts::{PI, TAU};

use chrono::{DateTime, TimeZone, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::gravity::R_EARTH;

/// Sidereal rotation rate of the Earth, rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292_115_9e-5;
pub const SIDEREAL_DAY: f64 = 86_164.0905; // s

/// J2000 reference epoch, 2000-01-01T12:00:00 UTC.
pub fn j2000() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Days elapsed since J2000 (fractional).
pub fn days_since_j2000(epoch: &DateTime<Utc>) -> f64 {
    let dt = epoch.signed_duration_since(j2000());
    dt.num_milliseconds() as f64 / 86_400_000.0
}

/// Greenwich Mean Sidereal Time, rad in [0, 2pi).
pub fn gmst(epoch: &DateTime<Utc>) -> f64 {
    let hours = (18.697_374_558 + 24.065_709_824_419_08 * days_since_j2000(epoch)).rem_euclid(24.0);
    hours * PI / 12.0
}

/// Spherical-Earth geodetic coordinates of a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

/// Rotate an ECI position into the Earth-fixed frame and return latitude,
/// longitude (in [-180, 180)) and altitude above the equatorial radius.
pub fn eci_to_ground(pos: &Vector3<f64>, epoch: &DateTime<Utc>) -> GroundPoint {
    let r = pos.norm();
    let latitude = if r > 0.0 { (pos.z / r).clamp(-1.0, 1.0).asin() } else { 0.0 };
    let lon_inertial = pos.y.atan2(pos.x);
    let longitude = wrap_pi(lon_inertial - gmst(epoch));

    GroundPoint {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_m: r - R_EARTH,
    }
}

/// Eastward surface speed due to Earth rotation at a latitude, m/s.
pub fn surface_rotation_speed(latitude_rad: f64) -> f64 {
    EARTH_ROTATION_RATE * R_EARTH * latitude_rad.cos()
}

/// Wrap an angle into [0, 2pi).
pub fn wrap_two_pi(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Wrap an angle into [-pi, pi).
pub fn wrap_pi(angle: f64) -> f64 {
    wrap_two_pi(angle + PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn gmst_at_j2000() {
        // 18.697374558 h = 280.46 deg
        let g = gmst(&j2000()).to_degrees();
        assert!((g - 280.460_618_37).abs() < 1e-6, "got {}", g);
    }

    #[test]
    fn gmst_advances_one_turn_per_sidereal_day() {
        let t0 = j2000();
        let t1 = t0 + Duration::milliseconds((SIDEREAL_DAY * 1000.0) as i64);
        let diff = wrap_pi(gmst(&t1) - gmst(&t0));
        assert!(diff.abs() < 1e-5, "got {}", diff);
    }

    #[test]
    fn ground_point_over_pole() {
        let pos = Vector3::new(0.0, 0.0, R_EARTH + 1000.0);
        let g = eci_to_ground(&pos, &j2000());
        assert!((g.latitude_deg - 90.0).abs() < 1e-9);
        assert!((g.altitude_m - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn longitude_accounts_for_rotation() {
        let epoch = j2000();
        let theta = gmst(&epoch);
        // A point aligned with the Greenwich meridian sits at longitude zero
        let pos = Vector3::new(theta.cos(), theta.sin(), 0.0) * (R_EARTH + 400_000.0);
        let g = eci_to_ground(&pos, &epoch);
        assert!(g.longitude_deg.abs() < 1e-9, "got {}", g.longitude_deg);
        assert!(g.latitude_deg.abs() < 1e-9);
    }

    #[test]
    fn wrapping() {
        assert!((wrap_two_pi(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((wrap_pi(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!(wrap_pi(PI) < PI);
    }
}
