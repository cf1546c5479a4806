use chrono::{DateTime, Duration, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::physics::earth::{eci_to_ground, GroundPoint};
use crate::physics::gravity::{MU_EARTH, R_EARTH};

/// Cartesian state at an epoch.
/// Frame: Earth-Centered Inertial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position: Vector3<f64>, // m
    pub velocity: Vector3<f64>, // m/s
    pub epoch: DateTime<Utc>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, epoch: DateTime<Utc>) -> Self {
        Self { position, velocity, epoch }
    }

    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn altitude(&self) -> f64 {
        self.radius() - R_EARTH
    }

    /// Specific orbital energy, J/kg.
    pub fn specific_energy(&self) -> f64 {
        0.5 * self.velocity.norm_squared() - MU_EARTH / self.radius()
    }

    /// Specific angular momentum vector, m^2/s.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
    }
}

/// One propagated sample with its ground-track projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub epoch: DateTime<Utc>,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub altitude_m: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl TrajectoryPoint {
    pub fn from_state(state: &StateVector) -> Self {
        let GroundPoint {
            latitude_deg,
            longitude_deg,
            altitude_m,
        } = eci_to_ground(&state.position, &state.epoch);
        Self {
            epoch: state.epoch,
            position: state.position,
            velocity: state.velocity,
            altitude_m,
            latitude_deg,
            longitude_deg,
        }
    }

    pub fn state(&self) -> StateVector {
        StateVector::new(self.position, self.velocity, self.epoch)
    }
}

/// Shift an epoch by a (fractional) number of seconds, microsecond resolution.
///
/// Fails when the offset is not finite or the result leaves the
/// representable calendar range.
pub fn offset_epoch(epoch: &DateTime<Utc>, seconds: f64) -> Result<DateTime<Utc>> {
    let out_of_range = || Error::InvalidParameter {
        name: "epoch offset",
        reason: format!("{} s from {} is outside the supported time range", seconds, epoch),
    };
    let micros = (seconds * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    epoch
        .checked_add_signed(Duration::microseconds(micros as i64))
        .ok_or_else(out_of_range)
}

/// Seconds from `from` to `to` (negative when `to` is earlier).
pub fn seconds_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> f64 {
    let d = to.signed_duration_since(*from);
    match d.num_microseconds() {
        Some(us) => us as f64 * 1e-6,
        None => d.num_milliseconds() as f64 * 1e-3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::earth::j2000;

    #[test]
    fn circular_energy() {
        let r = R_EARTH + 400_000.0;
        let v = (MU_EARTH / r).sqrt();
        let s = StateVector::new(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, v, 0.0), j2000());
        assert!((s.specific_energy() + MU_EARTH / (2.0 * r)).abs() < 1e-6);
        assert!((s.angular_momentum().z - r * v).abs() < 1e-3);
        assert!((s.altitude() - 400_000.0).abs() < 1e-6);
    }

    #[test]
    fn epoch_offsets() {
        let t0 = j2000();
        let t1 = offset_epoch(&t0, 90.5).unwrap();
        assert!((seconds_between(&t0, &t1) - 90.5).abs() < 1e-9);
        assert!((seconds_between(&t1, &t0) + 90.5).abs() < 1e-9);
    }

    #[test]
    fn epoch_offset_out_of_range() {
        let t0 = j2000();
        assert!(matches!(
            offset_epoch(&t0, 1e18),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(offset_epoch(&t0, -1e15).is_err());
        // Representable as a duration but past the calendar limit
        assert!(offset_epoch(&t0, 9e12).is_err());
        assert!(offset_epoch(&t0, f64::NAN).is_err());
    }

    #[test]
    fn trajectory_point_keeps_state() {
        let s = StateVector::new(
            Vector3::new(7_000_000.0, 1.0, 2.0),
            Vector3::new(0.0, 7500.0, 0.0),
            j2000(),
        );
        let p = TrajectoryPoint::from_state(&s);
        assert_eq!(p.state(), s);
        assert!((p.altitude_m - (s.radius() - R_EARTH)).abs() < 1e-9);
    }
}
