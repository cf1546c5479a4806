use nalgebra::Vector3;

use crate::physics::drag::drag_acceleration;
use crate::sim::integrator::rk4_step;

/// Mean motion of a ~400 km station orbit, rad/s.
pub const STATION_MEAN_MOTION: f64 = 0.001_027;

/// Hill-Clohessy-Wiltshire relative acceleration.
///
/// Station frame: x radial (outward), y along-track, z cross-track.
/// Linearised about a circular target orbit with mean motion `n`; only
/// valid for separations small compared with the orbit radius.
pub fn hcw_acceleration(pos: &Vector3<f64>, vel: &Vector3<f64>, n: f64) -> Vector3<f64> {
    let n2 = n * n;
    Vector3::new(
        3.0 * n2 * pos.x + 2.0 * n * vel.y,
        -2.0 * n * vel.x,
        -n2 * pos.z,
    )
}

/// Parameters of the translational model that stay fixed during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeDynamics {
    pub mean_motion: f64,      // rad/s
    pub drag_coefficient: f64, // 1/m
}

impl RelativeDynamics {
    pub fn acceleration(
        &self,
        pos: &Vector3<f64>,
        vel: &Vector3<f64>,
        control: &Vector3<f64>,
    ) -> Vector3<f64> {
        hcw_acceleration(pos, vel, self.mean_motion)
            + drag_acceleration(vel, self.drag_coefficient)
            + control
    }

    /// One RK4 step with the control acceleration held constant.
    pub fn step(
        &self,
        pos: &Vector3<f64>,
        vel: &Vector3<f64>,
        control: &Vector3<f64>,
        dt: f64,
    ) -> (Vector3<f64>, Vector3<f64>) {
        rk4_step(pos, vel, dt, |p, v| self.acceleration(p, v, control))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free() -> RelativeDynamics {
        RelativeDynamics { mean_motion: STATION_MEAN_MOTION, drag_coefficient: 0.0 }
    }

    #[test]
    fn vbar_offset_is_equilibrium() {
        let pos = Vector3::new(0.0, -50.0, 0.0);
        let (p, v) = free().step(&pos, &Vector3::zeros(), &Vector3::zeros(), 10.0);
        assert!((p - pos).norm() < 1e-12);
        assert!(v.norm() < 1e-12);
    }

    #[test]
    fn radial_offset_drifts_along_track() {
        // Below the target (x < 0) the chaser moves ahead in +y
        let mut pos = Vector3::new(-10.0, 0.0, 0.0);
        let mut vel = Vector3::zeros();
        for _ in 0..600 {
            (pos, vel) = free().step(&pos, &vel, &Vector3::zeros(), 1.0);
        }
        assert!(pos.y > 0.0, "y = {}", pos.y);
    }

    #[test]
    fn cross_track_oscillates_at_orbit_rate() {
        let n = STATION_MEAN_MOTION;
        let period = std::f64::consts::TAU / n;
        let steps = 2000;
        let dt = period / steps as f64;
        let mut pos = Vector3::new(0.0, 0.0, 5.0);
        let mut vel = Vector3::zeros();
        for _ in 0..steps {
            (pos, vel) = free().step(&pos, &vel, &Vector3::zeros(), dt);
        }
        assert!((pos.z - 5.0).abs() < 1e-6);
    }

    #[test]
    fn drag_opposes_motion() {
        let dyn_drag = RelativeDynamics { mean_motion: 0.0, drag_coefficient: 1e-8 };
        let a = dyn_drag.acceleration(&Vector3::zeros(), &Vector3::new(2.0, 0.0, 0.0), &Vector3::zeros());
        assert!((a.x + 4e-8).abs() < 1e-20);
    }
}
