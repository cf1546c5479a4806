use serde::{Deserialize, Serialize};

use super::controller::{ControlCommand, ProximityController};
use super::pid::Pid;
use crate::docking::{DockingState, PortGeometry};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Docking controller: translation PD toward the port + attitude PD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingGains {
    pub position_kp: f64,  // 1/s^2
    pub position_ki: f64,  // 1/s^3, off by default
    /// Per-axis bound on the accumulated position error, m*s.
    pub integral_limit: f64,
    pub velocity_kd: f64,  // 1/s
    pub attitude_kp: f64,  // 1/s^2
    pub rate_kd: f64,      // 1/s
}

impl Default for DockingGains {
    fn default() -> Self {
        Self {
            // Tuned for a 200 m approach under a 0.1 m/s^2 thruster limit
            position_kp: 4e-4,
            position_ki: 0.0,
            integral_limit: 50.0,
            velocity_kd: 0.04,
            attitude_kp: 0.04,
            rate_kd: 0.4,
        }
    }
}

impl DockingGains {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("position_kp", self.position_kp),
            ("position_ki", self.position_ki),
            ("integral_limit", self.integral_limit),
            ("velocity_kd", self.velocity_kd),
            ("attitude_kp", self.attitude_kp),
            ("rate_kd", self.rate_kd),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "docking.gains.{} must be finite and >= 0, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

/// Drives the chaser to rest at the port with its body axes in the
/// port's mating orientation.
#[derive(Debug, Clone)]
pub struct DockingController {
    pub translation: Pid,
    pub attitude: Pid,
}

impl DockingController {
    pub fn new(gains: &DockingGains) -> Self {
        Self {
            translation: Pid::new(gains.position_kp, gains.position_ki, gains.velocity_kd)
                .with_integral_limit(gains.integral_limit),
            attitude: Pid::new(gains.attitude_kp, 0.0, gains.rate_kd),
        }
    }
}

impl Default for DockingController {
    fn default() -> Self {
        Self::new(&DockingGains::default())
    }
}

impl ProximityController for DockingController {
    fn command(&mut self, state: &DockingState, port: &PortGeometry, dt: f64) -> ControlCommand {
        let position_error = port.offset - state.position;
        let velocity_error = -state.velocity;
        let acceleration = self.translation.update(&position_error, &velocity_error, dt);

        let attitude_error = port.orientation_deg - state.attitude_deg;
        let rate_error = -state.angular_rate_deg_s;
        let angular = self.attitude.update(&attitude_error, &rate_error, dt);

        ControlCommand {
            acceleration,
            angular_acceleration_deg_s2: angular,
        }
    }

    fn reset(&mut self) {
        self.translation.reset();
        self.attitude.reset();
    }

    fn name(&self) -> &str {
        "DockingController"
    }
}
