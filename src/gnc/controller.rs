use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::docking::{DockingState, PortGeometry};

/// Commanded accelerations for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlCommand {
    pub acceleration: Vector3<f64>,         // m/s^2, station frame
    pub angular_acceleration_deg_s2: Vector3<f64>,
}

impl ControlCommand {
    /// Scale each vector down to its magnitude limit, keeping direction.
    pub fn clamped(self, max_acceleration: f64, max_angular_acceleration: f64) -> Self {
        Self {
            acceleration: clamp_norm(self.acceleration, max_acceleration),
            angular_acceleration_deg_s2: clamp_norm(
                self.angular_acceleration_deg_s2,
                max_angular_acceleration,
            ),
        }
    }
}

pub fn clamp_norm(v: Vector3<f64>, max: f64) -> Vector3<f64> {
    let norm = v.norm();
    if norm > max && norm > 0.0 {
        v * (max / norm)
    } else {
        v
    }
}

/// Trait for proximity-operations controllers.
///
/// Implement this to plug a custom control law into the docking
/// simulator.
pub trait ProximityController: Send {
    /// Compute the command from the current relative state and target port.
    fn command(&mut self, state: &DockingState, port: &PortGeometry, dt: f64) -> ControlCommand;

    /// Reset controller internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// No thrusting at all; the chaser follows the natural relative motion.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeDrift;

impl ProximityController for FreeDrift {
    fn command(&mut self, _state: &DockingState, _port: &PortGeometry, _dt: f64) -> ControlCommand {
        ControlCommand::default()
    }

    fn name(&self) -> &str {
        "FreeDrift"
    }
}
