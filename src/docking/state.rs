use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::port::DockingPort;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DockingPhase {
    Approach,
    Proximity,
    FinalApproach,
    Contact,
    Capture,
    Retraction,
    HardDock,
    Abort,
}

impl DockingPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::HardDock | Self::Abort)
    }
}

impl fmt::Display for DockingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Approach => "APPROACH",
            Self::Proximity => "PROXIMITY",
            Self::FinalApproach => "FINAL_APPROACH",
            Self::Contact => "CONTACT",
            Self::Capture => "CAPTURE",
            Self::Retraction => "RETRACTION",
            Self::HardDock => "HARD_DOCK",
            Self::Abort => "ABORT",
        };
        f.write_str(s)
    }
}

/// Chaser state in the station frame (x radial, y along-track, z cross-track).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockingState {
    pub position: Vector3<f64>,           // m
    pub velocity: Vector3<f64>,           // m/s
    pub attitude_deg: Vector3<f64>,       // roll, pitch, yaw
    pub angular_rate_deg_s: Vector3<f64>,
    pub phase: DockingPhase,
}

impl DockingState {
    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.velocity.iter())
            .chain(self.attitude_deg.iter())
            .chain(self.angular_rate_deg_s.iter())
            .all(|c| c.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbortReason {
    /// Closing too fast when entering the contact zone.
    ExcessiveApproachSpeed { speed: f64, limit: f64 },
    /// Drifted away from the port after contact.
    LostContact { distance: f64 },
    /// Relative state became NaN or infinite.
    NumericalDivergence,
    /// External abort request.
    Commanded { reason: String },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcessiveApproachSpeed { speed, limit } => write!(
                f,
                "excessive approach speed {:.3} m/s (limit {:.3} m/s)",
                speed, limit
            ),
            Self::LostContact { distance } => {
                write!(f, "lost contact, {:.2} m from port", distance)
            }
            Self::NumericalDivergence => write!(f, "non-finite relative state"),
            Self::Commanded { reason } => write!(f, "commanded: {}", reason),
        }
    }
}

/// Capture tolerances, range-checked by [`DockingParameters::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingParameters {
    pub approach_velocity_limit: f64,      // m/s
    pub max_lateral_offset: f64,           // m
    pub max_angular_misalignment_deg: f64,
    pub contact_force_limit: f64,          // N
}

impl Default for DockingParameters {
    fn default() -> Self {
        Self {
            approach_velocity_limit: 0.1,
            max_lateral_offset: 0.05,
            max_angular_misalignment_deg: 2.0,
            contact_force_limit: 1_000.0,
        }
    }
}

impl DockingParameters {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("approach_velocity_limit", self.approach_velocity_limit, 1.0),
            ("max_lateral_offset", self.max_lateral_offset, 1.0),
            ("max_angular_misalignment_deg", self.max_angular_misalignment_deg, 45.0),
            ("contact_force_limit", self.contact_force_limit, 100_000.0),
        ];
        for (name, value, max) in checks {
            if !(value.is_finite() && value > 0.0 && value <= max) {
                return Err(Error::InvalidConfig(format!(
                    "docking.{} must be in (0, {}], got {}",
                    name, max, value
                )));
            }
        }
        Ok(())
    }
}

/// Start of a docking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingInitialConditions {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub attitude_deg: Vector3<f64>,
    pub angular_rate_deg_s: Vector3<f64>,
    pub port: DockingPort,
}

impl Default for DockingInitialConditions {
    fn default() -> Self {
        Self {
            position: Vector3::new(-200.0, 0.0, 0.0),
            velocity: Vector3::new(0.1, 0.0, 0.0),
            attitude_deg: Vector3::zeros(),
            angular_rate_deg_s: Vector3::zeros(),
            port: DockingPort::HarmonyForward,
        }
    }
}

impl DockingInitialConditions {
    pub fn validate(&self) -> Result<()> {
        let all_finite = self
            .position
            .iter()
            .chain(self.velocity.iter())
            .chain(self.attitude_deg.iter())
            .chain(self.angular_rate_deg_s.iter())
            .all(|c| c.is_finite());
        if all_finite {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                name: "initial_conditions",
                reason: "non-finite component".into(),
            })
        }
    }

    pub fn state(&self) -> DockingState {
        DockingState {
            position: self.position,
            velocity: self.velocity,
            attitude_deg: self.attitude_deg,
            angular_rate_deg_s: self.angular_rate_deg_s,
            phase: DockingPhase::Approach,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(DockingPhase::HardDock.is_terminal());
        assert!(DockingPhase::Abort.is_terminal());
        assert!(!DockingPhase::Capture.is_terminal());
        assert_eq!(DockingPhase::FinalApproach.to_string(), "FINAL_APPROACH");
    }

    #[test]
    fn parameter_ranges() {
        assert!(DockingParameters::default().validate().is_ok());
        let p = DockingParameters { max_lateral_offset: -0.1, ..Default::default() };
        assert!(p.validate().is_err());
        let p = DockingParameters { approach_velocity_limit: f64::NAN, ..Default::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn abort_reason_serializes_tagged() {
        let json = serde_json::to_string(&AbortReason::LostContact { distance: 2.5 }).unwrap();
        assert!(json.contains("\"kind\":\"lost_contact\""));
    }
}
