use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DockingMechanism {
    InternationalDockingAdapter,
    CommonBerthingMechanism,
}

/// Station docking ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DockingPort {
    #[default]
    HarmonyForward,
    HarmonyNadir,
    HarmonyZenith,
    UnityNadir,
}

/// Fixed geometry of a port in the station frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortGeometry {
    pub offset: Vector3<f64>,          // m, from station centre of mass
    /// Unit vector pointing out of the port, toward an approaching vehicle.
    pub approach_axis: Vector3<f64>,
    pub orientation_deg: Vector3<f64>, // roll, pitch, yaw
    pub diameter: f64,                 // m
    pub mechanism: DockingMechanism,
}

impl DockingPort {
    pub const ALL: [DockingPort; 4] = [
        DockingPort::HarmonyForward,
        DockingPort::HarmonyNadir,
        DockingPort::HarmonyZenith,
        DockingPort::UnityNadir,
    ];

    pub fn geometry(&self) -> PortGeometry {
        use DockingMechanism::*;
        let (offset, axis, orientation, mechanism) = match self {
            Self::HarmonyForward => (
                Vector3::zeros(),
                Vector3::new(-1.0, 0.0, 0.0),
                Vector3::zeros(),
                InternationalDockingAdapter,
            ),
            Self::HarmonyNadir => (
                Vector3::new(0.0, -4.5, 0.0),
                Vector3::new(0.0, -1.0, 0.0),
                Vector3::new(0.0, 90.0, 0.0),
                CommonBerthingMechanism,
            ),
            Self::HarmonyZenith => (
                Vector3::new(0.0, 4.5, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, -90.0, 0.0),
                CommonBerthingMechanism,
            ),
            Self::UnityNadir => (
                Vector3::new(0.0, -12.0, 0.0),
                Vector3::new(0.0, -1.0, 0.0),
                Vector3::new(0.0, 90.0, 0.0),
                CommonBerthingMechanism,
            ),
        };
        PortGeometry {
            offset,
            approach_axis: axis,
            orientation_deg: orientation,
            diameter: 1.2,
            mechanism,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HarmonyForward => "Harmony forward",
            Self::HarmonyNadir => "Harmony nadir",
            Self::HarmonyZenith => "Harmony zenith",
            Self::UnityNadir => "Unity nadir",
        }
    }
}

impl PortGeometry {
    /// Decompose a station-frame position into distance along the approach
    /// axis and lateral offset from it.
    pub fn axial_and_lateral(&self, position: &Vector3<f64>) -> (f64, f64) {
        let rel = position - self.offset;
        let along = rel.dot(&self.approach_axis);
        let lateral = (rel - self.approach_axis * along).norm();
        (along, lateral)
    }

    /// Velocity component along the approach axis, positive when closing.
    pub fn closing_speed(&self, velocity: &Vector3<f64>) -> f64 {
        -velocity.dot(&self.approach_axis)
    }

    /// Angle between the chaser attitude and the port's mating orientation, deg.
    pub fn misalignment_deg(&self, attitude_deg: &Vector3<f64>) -> f64 {
        (attitude_deg - self.orientation_deg).norm()
    }
}
