pub mod config;
pub mod docking;
pub mod error;
pub mod gnc;
pub mod orbital;
pub mod physics;
pub mod sim;
pub mod vehicle;

pub use error::{Error, Result};

// Commonly used types in one place
pub mod types {
    pub use crate::config::EngineConfig;
    pub use crate::docking::{
        DockingInitialConditions, DockingParameters, DockingPhase, DockingPort, DockingReport,
        DockingSimulator,
    };
    pub use crate::orbital::{
        LaunchWindow, ManeuverPlan, OrbitalElements, RendezvousPlan, StateVector, TrajectoryPoint,
    };
    pub use crate::physics::{G0, MU_EARTH, R_EARTH};
    pub use crate::vehicle::Spacecraft;
}
