pub mod dynamics;
pub mod port;
pub mod simulator;
pub mod state;

pub use dynamics::{hcw_acceleration, RelativeDynamics, STATION_MEAN_MOTION};
pub use port::{DockingMechanism, DockingPort, PortGeometry};
pub use simulator::{
    DockingConfig, DockingReport, DockingSimulator, DockingStatus, PhaseEvent, TelemetrySample,
};
pub use state::{
    AbortReason, DockingInitialConditions, DockingParameters, DockingPhase, DockingState,
};
