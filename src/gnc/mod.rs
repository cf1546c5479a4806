pub mod controller;
pub mod docking;
pub mod pid;

pub use controller::{ControlCommand, FreeDrift, ProximityController};
pub use docking::{DockingController, DockingGains};
pub use pid::Pid;
