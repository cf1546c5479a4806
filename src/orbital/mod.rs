pub mod elements;
pub mod launch;
pub mod maneuvers;
pub mod propagator;
pub mod rendezvous;
pub mod state;

pub use elements::OrbitalElements;
pub use launch::{launch_azimuth, CandidateOutcome, LaunchWindow, LaunchWindowConfig, LaunchWindowOptimizer};
pub use maneuvers::{hohmann, plane_change, HohmannTransfer, PlaneChange};
pub use propagator::{Propagator, PropagatorConfig};
pub use rendezvous::{
    ManeuverKind, ManeuverPlan, RendezvousConfig, RendezvousPlan, RendezvousPlanner,
};
pub use state::{StateVector, TrajectoryPoint};
