pub mod batch;
pub mod integrator;
pub mod runner;

pub use batch::{propagate_many, simulate_dockings};
pub use integrator::rk4_step;
pub use runner::{run_docking, run_to_completion, AbortSignal};
