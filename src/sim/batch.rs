use rayon::prelude::*;

use super::runner::{run_docking, AbortSignal};
use crate::docking::{DockingConfig, DockingInitialConditions, DockingParameters, DockingReport};
use crate::error::Result;
use crate::orbital::{Propagator, StateVector, TrajectoryPoint};

/// Propagate independent initial states in parallel, results in input order.
pub fn propagate_many(
    propagator: &Propagator,
    states: &[StateVector],
    duration_s: f64,
) -> Vec<Result<Vec<TrajectoryPoint>>> {
    states
        .par_iter()
        .map(|s| propagator.propagate(s, duration_s))
        .collect()
}

/// Run one docking simulation per initial condition in parallel.
///
/// All runs share `signal`; raising it aborts every run still in progress.
pub fn simulate_dockings(
    config: &DockingConfig,
    parameters: &DockingParameters,
    initial: &[DockingInitialConditions],
    signal: &AbortSignal,
    time_limit_s: f64,
) -> Vec<Result<DockingReport>> {
    initial
        .par_iter()
        .map(|ic| run_docking(config, parameters, ic, signal, time_limit_s))
        .collect()
}
