use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::docking::{
    DockingConfig, DockingInitialConditions, DockingParameters, DockingReport, DockingSimulator,
};
use crate::error::Result;

// ---------------------------------------------------------------------------
// External abort signal
// ---------------------------------------------------------------------------

/// Cloneable flag shared between a driver and whoever may cancel it.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Manual stepping driver
// ---------------------------------------------------------------------------

/// Step `sim` at its configured tick until it finishes.
///
/// A raised `signal` or reaching `time_limit_s` of simulated time turns
/// into an explicit commanded abort, so a report is always returned.
/// A non-finite limit means no limit.
pub fn run_to_completion(
    sim: &mut DockingSimulator,
    signal: &AbortSignal,
    time_limit_s: f64,
) -> DockingReport {
    let mut ticks = 0usize;
    loop {
        if let Some(report) = sim.report() {
            debug!("driver stopped after {} ticks", ticks);
            return report;
        }
        if signal.is_raised() {
            sim.abort("abort signal raised");
            continue;
        }
        if sim.elapsed_s() >= time_limit_s {
            warn!("docking run hit the {:.0} s driver limit", time_limit_s);
            sim.abort(format!("time limit {:.0} s reached", time_limit_s));
            continue;
        }
        sim.step();
        ticks += 1;
    }
}

/// Build a simulator with the default controller and run it to the end.
pub fn run_docking(
    config: &DockingConfig,
    parameters: &DockingParameters,
    initial: &DockingInitialConditions,
    signal: &AbortSignal,
    time_limit_s: f64,
) -> Result<DockingReport> {
    let mut sim = DockingSimulator::new(config.clone(), parameters.clone(), initial.clone())?;
    Ok(run_to_completion(&mut sim, signal, time_limit_s))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
