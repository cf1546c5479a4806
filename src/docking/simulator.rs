use std::collections::VecDeque;

use log::{debug, info, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::dynamics::{RelativeDynamics, STATION_MEAN_MOTION};
use super::port::{DockingPort, PortGeometry};
use super::state::{
    AbortReason, DockingInitialConditions, DockingParameters, DockingPhase, DockingState,
};
use crate::error::{ensure_positive, Error, Result};
use crate::gnc::{ControlCommand, DockingController, DockingGains, ProximityController};
use crate::physics::gravity::G0;

const PROXIMITY_RANGE: f64 = 50.0; // m
const FINAL_APPROACH_RANGE: f64 = 10.0; // m
const CONTACT_RANGE: f64 = 1.0; // m
const LOST_CONTACT_RANGE: f64 = 2.0; // m

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingConfig {
    pub tick_seconds: f64,
    pub mean_motion: f64,                    // rad/s, target orbit
    pub chaser_mass: f64,                    // kg
    pub rcs_isp: f64,                        // s
    pub max_acceleration: f64,               // m/s^2, thruster limit
    pub max_angular_acceleration_deg_s2: f64,
    pub drag_coefficient: f64,               // 1/m
    /// Telemetry ring buffer size, samples.
    pub history_capacity: usize,
    /// Duration over which the contact impulse is spread when estimating the load.
    pub contact_duration_s: f64,
    pub time_bonus_threshold_s: f64,
    pub propellant_bonus_threshold_kg: f64,
    pub gains: DockingGains,
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 0.1,
            mean_motion: STATION_MEAN_MOTION,
            chaser_mass: 7_000.0,
            rcs_isp: 300.0,
            max_acceleration: 0.1,
            max_angular_acceleration_deg_s2: 1.0,
            drag_coefficient: 1e-8,
            history_capacity: 1_000,
            contact_duration_s: 1.0,
            time_bonus_threshold_s: 600.0,
            propellant_bonus_threshold_kg: 5.0,
            gains: DockingGains::default(),
        }
    }
}

impl DockingConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("tick_seconds", self.tick_seconds),
            ("chaser_mass", self.chaser_mass),
            ("rcs_isp", self.rcs_isp),
            ("max_acceleration", self.max_acceleration),
            ("max_angular_acceleration_deg_s2", self.max_angular_acceleration_deg_s2),
            ("contact_duration_s", self.contact_duration_s),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "docking.{} must be finite and > 0, got {}",
                    name, v
                )));
            }
        }
        let non_negative = [
            ("mean_motion", self.mean_motion),
            ("drag_coefficient", self.drag_coefficient),
            ("time_bonus_threshold_s", self.time_bonus_threshold_s),
            ("propellant_bonus_threshold_kg", self.propellant_bonus_threshold_kg),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "docking.{} must be finite and >= 0, got {}",
                    name, v
                )));
            }
        }
        if self.history_capacity == 0 {
            return Err(Error::InvalidConfig("docking.history_capacity must be > 0".into()));
        }
        self.gains.validate()
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time_s: f64,
    pub phase: DockingPhase,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub attitude_deg: Vector3<f64>,
    pub distance_m: f64,
    pub speed_mps: f64,
    pub control_acceleration: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub time_s: f64,
    pub from: DockingPhase,
    pub to: DockingPhase,
    pub distance_m: f64,
    pub speed_mps: f64,
}

/// Snapshot returned by [`DockingSimulator::status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockingStatus {
    pub phase: DockingPhase,
    pub port: DockingPort,
    pub elapsed_s: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub distance_m: f64,
    pub closing_speed_mps: f64,
    pub lateral_offset_m: f64,
    pub attitude_error_deg: f64,
    pub delta_v_used: f64,
    pub propellant_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockingReport {
    pub success: bool,
    pub final_phase: DockingPhase,
    pub elapsed_s: f64,
    pub final_distance_m: f64,
    pub delta_v_used: f64,     // m/s
    pub propellant_kg: f64,
    pub telemetry_samples: usize,
    pub performance_score: f64, // 0..100
    pub abort_reason: Option<AbortReason>,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Proximity-operations simulator advanced by an external `tick(dt)` driver.
pub struct DockingSimulator {
    config: DockingConfig,
    parameters: DockingParameters,
    port: DockingPort,
    geometry: PortGeometry,
    dynamics: RelativeDynamics,
    controller: Box<dyn ProximityController>,
    state: DockingState,
    elapsed_s: f64,
    delta_v_used: f64,
    samples_recorded: usize,
    telemetry: VecDeque<TelemetrySample>,
    events: Vec<PhaseEvent>,
    abort_reason: Option<AbortReason>,
}

impl std::fmt::Debug for DockingSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockingSimulator")
            .field("port", &self.port)
            .field("controller", &self.controller.name())
            .field("state", &self.state)
            .field("elapsed_s", &self.elapsed_s)
            .finish()
    }
}

impl DockingSimulator {
    pub fn new(
        config: DockingConfig,
        parameters: DockingParameters,
        initial: DockingInitialConditions,
    ) -> Result<Self> {
        config.validate()?;
        parameters.validate()?;
        initial.validate()?;

        let controller = Box::new(DockingController::new(&config.gains));
        let geometry = initial.port.geometry();
        debug!(
            "docking run to {} from {:?}, controller {}",
            initial.port.name(),
            initial.position.as_slice(),
            controller.name()
        );
        Ok(Self {
            dynamics: RelativeDynamics {
                mean_motion: config.mean_motion,
                drag_coefficient: config.drag_coefficient,
            },
            telemetry: VecDeque::with_capacity(config.history_capacity),
            config,
            parameters,
            port: initial.port,
            geometry,
            controller,
            state: initial.state(),
            elapsed_s: 0.0,
            delta_v_used: 0.0,
            samples_recorded: 0,
            events: Vec::new(),
            abort_reason: None,
        })
    }

    /// Replace the default controller.
    pub fn with_controller(mut self, controller: impl ProximityController + 'static) -> Self {
        self.controller = Box::new(controller);
        self.controller.reset();
        self
    }

    pub fn config(&self) -> &DockingConfig {
        &self.config
    }

    pub fn state(&self) -> &DockingState {
        &self.state
    }

    pub fn phase(&self) -> DockingPhase {
        self.state.phase
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase.is_terminal()
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    /// Advance one tick of the configured interval.
    pub fn step(&mut self) -> DockingPhase {
        self.advance(self.config.tick_seconds)
    }

    /// Advance by `dt` seconds. A finished run is left untouched.
    pub fn tick(&mut self, dt: f64) -> Result<DockingPhase> {
        ensure_positive("dt", dt)?;
        Ok(self.advance(dt))
    }

    /// Stop the run; no further ticks have any effect.
    ///
    /// Returns `false` when the run had already finished.
    pub fn abort(&mut self, reason: impl Into<String>) -> bool {
        if self.is_finished() {
            return false;
        }
        self.transition(
            DockingPhase::Abort,
            Some(AbortReason::Commanded { reason: reason.into() }),
        );
        true
    }

    fn advance(&mut self, dt: f64) -> DockingPhase {
        if self.is_finished() {
            return self.state.phase;
        }

        let command: ControlCommand = self
            .controller
            .command(&self.state, &self.geometry, dt)
            .clamped(
                self.config.max_acceleration,
                self.config.max_angular_acceleration_deg_s2,
            );

        let (position, velocity) =
            self.dynamics
                .step(&self.state.position, &self.state.velocity, &command.acceleration, dt);
        self.state.position = position;
        self.state.velocity = velocity;

        // Attitude: rigid body about principal axes, semi-implicit Euler
        self.state.angular_rate_deg_s += command.angular_acceleration_deg_s2 * dt;
        self.state.attitude_deg += self.state.angular_rate_deg_s * dt;

        self.elapsed_s += dt;
        self.delta_v_used += command.acceleration.norm() * dt;

        if !self.state.is_finite() {
            self.transition(DockingPhase::Abort, Some(AbortReason::NumericalDivergence));
        } else if let Some((next, reason)) = self.next_phase() {
            self.transition(next, reason);
        }

        self.record(command.acceleration);
        self.state.phase
    }

    /// At most one transition per tick.
    fn next_phase(&self) -> Option<(DockingPhase, Option<AbortReason>)> {
        use DockingPhase::*;
        let distance = self.distance_to_port();
        match self.state.phase {
            Approach if distance < PROXIMITY_RANGE => Some((Proximity, None)),
            Proximity if distance < FINAL_APPROACH_RANGE => Some((FinalApproach, None)),
            FinalApproach if distance < CONTACT_RANGE => {
                let speed = self.state.velocity.norm();
                let limit = self.parameters.approach_velocity_limit;
                if speed < limit {
                    Some((Contact, None))
                } else {
                    Some((Abort, Some(AbortReason::ExcessiveApproachSpeed { speed, limit })))
                }
            }
            Contact if self.capture_conditions_met() => Some((Capture, None)),
            Contact if distance > LOST_CONTACT_RANGE => {
                Some((Abort, Some(AbortReason::LostContact { distance })))
            }
            // Latch and retraction are modelled as always succeeding
            Capture => Some((Retraction, None)),
            Retraction => Some((HardDock, None)),
            _ => None,
        }
    }

    fn capture_conditions_met(&self) -> bool {
        let p = &self.parameters;
        let (_, lateral) = self.geometry.axial_and_lateral(&self.state.position);
        let closing = self.geometry.closing_speed(&self.state.velocity).abs();
        lateral < p.max_lateral_offset
            && self.geometry.misalignment_deg(&self.state.attitude_deg) < p.max_angular_misalignment_deg
            && closing < p.approach_velocity_limit
            && self.contact_load(closing) <= p.contact_force_limit
    }

    /// Mean load if the closing momentum is absorbed over `contact_duration_s`, N.
    fn contact_load(&self, closing_speed: f64) -> f64 {
        self.config.chaser_mass * closing_speed / self.config.contact_duration_s
    }

    fn transition(&mut self, to: DockingPhase, reason: Option<AbortReason>) {
        let from = self.state.phase;
        let distance_m = self.distance_to_port();
        let speed_mps = self.state.velocity.norm();
        self.events.push(PhaseEvent {
            time_s: self.elapsed_s,
            from,
            to,
            distance_m,
            speed_mps,
        });
        self.state.phase = to;

        match &reason {
            Some(r) => warn!("docking aborted at t={:.1} s: {}", self.elapsed_s, r),
            None => info!(
                "docking phase {} -> {} at t={:.1} s (range {:.2} m, speed {:.3} m/s)",
                from, to, self.elapsed_s, distance_m, speed_mps
            ),
        }
        if reason.is_some() {
            self.abort_reason = reason;
        }

        if to.is_terminal() {
            let report = self.build_report();
            info!(
                "docking finished: {} after {:.1} s, score {:.0}",
                report.final_phase, report.elapsed_s, report.performance_score
            );
        }
    }

    fn record(&mut self, control_acceleration: Vector3<f64>) {
        if self.telemetry.len() >= self.config.history_capacity {
            self.telemetry.pop_front();
        }
        self.telemetry.push_back(TelemetrySample {
            time_s: self.elapsed_s,
            phase: self.state.phase,
            position: self.state.position,
            velocity: self.state.velocity,
            attitude_deg: self.state.attitude_deg,
            distance_m: self.distance_to_port(),
            speed_mps: self.state.velocity.norm(),
            control_acceleration,
        });
        self.samples_recorded += 1;
    }

    pub fn distance_to_port(&self) -> f64 {
        (self.state.position - self.geometry.offset).norm()
    }

    /// Propellant burned so far, linear in delta-v at constant mass.
    pub fn propellant_used(&self) -> f64 {
        self.config.chaser_mass * self.delta_v_used / (self.config.rcs_isp * G0)
    }

    // -- Queries ---------------------------------------------------------------

    pub fn status(&self) -> DockingStatus {
        let (_, lateral) = self.geometry.axial_and_lateral(&self.state.position);
        DockingStatus {
            phase: self.state.phase,
            port: self.port,
            elapsed_s: self.elapsed_s,
            position: self.state.position,
            velocity: self.state.velocity,
            distance_m: self.distance_to_port(),
            closing_speed_mps: self.geometry.closing_speed(&self.state.velocity),
            lateral_offset_m: lateral,
            attitude_error_deg: self.geometry.misalignment_deg(&self.state.attitude_deg),
            delta_v_used: self.delta_v_used,
            propellant_kg: self.propellant_used(),
        }
    }

    /// Samples from the last `duration_s` seconds, oldest first.
    pub fn telemetry_history(&self, duration_s: f64) -> Vec<TelemetrySample> {
        let since = self.elapsed_s - duration_s.max(0.0) - 1e-9;
        self.telemetry
            .iter()
            .filter(|s| s.time_s >= since)
            .cloned()
            .collect()
    }

    pub fn phase_events(&self) -> &[PhaseEvent] {
        &self.events
    }

    /// Final report, available once the run has reached HardDock or Abort.
    pub fn report(&self) -> Option<DockingReport> {
        self.is_finished().then(|| self.build_report())
    }

    fn build_report(&self) -> DockingReport {
        let success = self.state.phase == DockingPhase::HardDock;
        let propellant_kg = self.propellant_used();
        let performance_score = if success {
            let mut score: f64 = 80.0;
            if self.elapsed_s < self.config.time_bonus_threshold_s {
                score += 10.0;
            }
            if propellant_kg < self.config.propellant_bonus_threshold_kg {
                score += 10.0;
            }
            score.min(100.0)
        } else {
            0.0
        };
        DockingReport {
            success,
            final_phase: self.state.phase,
            elapsed_s: self.elapsed_s,
            final_distance_m: self.distance_to_port(),
            delta_v_used: self.delta_v_used,
            propellant_kg,
            telemetry_samples: self.samples_recorded,
            performance_score,
            abort_reason: self.abort_reason.clone(),
        }
    }
}
