use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::state::{offset_epoch, StateVector, TrajectoryPoint};
use crate::error::{ensure_finite, ensure_positive, DivergenceReason, Error, Result};
use crate::physics::gravity::{GravityModel, MU_EARTH, R_EARTH};
use crate::sim::integrator::rk4_step;

/// Radius under which the reentry mode still gives up (singularity guard).
const SINGULAR_RADIUS: f64 = 1_000.0;

/// Largest trajectory a single `propagate` call will produce.
pub const MAX_TRAJECTORY_POINTS: usize = 5_000_000;

/// Up-front reservation; longer runs grow the buffer as they go.
const PREALLOCATED_POINTS: usize = 65_536;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagatorConfig {
    /// Fixed integration step, s.
    pub step_seconds: f64,
    pub gravity: GravityModel,
    /// States below this radius are non-physical unless `allow_reentry` is set.
    pub min_radius: f64,
    /// Reentry/decay mode: allow the trajectory to dip under `min_radius`.
    pub allow_reentry: bool,
    /// Sanity bound as a multiple of the expected apogee radius.
    pub divergence_factor: f64,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        Self {
            step_seconds: 60.0,
            gravity: GravityModel::J2,
            min_radius: R_EARTH,
            allow_reentry: false,
            divergence_factor: 10.0,
        }
    }
}

impl PropagatorConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("propagator.step_seconds", self.step_seconds)?;
        ensure_positive("propagator.min_radius", self.min_radius)?;
        if !(self.divergence_factor.is_finite() && self.divergence_factor > 1.0) {
            return Err(Error::InvalidConfig(format!(
                "propagator.divergence_factor must be > 1, got {}",
                self.divergence_factor
            )));
        }
        Ok(())
    }
}

/// Fixed-step RK4 orbit propagator (two-body + optional J2).
#[derive(Debug, Clone)]
pub struct Propagator {
    config: PropagatorConfig,
}

impl Default for Propagator {
    fn default() -> Self {
        Self { config: PropagatorConfig::default() }
    }
}

impl Propagator {
    pub fn new(config: PropagatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PropagatorConfig {
        &self.config
    }

    /// Advance a state by `dt` seconds with one RK4 step.
    pub fn step(&self, state: &StateVector, dt: f64) -> Result<StateVector> {
        let epoch = offset_epoch(&state.epoch, dt)?;
        let gravity = self.config.gravity;
        let (position, velocity) =
            rk4_step(&state.position, &state.velocity, dt, |r, _| gravity.acceleration(r));
        Ok(StateVector::new(position, velocity, epoch))
    }

    /// Propagate for `duration_s` seconds.
    ///
    /// Returns the trajectory sampled every `step_seconds` starting with the
    /// initial state; when the duration is not a multiple of the step, a final
    /// shorter step lands exactly on `duration_s`. Runs that would need more
    /// than [`MAX_TRAJECTORY_POINTS`] samples are refused up front.
    pub fn propagate(&self, initial: &StateVector, duration_s: f64) -> Result<Vec<TrajectoryPoint>> {
        ensure_finite("duration_s", duration_s)?;
        if duration_s < 0.0 {
            return Err(Error::InvalidParameter {
                name: "duration_s",
                reason: "backward propagation is not supported".into(),
            });
        }

        let bound = self.sanity_bound(initial);
        self.check(initial, 0.0, bound)?;

        let dt = self.config.step_seconds;
        let steps = (duration_s / dt).floor();
        if steps >= MAX_TRAJECTORY_POINTS as f64 {
            return Err(Error::InvalidParameter {
                name: "duration_s",
                reason: format!(
                    "{} s at {} s steps exceeds {} trajectory points",
                    duration_s, dt, MAX_TRAJECTORY_POINTS
                ),
            });
        }
        offset_epoch(&initial.epoch, duration_s)?;

        let full_steps = steps as usize;
        let remainder = duration_s - full_steps as f64 * dt;
        let has_partial = remainder > 1e-9 * dt.max(1.0);

        let mut trajectory = Vec::with_capacity((full_steps + 2).min(PREALLOCATED_POINTS));
        trajectory.push(TrajectoryPoint::from_state(initial));

        let mut state = *initial;
        let mut elapsed = 0.0;
        for _ in 0..full_steps {
            state = self.step(&state, dt)?;
            elapsed += dt;
            self.check(&state, elapsed, bound)?;
            trajectory.push(TrajectoryPoint::from_state(&state));
        }
        if has_partial {
            state = self.step(&state, remainder)?;
            self.check(&state, duration_s, bound)?;
            trajectory.push(TrajectoryPoint::from_state(&state));
        }

        debug!(
            "propagated {:.0} s in {} points, final altitude {:.1} km",
            duration_s,
            trajectory.len(),
            state.altitude() / 1000.0
        );
        Ok(trajectory)
    }

    /// `divergence_factor` x apogee for bound orbits, `None` when unbound.
    fn sanity_bound(&self, state: &StateVector) -> Option<f64> {
        let energy = state.specific_energy();
        if !(energy < 0.0) {
            return None;
        }
        let a = -MU_EARTH / (2.0 * energy);
        let h = state.angular_momentum().norm();
        let ecc = (1.0 - h * h / (MU_EARTH * a)).max(0.0).sqrt();
        Some(self.config.divergence_factor * a * (1.0 + ecc))
    }

    fn check(&self, state: &StateVector, time_s: f64, bound: Option<f64>) -> Result<()> {
        let fail = |reason: DivergenceReason| {
            warn!("propagation stopped at t={:.1} s: {}", time_s, reason);
            Err(Error::SimulationDivergence { time_s, reason })
        };

        if !state.is_finite() {
            return fail(DivergenceReason::NonFinite);
        }
        let radius = state.radius();
        let minimum = if self.config.allow_reentry {
            SINGULAR_RADIUS
        } else {
            self.config.min_radius
        };
        if radius < minimum {
            return fail(DivergenceReason::BelowMinimumRadius { radius, minimum });
        }
        if let Some(bound) = bound {
            if radius > bound {
                return fail(DivergenceReason::BeyondSanityBound { radius, bound });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbital::elements::OrbitalElements;
    use crate::physics::earth::j2000;
    use nalgebra::Vector3;

    fn circular_state(altitude: f64, inc_deg: f64) -> StateVector {
        OrbitalElements::circular(altitude, inc_deg.to_radians(), j2000())
            .to_state()
            .unwrap()
    }

    fn two_body(step: f64) -> Propagator {
        Propagator::new(PropagatorConfig {
            step_seconds: step,
            gravity: GravityModel::PointMass,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn samples_every_step_including_start() {
        let s0 = circular_state(400_000.0, 51.6);
        let traj = Propagator::default().propagate(&s0, 3600.0).unwrap();
        assert_eq!(traj.len(), 61);
        assert_eq!(traj[0].epoch, s0.epoch);
        assert_eq!((traj[60].epoch - s0.epoch).num_seconds(), 3600);
        assert!(traj.windows(2).all(|w| w[0].epoch < w[1].epoch));
    }

    #[test]
    fn partial_final_step_lands_on_duration() {
        let s0 = circular_state(400_000.0, 0.0);
        let traj = Propagator::default().propagate(&s0, 150.0).unwrap();
        assert_eq!(traj.len(), 4);
        assert_eq!((traj[3].epoch - s0.epoch).num_seconds(), 150);
    }

    #[test]
    fn two_body_conserves_energy_and_momentum() {
        let orbit = OrbitalElements {
            semi_major_axis: 8_000_000.0,
            eccentricity: 0.1,
            inclination: 0.5,
            raan: 1.0,
            argument_of_perigee: 2.0,
            true_anomaly: 0.3,
            epoch: j2000(),
        };
        let s0 = orbit.to_state().unwrap();
        let e0 = s0.specific_energy();
        let h0 = s0.angular_momentum().norm();

        let traj = two_body(10.0).propagate(&s0, 2.0 * orbit.period()).unwrap();
        for p in &traj {
            let s = p.state();
            assert!(((s.specific_energy() - e0) / e0).abs() < 1e-8);
            assert!(((s.angular_momentum().norm() - h0) / h0).abs() < 1e-8);
        }
    }

    #[test]
    fn circular_orbit_returns_to_start() {
        let s0 = circular_state(400_000.0, 0.0);
        let period = OrbitalElements::from_state(&s0).unwrap().period();
        let traj = two_body(1.0).propagate(&s0, period).unwrap();
        let last = traj.last().unwrap();
        let relative = (last.position - s0.position).norm() / (2.0 * std::f64::consts::PI * s0.radius());
        assert!(relative < 1e-6, "relative error {:.2e}", relative);
    }

    #[test]
    fn j2_regresses_node_of_prograde_orbit() {
        let s0 = circular_state(400_000.0, 51.6);
        let traj = Propagator::default().propagate(&s0, 86_400.0).unwrap();
        let last = OrbitalElements::from_state(&traj.last().unwrap().state()).unwrap();
        let drift = crate::orbital::elements::angle_difference(last.raan, 0.0).to_degrees();
        // ISS-like orbit regresses roughly 5 deg/day
        assert!(drift < -4.0 && drift > -6.0, "RAAN drift {:.2} deg", drift);
    }

    #[test]
    fn ground_track_stays_within_inclination() {
        let s0 = circular_state(400_000.0, 51.6);
        let traj = Propagator::default().propagate(&s0, 6000.0).unwrap();
        for p in &traj {
            assert!(p.latitude_deg.abs() <= 51.7);
            assert!((-180.0..180.0).contains(&p.longitude_deg));
            assert!((p.altitude_m - 400_000.0).abs() < 30_000.0);
        }
    }

    #[test]
    fn rejects_state_inside_earth() {
        let s0 = StateVector::new(
            Vector3::new(1_000_000.0, 0.0, 0.0),
            Vector3::new(0.0, 7_500.0, 0.0),
            j2000(),
        );
        let err = Propagator::default().propagate(&s0, 600.0).unwrap_err();
        assert!(matches!(
            err,
            Error::SimulationDivergence {
                reason: DivergenceReason::BelowMinimumRadius { .. },
                ..
            }
        ));
    }

    #[test]
    fn stops_on_surface_impact() {
        // Suborbital: falls back into the atmosphere within the hour
        let r = R_EARTH + 100_000.0;
        let s0 = StateVector::new(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, 3_000.0, 0.0), j2000());
        let err = Propagator::default().propagate(&s0, 3600.0).unwrap_err();
        match err {
            Error::SimulationDivergence { time_s, .. } => assert!(time_s > 0.0),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn reentry_mode_allows_descent() {
        let r = R_EARTH + 100_000.0;
        let s0 = StateVector::new(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, 7_000.0, 0.0), j2000());
        let propagator = Propagator::new(PropagatorConfig {
            allow_reentry: true,
            ..Default::default()
        })
        .unwrap();
        let traj = propagator.propagate(&s0, 1200.0).unwrap();
        assert!(traj.iter().any(|p| p.altitude_m < 0.0));
    }

    #[test]
    fn non_finite_state_diverges() {
        let s0 = StateVector::new(
            Vector3::new(f64::NAN, 0.0, 0.0),
            Vector3::new(0.0, 7_500.0, 0.0),
            j2000(),
        );
        let err = Propagator::default().propagate(&s0, 60.0).unwrap_err();
        assert!(matches!(
            err,
            Error::SimulationDivergence { reason: DivergenceReason::NonFinite, .. }
        ));
    }

    #[test]
    fn coarse_step_through_perigee_hits_sanity_bound() {
        // Near-radial fall: apogee 7000 km, perigee ~255 km from the centre.
        // A 300 s step cannot resolve the swing and flings the state outward.
        let s0 = StateVector::new(
            Vector3::new(7_000_000.0, 0.0, 0.0),
            Vector3::new(0.0, 2_000.0, 0.0),
            j2000(),
        );
        let propagator = Propagator::new(PropagatorConfig {
            step_seconds: 300.0,
            gravity: GravityModel::PointMass,
            allow_reentry: true,
            ..Default::default()
        })
        .unwrap();
        match propagator.propagate(&s0, 10_800.0).unwrap_err() {
            Error::SimulationDivergence {
                time_s,
                reason: DivergenceReason::BeyondSanityBound { radius, bound },
            } => {
                assert!(time_s > 0.0 && time_s < 10_800.0);
                assert!(radius > bound);
                assert!((bound - 70_000_000.0).abs() < 1.0, "bound {}", bound);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn oversized_duration_refused_before_allocating() {
        let s0 = circular_state(400_000.0, 51.6);
        let err = Propagator::default().propagate(&s0, 1e18).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "duration_s", .. }));

        // A year at one-second steps is past the point limit
        let err = two_body(1.0).propagate(&s0, 365.25 * 86_400.0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn single_step_past_calendar_range_is_error() {
        let s0 = circular_state(400_000.0, 0.0);
        assert!(Propagator::default().step(&s0, 60.0).is_ok());
        assert!(Propagator::default().step(&s0, 1e13).is_err());
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = PropagatorConfig { step_seconds: 0.0, ..Default::default() };
        assert!(Propagator::new(cfg).is_err());
        let cfg = PropagatorConfig { divergence_factor: 0.5, ..Default::default() };
        assert!(Propagator::new(cfg).is_err());
    }
}
