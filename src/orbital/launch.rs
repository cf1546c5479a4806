use chrono::{DateTime, Duration, Timelike, Utc};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::elements::OrbitalElements;
use crate::error::{Error, Result};
use crate::physics::earth::surface_rotation_speed;
use crate::physics::gravity::circular_velocity;

/// Longest search horizon `optimize` accepts.
pub const MAX_SEARCH_DAYS: u32 = 3_660;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchWindowConfig {
    /// First candidate; `None` starts at 00:00 UTC today.
    pub search_start: Option<DateTime<Utc>>,
    pub step_hours: u32,
    pub top_n: usize,
    /// East longitude of the site, used for local solar time.
    pub site_longitude_deg: f64,
    pub gravity_loss: f64,  // m/s
    pub drag_loss: f64,     // m/s
    pub steering_loss: f64, // m/s
    /// Delta-v at which the delta-v criterion starts losing points, m/s.
    pub delta_v_baseline: f64,
}

impl Default for LaunchWindowConfig {
    fn default() -> Self {
        Self {
            search_start: None,
            step_hours: 2,
            top_n: 10,
            site_longitude_deg: 0.0,
            gravity_loss: 1_500.0,
            drag_loss: 200.0,
            steering_loss: 100.0,
            delta_v_baseline: 9_000.0,
        }
    }
}

impl LaunchWindowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.step_hours == 0 || self.step_hours > 24 {
            return Err(Error::InvalidConfig(format!(
                "launch.step_hours must be in 1..=24, got {}",
                self.step_hours
            )));
        }
        if self.top_n == 0 {
            return Err(Error::InvalidConfig("launch.top_n must be > 0".into()));
        }
        if !(self.site_longitude_deg.is_finite() && self.site_longitude_deg.abs() <= 180.0) {
            return Err(Error::InvalidConfig(format!(
                "launch.site_longitude_deg out of range: {}",
                self.site_longitude_deg
            )));
        }
        for (name, v) in [
            ("gravity_loss", self.gravity_loss),
            ("drag_loss", self.drag_loss),
            ("steering_loss", self.steering_loss),
            ("delta_v_baseline", self.delta_v_baseline),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "launch.{} must be finite and >= 0, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    pub fn total_losses(&self) -> f64 {
        self.gravity_loss + self.drag_loss + self.steering_loss
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchWindow {
    pub launch_time: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub delta_v_required: f64,  // m/s, insertion + losses
    pub insertion_delta_v: f64, // m/s
    pub score: f64,             // 0..100
}

/// Evaluation of one grid candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Feasible(LaunchWindow),
    Rejected {
        launch_time: DateTime<Utc>,
        reason: Error,
    },
}

impl CandidateOutcome {
    pub fn window(self) -> Option<LaunchWindow> {
        match self {
            Self::Feasible(w) => Some(w),
            Self::Rejected { .. } => None,
        }
    }
}

/// Launch azimuth (rad) for a direct ascent into `inclination` from `latitude`.
///
/// `sin(az) = cos(i) / cos(lat)`. Fails when the plane does not pass over
/// the site (`i < |lat|`).
pub fn launch_azimuth(latitude: f64, inclination: f64) -> Result<f64> {
    let unreachable = || Error::UnreachableOrbit {
        inclination_deg: inclination.to_degrees(),
        latitude_deg: latitude.to_degrees(),
    };
    if inclination < latitude.abs() {
        return Err(unreachable());
    }
    let sin_az = inclination.cos() / latitude.cos();
    if !sin_az.is_finite() || sin_az.abs() > 1.0 {
        return Err(unreachable());
    }
    Ok(sin_az.asin())
}

/// Grid search over launch times for a target orbit from one launch site.
#[derive(Debug, Clone, Default)]
pub struct LaunchWindowOptimizer {
    config: LaunchWindowConfig,
}

impl LaunchWindowOptimizer {
    pub fn new(config: LaunchWindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LaunchWindowConfig {
        &self.config
    }

    /// Best `top_n` windows over `search_days`, highest score first.
    ///
    /// Candidates that cannot reach the target plane are dropped; the
    /// result is empty when none can.
    pub fn optimize(
        &self,
        target: &OrbitalElements,
        latitude_deg: f64,
        search_days: u32,
    ) -> Result<Vec<LaunchWindow>> {
        if !(latitude_deg.is_finite() && latitude_deg.abs() <= 90.0) {
            return Err(Error::InvalidParameter {
                name: "latitude_deg",
                reason: format!("must be within [-90, 90], got {}", latitude_deg),
            });
        }
        if !(target.semi_major_axis.is_finite() && target.semi_major_axis > 0.0) {
            return Err(Error::InvalidParameter {
                name: "semi_major_axis",
                reason: format!("expected a bound orbit, got a = {}", target.semi_major_axis),
            });
        }

        if search_days > MAX_SEARCH_DAYS {
            return Err(Error::InvalidParameter {
                name: "search_days",
                reason: format!("at most {} days, got {}", MAX_SEARCH_DAYS, search_days),
            });
        }

        let candidates = self.candidate_times(search_days)?;
        let outcomes: Vec<CandidateOutcome> = candidates
            .par_iter()
            .map(|t| self.evaluate(target, latitude_deg, *t))
            .collect();

        let total = outcomes.len();
        let mut windows: Vec<LaunchWindow> =
            outcomes.into_iter().filter_map(CandidateOutcome::window).collect();
        if windows.is_empty() && total > 0 {
            warn!(
                "no feasible launch window: inclination {:.2} deg from latitude {:.2} deg",
                target.inclination.to_degrees(),
                latitude_deg
            );
        }
        debug!("{} of {} candidates feasible", windows.len(), total);

        windows.sort_by(|a, b| b.score.total_cmp(&a.score));
        windows.truncate(self.config.top_n);
        if let Some(best) = windows.first() {
            info!(
                "best launch window {} (score {:.1}, azimuth {:.1} deg)",
                best.launch_time, best.score, best.azimuth_deg
            );
        }
        Ok(windows)
    }

    /// Score a single launch time.
    pub fn evaluate(
        &self,
        target: &OrbitalElements,
        latitude_deg: f64,
        launch_time: DateTime<Utc>,
    ) -> CandidateOutcome {
        let latitude = latitude_deg.to_radians();
        let azimuth = match launch_azimuth(latitude, target.inclination) {
            Ok(az) => az,
            Err(reason) => {
                trace!("candidate {} rejected: {}", launch_time, reason);
                return CandidateOutcome::Rejected { launch_time, reason };
            }
        };

        // Eastward rotation of the pad projected on the ascent direction
        let assist = surface_rotation_speed(latitude) * azimuth.sin();
        let insertion_delta_v = circular_velocity(target.semi_major_axis) - assist;
        let delta_v_required = insertion_delta_v + self.config.total_losses();

        let azimuth_deg = azimuth.to_degrees();
        let score = self.score(launch_time, azimuth_deg, delta_v_required);
        trace!(
            "candidate {} az={:.2} deg dv={:.0} m/s score={:.1}",
            launch_time,
            azimuth_deg,
            delta_v_required,
            score
        );
        CandidateOutcome::Feasible(LaunchWindow {
            launch_time,
            azimuth_deg,
            delta_v_required,
            insertion_delta_v,
            score,
        })
    }

    /// Mean of noon proximity, due-east proximity and delta-v criteria.
    fn score(&self, launch_time: DateTime<Utc>, azimuth_deg: f64, delta_v: f64) -> f64 {
        let local_hour = self.local_solar_hour(launch_time);
        let noon = (100.0 - 2.0 * (local_hour - 12.0).abs()).clamp(0.0, 100.0);
        let east = (100.0 - 0.5 * (azimuth_deg - 90.0).abs()).clamp(0.0, 100.0);
        let dv = (100.0 - 0.01 * (delta_v - self.config.delta_v_baseline)).clamp(0.0, 100.0);
        (noon + east + dv) / 3.0
    }

    fn local_solar_hour(&self, t: DateTime<Utc>) -> f64 {
        let utc_hours = t.hour() as f64 + t.minute() as f64 / 60.0 + t.second() as f64 / 3600.0;
        (utc_hours + self.config.site_longitude_deg / 15.0).rem_euclid(24.0)
    }

    fn candidate_times(&self, search_days: u32) -> Result<Vec<DateTime<Utc>>> {
        let start = match self.config.search_start {
            Some(t) => t,
            None => {
                let now = Utc::now();
                now - Duration::seconds(now.num_seconds_from_midnight() as i64)
                    - Duration::nanoseconds(now.nanosecond() as i64)
            }
        };
        let step = self.config.step_hours as usize;
        let mut times = Vec::with_capacity(search_days as usize * (24 + step - 1) / step);
        for day in 0..search_days as i64 {
            for hour in (0..24i64).step_by(step) {
                let t = start
                    .checked_add_signed(Duration::days(day) + Duration::hours(hour))
                    .ok_or_else(|| Error::InvalidParameter {
                        name: "search_days",
                        reason: format!("search from {} runs past the calendar range", start),
                    })?;
                times.push(t);
            }
        }
        Ok(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    const CAPE_CANAVERAL: f64 = 28.5;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    fn optimizer() -> LaunchWindowOptimizer {
        LaunchWindowOptimizer::new(LaunchWindowConfig {
            search_start: Some(start()),
            ..Default::default()
        })
        .unwrap()
    }

    fn iss() -> OrbitalElements {
        OrbitalElements::circular(420_000.0, 51.6f64.to_radians(), start())
    }

    #[test]
    fn unreachable_inclination_gives_no_windows() {
        let target = OrbitalElements::circular(500_000.0, 30f64.to_radians(), start());
        let windows = optimizer().optimize(&target, 45.0, 7).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn ranked_top_n_from_the_cape() {
        let windows = optimizer().optimize(&iss(), CAPE_CANAVERAL, 5).unwrap();
        assert_eq!(windows.len(), 10);
        assert!(windows.windows(2).all(|w| w[0].score >= w[1].score));
        for w in &windows {
            assert!((0.0..=100.0).contains(&w.score));
            assert!(w.delta_v_required > w.insertion_delta_v);
        }
        // With a Greenwich site longitude the best slot is 12:00 UTC
        assert_eq!(windows[0].launch_time.hour(), 12);
    }

    #[test]
    fn evaluates_whole_grid() {
        let opt = LaunchWindowOptimizer::new(LaunchWindowConfig {
            search_start: Some(start()),
            top_n: 1000,
            ..Default::default()
        })
        .unwrap();
        let windows = opt.optimize(&iss(), CAPE_CANAVERAL, 3).unwrap();
        assert_eq!(windows.len(), 36);
    }

    #[test]
    fn rejected_candidate_carries_error() {
        let target = OrbitalElements::circular(500_000.0, 10f64.to_radians(), start());
        match optimizer().evaluate(&target, 28.5, start()) {
            CandidateOutcome::Rejected { reason, .. } => {
                assert!(matches!(reason, Error::UnreachableOrbit { .. }))
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[rstest]
    #[case(28.5, 51.6, 44.9)]
    #[case(28.5, 28.5, 90.0)]
    #[case(0.0, 0.0, 90.0)]
    #[case(45.0, 60.0, 45.0)]
    fn azimuth_values(#[case] lat: f64, #[case] inc: f64, #[case] expected: f64) {
        let az = launch_azimuth(lat.to_radians(), inc.to_radians()).unwrap();
        assert!((az.to_degrees() - expected).abs() < 0.1, "got {}", az.to_degrees());
    }

    #[test]
    fn eastward_launch_gains_rotation() {
        let target = OrbitalElements::circular(400_000.0, 0.0, start());
        let w = optimizer().evaluate(&target, 0.0, start()).window().unwrap();
        let v_orbit = circular_velocity(target.semi_major_axis);
        assert!((v_orbit - w.insertion_delta_v - 465.1).abs() < 0.5);
    }

    #[test]
    fn meaningless_inputs_are_errors() {
        assert!(optimizer().optimize(&iss(), 91.0, 1).is_err());
        let mut hyperbolic = iss();
        hyperbolic.semi_major_axis = -7_000_000.0;
        assert!(optimizer().optimize(&hyperbolic, 28.5, 1).is_err());
    }

    #[rstest]
    #[case(2, 12)]
    #[case(5, 5)]
    #[case(7, 4)]
    #[case(24, 1)]
    fn every_slot_of_the_day_is_tried(#[case] step_hours: u32, #[case] per_day: usize) {
        let opt = LaunchWindowOptimizer::new(LaunchWindowConfig {
            search_start: Some(start()),
            step_hours,
            top_n: 1000,
            ..Default::default()
        })
        .unwrap();
        let windows = opt.optimize(&iss(), CAPE_CANAVERAL, 2).unwrap();
        assert_eq!(windows.len(), 2 * per_day);
        let last_hour = 23 / step_hours * step_hours;
        assert!(windows.iter().any(|w| w.launch_time.hour() == last_hour));
    }

    #[test]
    fn search_span_is_bounded() {
        let err = optimizer().optimize(&iss(), CAPE_CANAVERAL, u32::MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "search_days", .. }));

        let near_end = LaunchWindowOptimizer::new(LaunchWindowConfig {
            search_start: Some(DateTime::<Utc>::MAX_UTC - Duration::days(1)),
            ..Default::default()
        })
        .unwrap();
        assert!(near_end.optimize(&iss(), CAPE_CANAVERAL, 5).is_err());
    }

    #[test]
    fn zero_step_rejected() {
        let cfg = LaunchWindowConfig { step_hours: 0, ..Default::default() };
        assert!(LaunchWindowOptimizer::new(cfg).is_err());
    }
}
