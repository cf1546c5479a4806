use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::elements::{angle_difference, OrbitalElements};
use super::maneuvers::{hohmann, plane_change};
use super::state::{offset_epoch, seconds_between, StateVector};
use crate::error::{ensure_finite, ensure_positive, Error, Result};
use crate::vehicle::Spacecraft;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendezvousConfig {
    pub plane_change_threshold_rad: f64,
    pub sma_threshold_m: f64,
    pub plane_change_delay_s: f64,     // after plan epoch
    pub hohmann_delay_s: f64,          // after plan epoch
    pub final_approach_delay_s: f64,   // after plan epoch
    pub final_approach_gap_s: f64,     // minimum spacing after the last burn
    pub final_approach_dv: f64,        // m/s
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self {
            plane_change_threshold_rad: 0.001,
            sma_threshold_m: 1_000.0,
            plane_change_delay_s: 3_600.0,
            hohmann_delay_s: 7_200.0,
            final_approach_delay_s: 21_600.0,
            final_approach_gap_s: 3_600.0,
            final_approach_dv: 50.0,
        }
    }
}

impl RendezvousConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("plane_change_threshold_rad", self.plane_change_threshold_rad),
            ("sma_threshold_m", self.sma_threshold_m),
            ("plane_change_delay_s", self.plane_change_delay_s),
            ("hohmann_delay_s", self.hohmann_delay_s),
            ("final_approach_delay_s", self.final_approach_delay_s),
            ("final_approach_gap_s", self.final_approach_gap_s),
            ("final_approach_dv", self.final_approach_dv),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "rendezvous.{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    PlaneChange,
    HohmannDeparture,
    HohmannArrival,
    FinalApproach,
}

/// One impulsive burn of a rendezvous sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverPlan {
    pub id: usize,
    pub kind: ManeuverKind,
    /// Radial / transverse / normal components, m/s.
    pub delta_v: Vector3<f64>,
    pub execution_time: DateTime<Utc>,
    pub burn_duration_s: f64,
    pub propellant_kg: f64,
    /// Orbit expected after the burn.
    pub target_elements: OrbitalElements,
    pub description: String,
}

impl ManeuverPlan {
    pub fn delta_v_magnitude(&self) -> f64 {
        self.delta_v.norm()
    }
}

/// Target minus chaser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeElements {
    pub delta_a: f64, // m
    pub delta_e: f64,
    pub delta_i: f64, // rad
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendezvousPlan {
    pub maneuvers: Vec<ManeuverPlan>,
    pub total_delta_v: f64,        // m/s
    pub estimated_duration_s: f64, // plan epoch to end of last burn
    pub propellant_kg: f64,
    /// Propellant left on board after the sequence, negative if short.
    pub propellant_margin_kg: f64,
    pub relative: RelativeElements,
}

impl RendezvousPlan {
    pub fn is_feasible(&self) -> bool {
        self.propellant_margin_kg >= 0.0
    }
}

/// Plans the impulsive burn sequence bringing a chaser onto a target orbit.
#[derive(Debug, Clone)]
pub struct RendezvousPlanner {
    config: RendezvousConfig,
    spacecraft: Spacecraft,
}

impl RendezvousPlanner {
    pub fn new(config: RendezvousConfig, spacecraft: Spacecraft) -> Result<Self> {
        config.validate()?;
        spacecraft.validate()?;
        Ok(Self { config, spacecraft })
    }

    pub fn config(&self) -> &RendezvousConfig {
        &self.config
    }

    pub fn spacecraft(&self) -> &Spacecraft {
        &self.spacecraft
    }

    pub fn plan(&self, chaser: &StateVector, target: &StateVector) -> Result<RendezvousPlan> {
        let chaser_el = OrbitalElements::from_state(chaser)?;
        let target_el = OrbitalElements::from_state(target)?;
        if !chaser_el.is_bound() || !target_el.is_bound() {
            warn!("rendezvous requested between unbound orbits");
            return Err(Error::DegenerateOrbit("rendezvous requires bound orbits"));
        }

        let relative = RelativeElements {
            delta_a: target_el.semi_major_axis - chaser_el.semi_major_axis,
            delta_e: target_el.eccentricity - chaser_el.eccentricity,
            delta_i: target_el.inclination - chaser_el.inclination,
        };
        debug!(
            "relative elements: da={:.1} m de={:.5} di={:.4} deg",
            relative.delta_a,
            relative.delta_e,
            relative.delta_i.to_degrees()
        );

        let cfg = &self.config;
        let t0 = chaser.epoch;
        let mut burns: Vec<(ManeuverKind, Vector3<f64>, DateTime<Utc>, OrbitalElements, String)> =
            Vec::new();
        let mut current = chaser_el;

        // -- Plane change -------------------------------------------------------
        if relative.delta_i.abs() > cfg.plane_change_threshold_rad {
            let v = chaser.speed();
            let pc = plane_change(v, relative.delta_i)?;
            let dv = Vector3::new(
                0.0,
                v * (relative.delta_i.cos() - 1.0),
                v * relative.delta_i.sin(),
            );
            current.inclination = target_el.inclination;
            current.raan = target_el.raan;
            burns.push((
                ManeuverKind::PlaneChange,
                dv,
                offset_epoch(&t0, cfg.plane_change_delay_s)?,
                current,
                format!(
                    "plane change {:+.3} deg ({:.1} m/s)",
                    relative.delta_i.to_degrees(),
                    pc.delta_v
                ),
            ));
        }

        // -- Hohmann transfer ---------------------------------------------------
        if relative.delta_a.abs() > cfg.sma_threshold_m {
            let transfer = hohmann(chaser_el.semi_major_axis, target_el.semi_major_axis)?;
            let departure = offset_epoch(&t0, cfg.hohmann_delay_s)?;
            let arrival = offset_epoch(&departure, transfer.transfer_time_s)?;

            let mut transfer_orbit = current;
            transfer_orbit.semi_major_axis = transfer.transfer_sma;
            transfer_orbit.eccentricity =
                (transfer.r2 - transfer.r1).abs() / (transfer.r1 + transfer.r2);
            burns.push((
                ManeuverKind::HohmannDeparture,
                Vector3::new(0.0, transfer.dv1, 0.0),
                departure,
                transfer_orbit,
                format!(
                    "Hohmann departure burn, transfer time {:.2} h",
                    transfer.transfer_time_hours
                ),
            ));

            current.semi_major_axis = target_el.semi_major_axis;
            current.eccentricity = target_el.eccentricity;
            burns.push((
                ManeuverKind::HohmannArrival,
                Vector3::new(0.0, transfer.dv2, 0.0),
                arrival,
                current,
                "Hohmann arrival burn".to_string(),
            ));
        }

        // -- Final approach -----------------------------------------------------
        let nominal = offset_epoch(&t0, cfg.final_approach_delay_s)?;
        let final_time = match burns.last() {
            Some((_, _, last, _, _)) => nominal.max(offset_epoch(last, cfg.final_approach_gap_s)?),
            None => nominal,
        };
        burns.push((
            ManeuverKind::FinalApproach,
            Vector3::new(0.0, cfg.final_approach_dv, 0.0),
            final_time,
            target_el,
            "final approach and phasing".to_string(),
        ));

        // -- Propellant (linear approximation, mass decreasing) -----------------
        // Running mass is floored at the dry mass; any shortfall lands in the margin.
        let dry_mass = self.spacecraft.dry_mass;
        let mut mass = self.spacecraft.total_mass();
        let mut maneuvers = Vec::with_capacity(burns.len());
        for (id, (kind, delta_v, execution_time, target_elements, description)) in
            burns.into_iter().enumerate()
        {
            let propellant_kg = self.spacecraft.propellant_linear(mass, delta_v.norm());
            mass = (mass - propellant_kg).max(dry_mass);
            maneuvers.push(ManeuverPlan {
                id,
                kind,
                delta_v,
                execution_time,
                burn_duration_s: self.spacecraft.burn_duration(propellant_kg),
                propellant_kg,
                target_elements,
                description,
            });
        }

        let total_delta_v: f64 = maneuvers.iter().map(ManeuverPlan::delta_v_magnitude).sum();
        let propellant_kg: f64 = maneuvers.iter().map(|m| m.propellant_kg).sum();
        let estimated_duration_s = maneuvers
            .last()
            .map(|m| seconds_between(&t0, &m.execution_time) + m.burn_duration_s)
            .unwrap_or(0.0);

        let plan = RendezvousPlan {
            maneuvers,
            total_delta_v,
            estimated_duration_s,
            propellant_kg,
            propellant_margin_kg: self.spacecraft.propellant_mass - propellant_kg,
            relative,
        };
        info!(
            "rendezvous plan: {} burns, {:.1} m/s, {:.1} kg propellant, {:.2} h",
            plan.maneuvers.len(),
            plan.total_delta_v,
            plan.propellant_kg,
            plan.estimated_duration_s / 3600.0
        );
        if !plan.is_feasible() {
            warn!(
                "rendezvous plan short of propellant by {:.1} kg",
                -plan.propellant_margin_kg
            );
        }
        Ok(plan)
    }
}

/// Lead angle of `target` over `chaser` in the orbital plane, rad in [-pi, pi).
///
/// Both are measured as argument of latitude; only meaningful when the
/// two orbits are close to coplanar.
pub fn phase_angle(chaser: &OrbitalElements, target: &OrbitalElements) -> Result<f64> {
    ensure_finite("chaser.true_anomaly", chaser.true_anomaly)?;
    ensure_finite("target.true_anomaly", target.true_anomaly)?;
    ensure_positive("chaser.semi_major_axis", chaser.semi_major_axis)?;
    let u_chaser = chaser.raan + chaser.argument_of_perigee + chaser.true_anomaly;
    let u_target = target.raan + target.argument_of_perigee + target.true_anomaly;
    Ok(angle_difference(u_target, u_chaser))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::earth::j2000;
    use crate::physics::gravity::R_EARTH;
    use crate::vehicle::presets;

    fn state(altitude: f64, inc_deg: f64) -> StateVector {
        OrbitalElements::circular(altitude, inc_deg.to_radians(), j2000())
            .to_state()
            .unwrap()
    }

    fn planner() -> RendezvousPlanner {
        RendezvousPlanner::new(RendezvousConfig::default(), presets::transfer_vehicle()).unwrap()
    }

    #[test]
    fn coplanar_raise_uses_hohmann_then_final_approach() {
        let plan = planner().plan(&state(400_000.0, 51.6), &state(420_000.0, 51.6)).unwrap();
        let kinds: Vec<_> = plan.maneuvers.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ManeuverKind::HohmannDeparture,
                ManeuverKind::HohmannArrival,
                ManeuverKind::FinalApproach
            ]
        );
        let t0 = j2000();
        assert_eq!(seconds_between(&t0, &plan.maneuvers[0].execution_time).round(), 7200.0);
        assert_eq!(seconds_between(&t0, &plan.maneuvers[2].execution_time).round(), 21_600.0);
        // ~11.4 m/s for a 20 km raise, plus the fixed 50 m/s
        assert!((plan.total_delta_v - 61.4).abs() < 1.0, "{}", plan.total_delta_v);
        assert!(plan.is_feasible());
        assert!((plan.relative.delta_a - 20_000.0).abs() < 1e-3);
    }

    #[test]
    fn plane_change_first_and_magnitude() {
        let chaser = state(400_000.0, 51.6);
        let plan = planner().plan(&chaser, &state(400_000.0, 52.6)).unwrap();
        assert_eq!(plan.maneuvers.len(), 2);
        let pc = &plan.maneuvers[0];
        assert_eq!(pc.kind, ManeuverKind::PlaneChange);
        let expected = 2.0 * chaser.speed() * (0.5f64.to_radians()).sin();
        assert!((pc.delta_v_magnitude() - expected).abs() < 1e-6);
        assert_eq!(seconds_between(&j2000(), &pc.execution_time).round(), 3600.0);
        assert!((pc.target_elements.inclination.to_degrees() - 52.6).abs() < 1e-6);
    }

    #[test]
    fn same_orbit_only_final_approach() {
        let s = state(400_000.0, 51.6);
        let plan = planner().plan(&s, &s).unwrap();
        assert_eq!(plan.maneuvers.len(), 1);
        assert_eq!(plan.maneuvers[0].kind, ManeuverKind::FinalApproach);
        assert!((plan.total_delta_v - 50.0).abs() < 1e-9);
    }

    #[test]
    fn final_approach_follows_long_transfer() {
        let plan = planner()
            .plan(&state(400_000.0, 0.0), &state(42_164_000.0 - R_EARTH, 0.0))
            .unwrap();
        let n = plan.maneuvers.len();
        let arrival = &plan.maneuvers[n - 2];
        let last = &plan.maneuvers[n - 1];
        assert_eq!(arrival.kind, ManeuverKind::HohmannArrival);
        let gap = seconds_between(&arrival.execution_time, &last.execution_time);
        assert!((gap - 3600.0).abs() < 1e-3);
        assert!(plan.maneuvers.windows(2).all(|w| w[0].execution_time <= w[1].execution_time));
        // ~3.9 km/s is far beyond an 800 kg load at 450 s
        assert!(!plan.is_feasible());
    }

    #[test]
    fn propellant_uses_decreasing_mass() {
        let sc = presets::transfer_vehicle();
        let plan = planner().plan(&state(400_000.0, 51.6), &state(420_000.0, 51.6)).unwrap();
        let ve = sc.exhaust_velocity();
        let mut mass = sc.total_mass();
        for m in &plan.maneuvers {
            let expected = mass * m.delta_v_magnitude() / ve;
            assert!((m.propellant_kg - expected).abs() < 1e-9);
            assert!((m.burn_duration_s - m.propellant_kg / sc.mass_flow()).abs() < 1e-9);
            mass -= expected;
        }
        let sum: f64 = plan.maneuvers.iter().map(|m| m.propellant_kg).sum();
        assert!((plan.propellant_kg - sum).abs() < 1e-9);
    }

    #[test]
    fn large_plane_change_never_drives_mass_negative() {
        let sc = presets::transfer_vehicle();
        let plan = planner().plan(&state(400_000.0, 0.0), &state(400_000.0, 60.0)).unwrap();
        assert_eq!(plan.maneuvers[0].kind, ManeuverKind::PlaneChange);
        // ~7.7 km/s turns the whole wet mass into propellant and then some
        assert!(plan.maneuvers[0].propellant_kg > sc.propellant_mass);
        for m in &plan.maneuvers {
            assert!(m.propellant_kg >= 0.0, "{:?} {}", m.kind, m.propellant_kg);
            assert!(m.burn_duration_s >= 0.0);
        }
        // Later burns are sized for at least the dry vehicle
        let last = plan.maneuvers.last().unwrap();
        let floor = sc.propellant_linear(sc.dry_mass, last.delta_v_magnitude());
        assert!((last.propellant_kg - floor).abs() < 1e-9);
        let sum: f64 = plan.maneuvers.iter().map(|m| m.propellant_kg).sum();
        assert!((plan.propellant_kg - sum).abs() < 1e-9);
        assert!(plan.propellant_kg > sc.propellant_mass);
        assert!(!plan.is_feasible());
    }

    #[test]
    fn degenerate_chaser_rejected() {
        let radial = StateVector::new(
            Vector3::new(7_000_000.0, 0.0, 0.0),
            Vector3::new(100.0, 0.0, 0.0),
            j2000(),
        );
        let err = planner().plan(&radial, &state(400_000.0, 51.6)).unwrap_err();
        assert!(matches!(err, Error::DegenerateOrbit(_)));
    }

    #[test]
    fn phase_angle_wraps() {
        let a = OrbitalElements::circular(400_000.0, 0.0, j2000()).with_true_anomaly(0.1);
        let b = OrbitalElements::circular(400_000.0, 0.0, j2000()).with_true_anomaly(6.2);
        let phase = phase_angle(&a, &b).unwrap();
        assert!((phase - (6.2 - 0.1 - std::f64::consts::TAU)).abs() < 1e-9);
    }
}
