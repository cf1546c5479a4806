use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_positive, Result};
use crate::physics::gravity::MU_EARTH;

/// Result of a Hohmann transfer calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HohmannTransfer {
    pub dv1: f64,                 // m/s, first burn, positive = prograde
    pub dv2: f64,                 // m/s, second burn, positive = prograde
    pub total_dv: f64,            // m/s, |dv1| + |dv2|
    pub transfer_time_s: f64,     // half the transfer ellipse period
    pub transfer_time_hours: f64,
    /// Lead angle of the target over the chaser at the first burn, rad.
    pub phase_angle: f64,
    pub transfer_sma: f64,        // m
    pub r1: f64,                  // m, initial orbit radius
    pub r2: f64,                  // m, final orbit radius
}

/// Compute a Hohmann transfer between two circular orbits.
///
/// `r1` and `r2` are orbital radii (not altitudes), in meters. Works in
/// both directions; burns are negative (retrograde) when lowering.
pub fn hohmann(r1: f64, r2: f64) -> Result<HohmannTransfer> {
    hohmann_mu(r1, r2, MU_EARTH)
}

pub fn hohmann_mu(r1: f64, r2: f64, mu: f64) -> Result<HohmannTransfer> {
    ensure_positive("r1", r1)?;
    ensure_positive("r2", r2)?;
    ensure_positive("mu", mu)?;

    let a_transfer = (r1 + r2) / 2.0;

    let v_circ1 = (mu / r1).sqrt();
    let v_circ2 = (mu / r2).sqrt();

    let v_transfer_1 = (mu * (2.0 / r1 - 1.0 / a_transfer)).sqrt();
    let v_transfer_2 = (mu * (2.0 / r2 - 1.0 / a_transfer)).sqrt();

    let dv1 = v_transfer_1 - v_circ1;
    let dv2 = v_circ2 - v_transfer_2;

    let transfer_time_s = PI * (a_transfer.powi(3) / mu).sqrt();

    // Target sweeps n2 * t_transfer while the chaser covers pi
    let phase_angle = PI * (1.0 - ((r1 + r2) / (2.0 * r2)).powf(1.5));

    Ok(HohmannTransfer {
        dv1,
        dv2,
        total_dv: dv1.abs() + dv2.abs(),
        transfer_time_s,
        transfer_time_hours: transfer_time_s / 3600.0,
        phase_angle,
        transfer_sma: a_transfer,
        r1,
        r2,
    })
}

/// Single-impulse change of orbital plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneChange {
    pub delta_v: f64,             // m/s
    pub delta_inclination: f64,   // rad, signed as requested
}

/// Delta-v to rotate a velocity of magnitude `v` by `delta_inclination`:
/// `2 v sin(|di| / 2)`.
pub fn plane_change(v: f64, delta_inclination: f64) -> Result<PlaneChange> {
    ensure_finite("v", v)?;
    ensure_finite("delta_inclination", delta_inclination)?;
    Ok(PlaneChange {
        delta_v: 2.0 * v.abs() * (delta_inclination.abs() / 2.0).sin(),
        delta_inclination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::gravity::R_EARTH;

    #[test]
    fn hohmann_leo_to_geo_matches_closed_form() {
        let r1 = 6_778_000.0;
        let r2 = 42_164_000.0;
        let h = hohmann(r1, r2).unwrap();

        // Analytic: sqrt(mu/r1) (sqrt(2 r2/(r1+r2)) - 1) + sqrt(mu/r2) (1 - sqrt(2 r1/(r1+r2)))
        let expected = (MU_EARTH / r1).sqrt() * ((2.0 * r2 / (r1 + r2)).sqrt() - 1.0)
            + (MU_EARTH / r2).sqrt() * (1.0 - (2.0 * r1 / (r1 + r2)).sqrt());
        assert!(((h.total_dv - expected) / expected).abs() < 0.01);
        // ~3.85 km/s total, ~5.3 h transfer
        assert!((h.total_dv - 3854.0).abs() < 38.0, "got {:.0} m/s", h.total_dv);
        assert!((h.transfer_time_hours - 5.29).abs() < 0.05);
        assert!((h.phase_angle.to_degrees() - 100.4).abs() < 0.5);
    }

    #[test]
    fn lowering_burns_are_retrograde() {
        let up = hohmann(7_000_000.0, 8_000_000.0).unwrap();
        let down = hohmann(8_000_000.0, 7_000_000.0).unwrap();
        assert!(up.dv1 > 0.0 && up.dv2 > 0.0);
        assert!(down.dv1 < 0.0 && down.dv2 < 0.0);
        assert!((up.total_dv - down.total_dv).abs() < 1e-6);
    }

    #[test]
    fn zero_dv_for_same_orbit() {
        let r = R_EARTH + 400_000.0;
        let h = hohmann(r, r).unwrap();
        assert!(h.total_dv < 1e-6);
        assert!(h.phase_angle.abs() < 1e-12);
    }

    #[test]
    fn rejects_non_physical_radius() {
        assert!(hohmann(0.0, 7_000_000.0).is_err());
        assert!(hohmann(7_000_000.0, f64::NAN).is_err());
    }

    #[test]
    fn plane_change_formula() {
        let pc = plane_change(7_660.0, 10f64.to_radians()).unwrap();
        assert!((pc.delta_v - 2.0 * 7_660.0 * 5f64.to_radians().sin()).abs() < 1e-9);
        // 60 degrees costs exactly the orbital speed
        let pc = plane_change(7_660.0, -60f64.to_radians()).unwrap();
        assert!((pc.delta_v - 7_660.0).abs() < 1e-9);
    }
}
