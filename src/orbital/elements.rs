use std::f64::consts::{PI, TAU};

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::state::StateVector;
use crate::error::{Error, Result};
use crate::physics::earth::wrap_two_pi;
use crate::physics::gravity::{MU_EARTH, R_EARTH};

/// Below this eccentricity the orbit is treated as circular.
pub const CIRCULAR_TOL: f64 = 1e-9;
/// Below this sin(i) the orbit is treated as equatorial.
pub const EQUATORIAL_TOL: f64 = 1e-9;
/// |e - 1| below this is parabolic (infinite semi-major axis).
pub const PARABOLIC_TOL: f64 = 1e-6;

/// Classical orbital elements at an epoch.
///
/// Degenerate geometries use fallbacks instead of undefined angles:
/// - equatorial: `raan = 0` and `argument_of_perigee` is the longitude of
///   perigee, measured from the ECI x axis;
/// - circular: `argument_of_perigee = 0` and `true_anomaly` holds the
///   argument of latitude (true longitude when also equatorial).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub semi_major_axis: f64,     // m, +inf for parabolic, negative for hyperbolic
    pub eccentricity: f64,        // 0 = circular
    pub inclination: f64,         // rad
    pub raan: f64,                // right ascension of ascending node, rad
    pub argument_of_perigee: f64, // rad
    pub true_anomaly: f64,        // rad
    pub epoch: DateTime<Utc>,
}

impl OrbitalElements {
    /// Convert an ECI state vector to orbital elements.
    pub fn from_state(state: &StateVector) -> Result<Self> {
        Self::from_state_mu(state, MU_EARTH)
    }

    /// Convert with explicit gravitational parameter.
    pub fn from_state_mu(state: &StateVector, mu: f64) -> Result<Self> {
        if !state.is_finite() {
            return Err(Error::DegenerateOrbit("non-finite state vector"));
        }
        let pos = &state.position;
        let vel = &state.velocity;
        let r = pos.norm();
        let v = vel.norm();
        if r == 0.0 {
            return Err(Error::DegenerateOrbit("position at the attracting centre"));
        }

        // Angular momentum
        let h = pos.cross(vel);
        let h_mag = h.norm();
        if h_mag <= 1e-12 * r * v.max(1.0) {
            return Err(Error::DegenerateOrbit(
                "zero angular momentum (rectilinear trajectory)",
            ));
        }

        // Node vector: z x h
        let n = Vector3::new(-h.y, h.x, 0.0);
        let n_mag = n.norm();

        // Eccentricity vector
        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();

        let energy = 0.5 * v * v - mu / r;
        let semi_major_axis = if (ecc - 1.0).abs() > PARABOLIC_TOL {
            -mu / (2.0 * energy)
        } else {
            f64::INFINITY
        };

        let inclination = (h.z / h_mag).clamp(-1.0, 1.0).acos();

        let equatorial = n_mag / h_mag < EQUATORIAL_TOL;
        let circular = ecc < CIRCULAR_TOL;
        // In-plane angles of the equatorial fallbacks run the other way for retrograde orbits
        let prograde = h.z >= 0.0;
        let angle_from_x = |w: &Vector3<f64>| -> f64 {
            let lon = w.y.atan2(w.x);
            wrap_two_pi(if prograde { lon } else { -lon })
        };

        let raan = if equatorial {
            0.0
        } else {
            wrap_two_pi(n.y.atan2(n.x))
        };

        let argument_of_perigee = if circular {
            0.0
        } else if equatorial {
            angle_from_x(&e_vec)
        } else {
            let w = (n.dot(&e_vec) / (n_mag * ecc)).clamp(-1.0, 1.0).acos();
            if e_vec.z < 0.0 { TAU - w } else { w }
        };

        let true_anomaly = if !circular {
            let nu = (e_vec.dot(pos) / (ecc * r)).clamp(-1.0, 1.0).acos();
            if pos.dot(vel) < 0.0 { TAU - nu } else { nu }
        } else if !equatorial {
            // Argument of latitude
            let u = (n.dot(pos) / (n_mag * r)).clamp(-1.0, 1.0).acos();
            if pos.z < 0.0 { TAU - u } else { u }
        } else {
            // True longitude
            angle_from_x(pos)
        };

        Ok(OrbitalElements {
            semi_major_axis,
            eccentricity: ecc,
            inclination,
            raan,
            argument_of_perigee: wrap_two_pi(argument_of_perigee),
            true_anomaly: wrap_two_pi(true_anomaly),
            epoch: state.epoch,
        })
    }

    /// Convert orbital elements to an ECI state vector.
    pub fn to_state(&self) -> Result<StateVector> {
        self.to_state_mu(MU_EARTH)
    }

    /// Convert with explicit gravitational parameter.
    pub fn to_state_mu(&self, mu: f64) -> Result<StateVector> {
        let ecc = self.eccentricity;
        if !self.semi_major_axis.is_finite() {
            return Err(Error::DegenerateOrbit(
                "parabolic elements carry no semi-latus rectum",
            ));
        }
        if !(ecc.is_finite() && ecc >= 0.0) {
            return Err(Error::DegenerateOrbit("eccentricity must be finite and non-negative"));
        }
        let p = self.semi_major_axis * (1.0 - ecc * ecc); // semi-latus rectum
        if !(p > 0.0) {
            return Err(Error::DegenerateOrbit(
                "semi-major axis inconsistent with eccentricity",
            ));
        }
        let nu = self.true_anomaly;
        let denom = 1.0 + ecc * nu.cos();
        if denom <= 1e-12 {
            return Err(Error::DegenerateOrbit("true anomaly beyond hyperbolic asymptote"));
        }
        let r_pqw = p / denom;

        // Position in perifocal frame (PQW)
        let r_pqw_vec = Vector3::new(r_pqw * nu.cos(), r_pqw * nu.sin(), 0.0);

        // Velocity in perifocal frame
        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw_vec = Vector3::new(-sqrt_mu_p * nu.sin(), sqrt_mu_p * (ecc + nu.cos()), 0.0);

        // Rotation PQW -> ECI: Rz(raan) Rx(inc) Rz(argp)
        let (sin_raan, cos_raan) = self.raan.sin_cos();
        let (sin_argp, cos_argp) = self.argument_of_perigee.sin_cos();
        let (sin_inc, cos_inc) = self.inclination.sin_cos();

        let rot = |v: &Vector3<f64>| -> Vector3<f64> {
            Vector3::new(
                (cos_raan * cos_argp - sin_raan * sin_argp * cos_inc) * v.x
                    + (-cos_raan * sin_argp - sin_raan * cos_argp * cos_inc) * v.y,
                (sin_raan * cos_argp + cos_raan * sin_argp * cos_inc) * v.x
                    + (-sin_raan * sin_argp + cos_raan * cos_argp * cos_inc) * v.y,
                (sin_argp * sin_inc) * v.x + (cos_argp * sin_inc) * v.y,
            )
        };

        Ok(StateVector::new(rot(&r_pqw_vec), rot(&v_pqw_vec), self.epoch))
    }

    /// Circular orbit at `altitude` above the equatorial radius.
    pub fn circular(altitude: f64, inclination: f64, epoch: DateTime<Utc>) -> Self {
        OrbitalElements {
            semi_major_axis: R_EARTH + altitude,
            eccentricity: 0.0,
            inclination,
            raan: 0.0,
            argument_of_perigee: 0.0,
            true_anomaly: 0.0,
            epoch,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.eccentricity < 1.0 && self.semi_major_axis.is_finite() && self.semi_major_axis > 0.0
    }

    /// Orbital period (s); NaN for unbound orbits.
    pub fn period(&self) -> f64 {
        if self.is_bound() {
            TAU * (self.semi_major_axis.powi(3) / MU_EARTH).sqrt()
        } else {
            f64::NAN
        }
    }

    /// Mean motion (rad/s); NaN for unbound orbits.
    pub fn mean_motion(&self) -> f64 {
        TAU / self.period()
    }

    pub fn perigee_radius(&self) -> f64 {
        if self.semi_major_axis.is_finite() {
            self.semi_major_axis * (1.0 - self.eccentricity)
        } else {
            f64::NAN
        }
    }

    /// Apogee radius (m); infinite for unbound orbits.
    pub fn apogee_radius(&self) -> f64 {
        if self.is_bound() {
            self.semi_major_axis * (1.0 + self.eccentricity)
        } else {
            f64::INFINITY
        }
    }

    pub fn with_true_anomaly(mut self, true_anomaly: f64) -> Self {
        self.true_anomaly = wrap_two_pi(true_anomaly);
        self
    }
}

/// Smallest signed difference between two angles, rad in [-pi, pi).
pub fn angle_difference(a: f64, b: f64) -> f64 {
    (a - b + PI).rem_euclid(TAU) - PI
}
