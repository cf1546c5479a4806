use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::physics::gravity::G0;

// ---------------------------------------------------------------------------
// Spacecraft propulsion model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacecraft {
    pub name: String,
    pub dry_mass: f64,        // kg
    pub propellant_mass: f64, // kg
    pub thrust: f64,          // N, main engine
    pub isp: f64,             // s
}

impl Default for Spacecraft {
    fn default() -> Self {
        presets::transfer_vehicle()
    }
}

impl Spacecraft {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("dry_mass", self.dry_mass, self.dry_mass > 0.0),
            ("propellant_mass", self.propellant_mass, self.propellant_mass >= 0.0),
            ("thrust", self.thrust, self.thrust > 0.0),
            ("isp", self.isp, self.isp > 0.0),
        ];
        for (name, value, ok) in checks {
            if !(ok && value.is_finite()) {
                return Err(Error::InvalidConfig(format!(
                    "spacecraft.{} out of range: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Propellant mass flow rate: mdot = F / (Isp * g0)
    pub fn mass_flow(&self) -> f64 {
        self.thrust / (self.isp * G0)
    }

    /// Effective exhaust velocity, m/s.
    pub fn exhaust_velocity(&self) -> f64 {
        self.isp * G0
    }

    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.propellant_mass
    }

    /// Ideal delta-v capacity (Tsiolkovsky rocket equation).
    pub fn delta_v(&self) -> f64 {
        self.exhaust_velocity() * (self.total_mass() / self.dry_mass).ln()
    }

    /// Propellant needed for `dv` starting from mass `mass`, LINEAR APPROXIMATION.
    ///
    /// First-order expansion of the rocket equation, `m * dv / (Isp g0)`.
    /// It overestimates the exact value and is only close while
    /// `dv` is small compared with the exhaust velocity.
    pub fn propellant_linear(&self, mass: f64, dv: f64) -> f64 {
        mass * dv.abs() / self.exhaust_velocity()
    }

    /// Exact rocket-equation propellant for `dv` starting from mass `mass`.
    pub fn propellant_exact(&self, mass: f64, dv: f64) -> f64 {
        mass * (1.0 - (-dv.abs() / self.exhaust_velocity()).exp())
    }

    /// Main engine burn time to expel `propellant` kg.
    pub fn burn_duration(&self, propellant: f64) -> f64 {
        propellant / self.mass_flow()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct SpacecraftBuilder {
    inner: Spacecraft,
}

impl SpacecraftBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Spacecraft {
                name: name.into(),
                ..presets::transfer_vehicle()
            },
        }
    }

    pub fn dry_mass(mut self, v: f64) -> Self { self.inner.dry_mass = v; self }
    pub fn propellant_mass(mut self, v: f64) -> Self { self.inner.propellant_mass = v; self }
    pub fn thrust(mut self, v: f64) -> Self { self.inner.thrust = v; self }
    pub fn isp(mut self, v: f64) -> Self { self.inner.isp = v; self }

    pub fn build(self) -> Result<Spacecraft> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::Spacecraft;

    /// Small orbital transfer vehicle, storable bipropellant (Isp 450 s).
    pub fn transfer_vehicle() -> Spacecraft {
        Spacecraft {
            name: "OTV-1".into(),
            dry_mass: 1_000.0,
            propellant_mass: 800.0,
            thrust: 4_000.0,
            isp: 450.0,
        }
    }

    /// Cargo vehicle visiting a station; figures are only indicative.
    pub fn cargo_vehicle() -> Spacecraft {
        Spacecraft {
            name: "Cargo".into(),
            dry_mass: 6_000.0,
            propellant_mass: 1_000.0,
            thrust: 2_000.0,
            isp: 300.0,
        }
    }
}
