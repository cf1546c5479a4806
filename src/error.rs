use thiserror::Error;

/// Why a propagation run was stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DivergenceReason {
    /// Position or velocity became NaN or infinite.
    NonFinite,
    /// Radius dropped below the configured minimum outside reentry mode.
    BelowMinimumRadius { radius: f64, minimum: f64 },
    /// Radius grew past the sanity bound derived from the expected apogee.
    BeyondSanityBound { radius: f64, bound: f64 },
}

impl std::fmt::Display for DivergenceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite => write!(f, "non-finite state"),
            Self::BelowMinimumRadius { radius, minimum } => write!(
                f,
                "radius {:.0} m below minimum {:.0} m",
                radius, minimum
            ),
            Self::BeyondSanityBound { radius, bound } => write!(
                f,
                "radius {:.0} m beyond sanity bound {:.0} m",
                radius, bound
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Zero angular momentum (rectilinear trajectory) or elements that
    /// do not describe a conic we can place in space.
    #[error("degenerate orbit: {0}")]
    DegenerateOrbit(&'static str),

    /// The target plane cannot be reached by a direct ascent from this latitude.
    #[error("inclination {inclination_deg:.3} deg unreachable from latitude {latitude_deg:.3} deg")]
    UnreachableOrbit {
        inclination_deg: f64,
        latitude_deg: f64,
    },

    /// Numerical integration produced a non-physical state.
    #[error("simulation diverged at t={time_s:.1} s: {reason}")]
    SimulationDivergence {
        time_s: f64,
        reason: DivergenceReason,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject NaN, infinities and non-positive values for a named input.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: format!("expected a finite positive value, got {}", value),
        })
    }
}

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: format!("expected a finite value, got {}", value),
        })
    }
}
