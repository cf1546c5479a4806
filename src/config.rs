use serde::{Deserialize, Serialize};

use crate::docking::{DockingConfig, DockingParameters};
use crate::error::{Error, Result};
use crate::orbital::{LaunchWindowConfig, PropagatorConfig, RendezvousConfig};
use crate::vehicle::Spacecraft;

/// Every tunable of the engine in one record. Missing sections and fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub propagator: PropagatorConfig,
    pub rendezvous: RendezvousConfig,
    pub launch: LaunchWindowConfig,
    pub docking: DockingConfig,
    pub docking_parameters: DockingParameters,
    pub spacecraft: Spacecraft,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.propagator.validate()?;
        self.rendezvous.validate()?;
        self.launch.validate()?;
        self.docking.validate()?;
        self.docking_parameters.validate()?;
        self.spacecraft.validate()
    }
}
