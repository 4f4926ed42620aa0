//! Simulation tuning.
//!
//! Every threshold the simulation compares against lives here so hosts can
//! load them from a RON file. Decimal values are written as plain numbers
//! in RON and converted to [`Fixed`] once on load.
//!
//! # Example RON
//!
//! ```ron
//! SimConfig(
//!     arrival_epsilon: 0.1,
//!     selection_half_width: 0.5,
//!     order_half_width: 1.0,
//!     starting_resources: (gold: 1000, wood: 500, food: 1, max_food: 4),
//!     harvest: (enabled: true, carry_capacity: 10, gather_rate: 2.0),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::economy::ResourceState;
use crate::error::{GameError, Result};
use crate::math::{ratio, Fixed};

/// Serde support for human-written decimals.
///
/// Reads and writes plain decimal numbers, converting to [`Fixed`] exactly
/// once at the file boundary.
pub mod decimal_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a decimal into a fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| serde::de::Error::custom(format!("{value} is out of range")))
    }
}

/// Harvest loop parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// When false, workers enter `Harvesting` and then stand still forever.
    pub enabled: bool,
    /// Maximum load a worker carries back to a depot.
    pub carry_capacity: u32,
    /// Resources gathered per second while at a node.
    #[serde(with = "decimal_serde")]
    pub gather_rate: Fixed,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            carry_capacity: 10,
            gather_rate: Fixed::from_num(2),
        }
    }
}

/// Simulation thresholds and starting state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Distance under which a moving unit snaps onto its target.
    #[serde(with = "decimal_serde")]
    pub arrival_epsilon: Fixed,
    /// Half-width of the square a click must land in to select an entity.
    #[serde(with = "decimal_serde")]
    pub selection_half_width: Fixed,
    /// Half-width of the square an order point must land in to target a
    /// resource node.
    #[serde(with = "decimal_serde")]
    pub order_half_width: Fixed,
    /// Player stockpile at simulation start.
    pub starting_resources: ResourceState,
    /// Harvest loop parameters.
    pub harvest: HarvestConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arrival_epsilon: ratio(1, 10),
            selection_half_width: ratio(1, 2),
            order_half_width: Fixed::from_num(1),
            starting_resources: ResourceState::default(),
            harvest: HarvestConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = ron::from_str(&contents).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds the simulation cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.arrival_epsilon <= Fixed::ZERO {
            return Err(GameError::InvalidConfig(
                "arrival_epsilon must be positive".to_string(),
            ));
        }
        if self.selection_half_width <= Fixed::ZERO || self.order_half_width <= Fixed::ZERO {
            return Err(GameError::InvalidConfig(
                "proximity half-widths must be positive".to_string(),
            ));
        }
        if self.harvest.enabled
            && (self.harvest.carry_capacity == 0 || self.harvest.gather_rate <= Fixed::ZERO)
        {
            return Err(GameError::InvalidConfig(
                "harvest needs a positive carry capacity and gather rate".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.order_half_width, config.selection_half_width * Fixed::from_num(2));
    }

    #[test]
    fn test_from_ron_partial_uses_defaults() {
        let config = SimConfig::from_ron_str("(arrival_epsilon: 0.25)").unwrap();
        assert_eq!(config.arrival_epsilon, ratio(1, 4));
        assert_eq!(config.selection_half_width, ratio(1, 2));
        assert_eq!(config.harvest, HarvestConfig::default());
    }

    #[test]
    fn test_rejects_non_positive_epsilon() {
        let err = SimConfig::from_ron_str("(arrival_epsilon: 0.0)").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_disabled_harvest_skips_rate_check() {
        let config =
            SimConfig::from_ron_str("(harvest: (enabled: false, gather_rate: 0.0))").unwrap();
        assert!(!config.harvest.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.ron");
        std::fs::write(&path, "(harvest: (carry_capacity: 25))").unwrap();

        let config = SimConfig::load(&path).unwrap();
        assert_eq!(config.harvest.carry_capacity, 25);

        let missing = SimConfig::load(dir.path().join("missing.ron"));
        assert!(matches!(missing, Err(GameError::DataParseError { .. })));
    }
}
