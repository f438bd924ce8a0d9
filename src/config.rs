//! Process-wide game parameters, injected into every component.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Rules of the live game the engine plans against. Values mirror the
/// deployed contract; nothing in the engine hard-codes them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fuel is clamped to this on every refuel.
    pub max_fuel: i64,
    /// Fuel burned per grid step.
    pub fuel_per_step: i64,
    /// Fuel a ship holds immediately after spawning.
    pub spawn_fuel: i64,
    /// Ships may not spawn closer to the origin than this.
    pub min_spawn_distance: i64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_fuel: 5,
            fuel_per_step: 1,
            spawn_fuel: 5,
            min_spawn_distance: 50,
        }
    }
}

impl GameConfig {
    /// Rejects configurations no search could operate under.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_fuel <= 0 {
            return Err(EngineError::InvalidConfig {
                field: "max_fuel",
                value: self.max_fuel,
            });
        }
        if self.fuel_per_step <= 0 {
            return Err(EngineError::InvalidConfig {
                field: "fuel_per_step",
                value: self.fuel_per_step,
            });
        }
        if self.spawn_fuel < 0 {
            return Err(EngineError::InvalidConfig {
                field: "spawn_fuel",
                value: self.spawn_fuel,
            });
        }
        if self.min_spawn_distance < 0 {
            return Err(EngineError::InvalidConfig {
                field: "min_spawn_distance",
                value: self.min_spawn_distance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_max_fuel_is_rejected() {
        let config = GameConfig {
            max_fuel: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(EngineError::InvalidConfig {
                field: "max_fuel",
                value: 0
            })
        );
    }

    #[test]
    fn negative_spawn_fuel_is_rejected() {
        let config = GameConfig {
            spawn_fuel: -1,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
