use serde::{Deserialize, Serialize};

use stronghold_types::errors::GameError;

use crate::battle::{
    advantage::TypeAdvantageTable, loot::LootPolicy, loyalty::LoyaltyConfig, morale::MoraleCurve,
    siege::SiegeConfig, wall::WallDefenseModel,
};

/// Tunables of the combat pipeline. Every section falls back to its default
/// when missing from a serialized configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub morale: MoraleCurve,
    pub wall: WallDefenseModel,
    pub advantage: TypeAdvantageTable,
    pub siege: SiegeConfig,
    pub loyalty: LoyaltyConfig,
    pub loot: LootPolicy,
}

impl BattleConfig {
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let config: BattleConfig = serde_json::from_str(json)
            .map_err(|e| GameError::InvalidBattleConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would break the bounds the pipeline relies on.
    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |msg: &str| Err(GameError::InvalidBattleConfig(msg.to_string()));

        if !(0.0..=1.0).contains(&self.morale.floor) {
            return invalid("morale floor must be within [0, 1]");
        }
        if self.morale.exponent <= 0.0 {
            return invalid("morale exponent must be positive");
        }
        if self.wall.bonus_per_level < 0.0 || self.wall.max_multiplier < 1.0 {
            return invalid("wall bonus must be non-negative and capped at 1.0 or above");
        }
        if self.siege.durability <= 0.0 {
            return invalid("siege durability must be positive");
        }
        if self.siege.spread_min <= 0.0 || self.siege.spread_min > self.siege.spread_max {
            return invalid("siege spread must be a positive, ordered range");
        }
        if self.loyalty.min_drop > self.loyalty.max_drop {
            return invalid("loyalty drop range is inverted");
        }
        if !(0.0..=0.5).contains(&self.loyalty.max_wall_reduction) {
            return invalid("wall can reduce the loyalty drop by 50% at most");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = BattleConfig::from_json(r#"{ "morale": { "floor": 0.5 } }"#).unwrap();
        assert_eq!(config.morale.floor, 0.5);
        assert_eq!(config.morale.exponent, MoraleCurve::default().exponent);
        assert_eq!(config.wall, WallDefenseModel::default());
        assert_eq!(config.advantage.rules().len(), 4);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(BattleConfig::from_json(r#"{ "morale": { "floor": 1.5 } }"#).is_err());
        assert!(
            BattleConfig::from_json(r#"{ "loyalty": { "min_drop": 40, "max_drop": 20 } }"#)
                .is_err()
        );
        assert!(BattleConfig::from_json(r#"{ "loyalty": { "max_wall_reduction": 0.8 } }"#).is_err());
        assert!(BattleConfig::from_json("[]").is_err());
    }
}
