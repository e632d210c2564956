use dotenvy::dotenv;
use std::{env, fs, sync::Arc};

use stronghold_core::{AppError, ApplicationError};
use stronghold_game::{catalog::UnitCatalog, config::BattleConfig};
use stronghold_types::battle::WorldModifiers;

pub struct Config {
    pub speed: f64,
    pub morale_enabled: bool,
    pub battle: BattleConfig,
    pub catalog: Arc<UnitCatalog>,
    /// Fixed seed for the battle random source, mostly for replays.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: 1.0,
            morale_enabled: true,
            battle: BattleConfig::default(),
            catalog: Arc::new(UnitCatalog::standard()),
            seed: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the environment (and `.env`, when present).
    pub fn from_env() -> Result<Self, ApplicationError> {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_vars<F>(var: F) -> Result<Self, ApplicationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let speed = match var("STRONGHOLD_SERVER_SPEED") {
            Some(val) => val.parse::<f64>().unwrap_or(1.0).clamp(1.0, 10.0),
            None => 1.0,
        };

        let morale_enabled = match var("STRONGHOLD_MORALE_ENABLED") {
            Some(val) => !matches!(val.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
            None => true,
        };

        let mut battle = BattleConfig::default();

        if let Some(val) = var("STRONGHOLD_MORALE_FLOOR") {
            battle.morale.floor = val
                .parse::<f64>()
                .unwrap_or(battle.morale.floor)
                .clamp(0.0, 1.0);
        }

        if let Some(val) = var("STRONGHOLD_LOYALTY_AFTER_CONQUEST") {
            battle.loyalty.after_conquest = val
                .parse::<u16>()
                .unwrap_or(battle.loyalty.after_conquest)
                .clamp(1, 100);
        }

        let catalog = match var("STRONGHOLD_UNIT_CATALOG") {
            Some(path) => {
                let json = fs::read_to_string(&path)?;
                UnitCatalog::from_json(&json)?
            }
            None => UnitCatalog::standard(),
        };

        let seed = var("STRONGHOLD_SEED").and_then(|val| val.parse::<u64>().ok());

        battle
            .validate()
            .map_err(|e| AppError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            speed,
            morale_enabled,
            battle,
            catalog: Arc::new(catalog),
            seed,
        })
    }

    pub fn world_modifiers(&self) -> WorldModifiers {
        WorldModifiers {
            speed: self.speed,
            morale_enabled: self.morale_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ApplicationError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.speed, 1.0);
        assert!(config.morale_enabled);
        assert_eq!(config.battle, BattleConfig::default());
        assert!(config.catalog.contains(&"spear".into()));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_values_are_parsed_and_clamped() {
        let config = config_from(&[
            ("STRONGHOLD_SERVER_SPEED", "50"),
            ("STRONGHOLD_MORALE_ENABLED", "false"),
            ("STRONGHOLD_MORALE_FLOOR", "2.5"),
            ("STRONGHOLD_LOYALTY_AFTER_CONQUEST", "40"),
            ("STRONGHOLD_SEED", "1234"),
        ])
        .unwrap();

        assert_eq!(config.speed, 10.0);
        assert!(!config.morale_enabled);
        assert_eq!(config.battle.morale.floor, 1.0);
        assert_eq!(config.battle.loyalty.after_conquest, 40);
        assert_eq!(config.seed, Some(1234));
        assert!(!config.world_modifiers().morale_enabled);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let config = config_from(&[
            ("STRONGHOLD_SERVER_SPEED", "fast"),
            ("STRONGHOLD_MORALE_FLOOR", "low"),
        ])
        .unwrap();
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.battle.morale.floor, 0.3);
    }

    #[test]
    fn test_missing_catalog_file_is_an_error() {
        let result = config_from(&[("STRONGHOLD_UNIT_CATALOG", "/nonexistent/units.json")]);
        assert!(matches!(result, Err(ApplicationError::Io(_))));
    }
}
