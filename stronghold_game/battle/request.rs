use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stronghold_types::{
    army::UnitStack,
    battle::{AttackType, DefenderEconomy, TargetBuilding, WorldModifiers},
    buildings::BuildingName,
    errors::GameError,
};

use crate::catalog::UnitCatalog;

use super::{loyalty::MAX_LOYALTY, resolver::CombatContext};

/// Raw input of a battle as received from the outside. Counts and levels are
/// signed so that bad input can be reported instead of silently clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRequest {
    pub attacker: BTreeMap<String, i64>,
    #[serde(default)]
    pub defender: BTreeMap<String, i64>,
    #[serde(default)]
    pub fortification_level: i64,
    #[serde(default)]
    pub attacker_points: f64,
    #[serde(default)]
    pub defender_points: f64,
    #[serde(default)]
    pub world: WorldModifiers,
    #[serde(default)]
    pub target_building: Option<RawTargetBuilding>,
    #[serde(default)]
    pub attack_type: AttackType,
    #[serde(default)]
    pub defender_economy: DefenderEconomy,
    #[serde(default = "default_loyalty")]
    pub loyalty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTargetBuilding {
    pub name: BuildingName,
    pub level: i64,
}

fn default_loyalty() -> i64 {
    MAX_LOYALTY as i64
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBattle {
    pub attacker: UnitStack,
    pub defender: UnitStack,
    pub context: CombatContext,
}

impl BattleRequest {
    /// Checks every raw value and turns the request into typed battle inputs.
    pub fn validate(&self, catalog: &UnitCatalog) -> Result<PreparedBattle, GameError> {
        let attacker = UnitStack::from_signed(
            self.attacker.iter().map(|(id, count)| (id.as_str(), *count)),
        )?;
        let defender = UnitStack::from_signed(
            self.defender.iter().map(|(id, count)| (id.as_str(), *count)),
        )?;
        catalog.validate_stack(&attacker)?;
        catalog.validate_stack(&defender)?;

        let fortification_level = level("fortification", self.fortification_level)?;
        let target_building = self
            .target_building
            .map(|target| {
                level("target building", target.level).map(|level| TargetBuilding {
                    name: target.name,
                    level,
                })
            })
            .transpose()?;

        if !self.world.speed.is_finite() || self.world.speed <= 0.0 {
            return Err(GameError::InvalidWorldSpeed(self.world.speed));
        }
        let attacker_points = points("attacker", self.attacker_points)?;
        let defender_points = points("defender", self.defender_points)?;

        if self.loyalty < 0 {
            return Err(GameError::NegativeLevel {
                what: "loyalty",
                level: self.loyalty,
            });
        }
        if self.loyalty > MAX_LOYALTY as i64 {
            return Err(GameError::LevelOutOfRange {
                what: "loyalty",
                level: self.loyalty,
            });
        }

        Ok(PreparedBattle {
            attacker,
            defender,
            context: CombatContext {
                attack_type: self.attack_type,
                fortification_level,
                attacker_points,
                defender_points,
                world: self.world,
                target_building,
                defender_economy: self.defender_economy,
                loyalty: self.loyalty as u16,
            },
        })
    }
}

fn level(what: &'static str, level: i64) -> Result<u8, GameError> {
    if level < 0 {
        return Err(GameError::NegativeLevel { what, level });
    }
    u8::try_from(level).map_err(|_| GameError::LevelOutOfRange { what, level })
}

fn points(side: &'static str, points: f64) -> Result<f64, GameError> {
    if !points.is_finite() || points < 0.0 {
        return Err(GameError::InvalidPoints { side, points });
    }
    Ok(points)
}
