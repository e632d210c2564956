use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{army::UnitId, buildings::BuildingName, common::ResourceGroup};

#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Raid, // Plunder only, loser is not wiped out
    #[default]
    Normal, // Attack / Siege / Conquer
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    AttackerWin,
    DefenderHold,
}

/// World-level switches that shape every battle on a server.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WorldModifiers {
    /// Server speed. Battles are resolved instantly, so speed does not change the
    /// combat math; it is validated and carried for callers.
    pub speed: f64,
    #[serde(default = "default_true")]
    pub morale_enabled: bool,
}

impl Default for WorldModifiers {
    fn default() -> Self {
        Self {
            speed: 1.0,
            morale_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetBuilding {
    pub name: BuildingName,
    pub level: u8,
}

/// What the defender owns and protects, used to compute plunder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DefenderEconomy {
    pub stock: ResourceGroup,
    #[serde(default)]
    pub vault_protected: ResourceGroup,
    #[serde(default)]
    pub hiding_place: ResourceGroup,
}

/// Units of one type before and after the battle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CasualtyRecord {
    pub before: u32,
    pub lost: u32,
    pub survivors: u32,
}

impl CasualtyRecord {
    /// Builds a record where `lost` never exceeds `before` and survivors fill the rest.
    pub fn new(before: u32, lost: u32) -> Self {
        let lost = lost.min(before);
        Self {
            before,
            lost,
            survivors: before - lost,
        }
    }

    /// Applies a loss fraction (clamped to `[0, 1]`) with nearest-integer rounding.
    pub fn from_loss_fraction(before: u32, fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let lost = (before as f64 * fraction).round() as u32;
        Self::new(before, lost)
    }
}

pub type CasualtyTable = BTreeMap<UnitId, CasualtyRecord>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FortificationState {
    pub start_level: u8,
    pub end_level: u8,
}

impl FortificationState {
    pub fn untouched(level: u8) -> Self {
        Self {
            start_level: level,
            end_level: level,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildingState {
    pub target: Option<BuildingName>,
    pub start_level: u8,
    pub end_level: u8,
}

impl BuildingState {
    pub fn untouched(target: Option<TargetBuilding>) -> Self {
        match target {
            Some(t) => Self {
                target: Some(t.name),
                start_level: t.level,
                end_level: t.level,
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LootResult {
    pub plundered: ResourceGroup,
    /// Carry capacity of the surviving attackers.
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoyaltyResult {
    pub before: u16,
    pub after: u16,
    pub drop: u16,
    /// Loyalty reached zero with conquest units alive: ownership must change hands.
    pub conquered: bool,
}

impl LoyaltyResult {
    pub fn unchanged(loyalty: u16) -> Self {
        Self {
            before: loyalty,
            after: loyalty,
            drop: 0,
            conquered: false,
        }
    }
}

/// Complete outcome of a battle. Every field is always present, even when the
/// corresponding mechanic did not trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub attack_type: AttackType,
    pub outcome: CombatOutcome,
    pub luck: f64,
    pub morale: f64,
    /// Attack power over defense power. Infinite when nothing defended.
    #[serde(with = "unbounded_ratio")]
    pub ratio: f64,
    pub attack_power: f64,
    pub defense_power: f64,
    pub fortification: FortificationState,
    pub building: BuildingState,
    pub attacker: CasualtyTable,
    pub defender: CasualtyTable,
    pub loot: LootResult,
    pub loyalty: LoyaltyResult,
}

impl BattleReport {
    pub fn attacker_won(&self) -> bool {
        self.outcome == CombatOutcome::AttackerWin
    }

    pub fn attacker_losses(&self) -> u32 {
        self.attacker.values().map(|r| r.lost).sum()
    }

    pub fn defender_losses(&self) -> u32 {
        self.defender.values().map(|r| r.lost).sum()
    }
}

/// JSON has no infinity, so an unbounded ratio travels as the string `"inf"`.
mod unbounded_ratio {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const INFINITY: &str = "inf";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_str(INFINITY)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) if text == INFINITY => Ok(f64::INFINITY),
            Repr::Text(text) => Err(D::Error::custom(format!("invalid ratio: {text}"))),
        }
    }
}
