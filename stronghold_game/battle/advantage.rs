use serde::{Deserialize, Serialize};

use stronghold_types::army::{UnitCategory, UnitTag, UnitTypeStats};

use super::wall::WallDefenseModel;

/// Picks the unit types a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSelector {
    Any,
    Category(UnitCategory),
    Tagged { category: UnitCategory, tag: UnitTag },
}

impl UnitSelector {
    pub fn matches(&self, stats: &UnitTypeStats) -> bool {
        match self {
            UnitSelector::Any => true,
            UnitSelector::Category(category) => stats.category == *category,
            UnitSelector::Tagged { category, tag } => {
                stats.category == *category && stats.has_tag(*tag)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    #[default]
    Always,
    /// Only when the wall is below the open-field threshold.
    OpenField,
}

impl RuleCondition {
    fn holds(&self, wall_level: u8, wall: &WallDefenseModel) -> bool {
        match self {
            RuleCondition::Always => true,
            RuleCondition::OpenField => wall.is_open_field(wall_level),
        }
    }
}

/// Which contribution a rule boosts: the attacking unit's attack or the defending unit's defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvantageTarget {
    Attack,
    Defense,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplier {
    Flat(f64),
    /// `base + per_level * wall_level`, capped at `max`.
    ScaledByWall { base: f64, per_level: f64, max: f64 },
}

impl Multiplier {
    pub fn value(&self, wall_level: u8) -> f64 {
        match *self {
            Multiplier::Flat(m) => m,
            Multiplier::ScaledByWall {
                base,
                per_level,
                max,
            } => (base + per_level * wall_level as f64).min(max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvantageRule {
    pub name: String,
    pub attacker: UnitSelector,
    pub defender: UnitSelector,
    #[serde(default)]
    pub condition: RuleCondition,
    pub target: AdvantageTarget,
    pub multiplier: Multiplier,
}

/// Composition of one side, used to weight a rule by how much of the
/// opposing force it actually concerns.
#[derive(Debug, Clone)]
pub struct StackProfile<'a> {
    entries: Vec<(&'a UnitTypeStats, u32)>,
}

impl<'a> StackProfile<'a> {
    pub fn new(entries: impl IntoIterator<Item = (&'a UnitTypeStats, u32)>) -> Self {
        Self {
            entries: entries.into_iter().filter(|(_, count)| *count > 0).collect(),
        }
    }

    /// Share of the stack (by population, or by head count when population is
    /// zero everywhere) matched by `selector`, in `[0, 1]`.
    pub fn share(&self, selector: &UnitSelector) -> f64 {
        let total: f64 = self
            .entries
            .iter()
            .map(|&(s, c)| population_weight(s, c))
            .sum();
        if total > 0.0 {
            let matched: f64 = self
                .entries
                .iter()
                .filter(|&&(s, _)| selector.matches(s))
                .map(|&(s, c)| population_weight(s, c))
                .sum();
            return matched / total;
        }

        let heads: u64 = self.entries.iter().map(|&(_, c)| c as u64).sum();
        if heads == 0 {
            return 0.0;
        }
        let matched: u64 = self
            .entries
            .iter()
            .filter(|&&(s, _)| selector.matches(s))
            .map(|&(_, c)| c as u64)
            .sum();
        matched as f64 / heads as f64
    }
}

/// Ordered rock-paper-scissors rule table. Every applicable rule multiplies into
/// the result, none overrides another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeAdvantageTable {
    rules: Vec<AdvantageRule>,
}

impl Default for TypeAdvantageTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeAdvantageTable {
    pub fn new(rules: Vec<AdvantageRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self { rules: vec![] }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            AdvantageRule {
                name: "cavalry_charge".to_string(),
                attacker: UnitSelector::Category(UnitCategory::Cavalry),
                defender: UnitSelector::Category(UnitCategory::Ranged),
                condition: RuleCondition::OpenField,
                target: AdvantageTarget::Attack,
                multiplier: Multiplier::Flat(1.5),
            },
            AdvantageRule {
                name: "pike_wall".to_string(),
                attacker: UnitSelector::Category(UnitCategory::Cavalry),
                defender: UnitSelector::Tagged {
                    category: UnitCategory::Infantry,
                    tag: UnitTag::Pike,
                },
                condition: RuleCondition::Always,
                target: AdvantageTarget::Defense,
                multiplier: Multiplier::Flat(1.5),
            },
            AdvantageRule {
                name: "ranger_vs_siege".to_string(),
                attacker: UnitSelector::Tagged {
                    category: UnitCategory::Ranged,
                    tag: UnitTag::Ranger,
                },
                defender: UnitSelector::Category(UnitCategory::Siege),
                condition: RuleCondition::Always,
                target: AdvantageTarget::Attack,
                multiplier: Multiplier::Flat(1.75),
            },
            AdvantageRule {
                name: "fortified_archers".to_string(),
                attacker: UnitSelector::Category(UnitCategory::Infantry),
                defender: UnitSelector::Category(UnitCategory::Ranged),
                condition: RuleCondition::Always,
                target: AdvantageTarget::Defense,
                multiplier: Multiplier::ScaledByWall {
                    base: 1.25,
                    per_level: 0.05,
                    max: 2.0,
                },
            },
        ])
    }

    pub fn rules(&self) -> &[AdvantageRule] {
        &self.rules
    }

    /// Multiplier on the attack contribution of `unit` against the given defenders.
    pub fn attack_multiplier(
        &self,
        unit: &UnitTypeStats,
        defenders: &StackProfile<'_>,
        wall_level: u8,
        wall: &WallDefenseModel,
    ) -> f64 {
        self.rules
            .iter()
            .filter(|r| r.target == AdvantageTarget::Attack && r.attacker.matches(unit))
            .filter(|r| r.condition.holds(wall_level, wall))
            .map(|r| weighted(r.multiplier.value(wall_level), defenders.share(&r.defender)))
            .product()
    }

    /// Multiplier on the defense contribution of `unit` against the given attackers.
    pub fn defense_multiplier(
        &self,
        unit: &UnitTypeStats,
        attackers: &StackProfile<'_>,
        wall_level: u8,
        wall: &WallDefenseModel,
    ) -> f64 {
        self.rules
            .iter()
            .filter(|r| r.target == AdvantageTarget::Defense && r.defender.matches(unit))
            .filter(|r| r.condition.holds(wall_level, wall))
            .map(|r| weighted(r.multiplier.value(wall_level), attackers.share(&r.attacker)))
            .product()
    }
}

fn population_weight(stats: &UnitTypeStats, count: u32) -> f64 {
    count as f64 * stats.population_cost as f64
}

fn weighted(multiplier: f64, share: f64) -> f64 {
    1.0 + (multiplier - 1.0) * share.clamp(0.0, 1.0)
}
