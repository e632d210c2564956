use rand::Rng;
use serde::{Deserialize, Serialize};

use stronghold_types::{
    battle::{AttackType, BuildingState, CombatOutcome, FortificationState, TargetBuilding},
    buildings::BuildingName,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiegeConfig {
    /// Damage points of a single surviving ram at full efficiency.
    pub ram_damage: f64,
    /// Damage points of a single surviving catapult at full efficiency.
    pub catapult_damage: f64,
    /// Resistance of buildings, every point divides the machines' efficiency.
    pub durability: f64,
    /// Random spread applied to the damage of every volley.
    pub spread_min: f64,
    pub spread_max: f64,
}

impl Default for SiegeConfig {
    fn default() -> Self {
        Self {
            ram_damage: 4.0,
            catapult_damage: 4.0,
            durability: 1.0,
            spread_min: 0.8,
            spread_max: 1.2,
        }
    }
}

/// Survivors of the siege classes after the clash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiegeSurvivors {
    pub rams: u32,
    pub catapults: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiegeEffects {
    pub fortification: FortificationState,
    pub building: BuildingState,
}

pub struct SiegeEffectCalculator<'a> {
    config: &'a SiegeConfig,
}

impl<'a> SiegeEffectCalculator<'a> {
    pub fn new(config: &'a SiegeConfig) -> Self {
        Self { config }
    }

    /// Computes wall and building damages. Nothing is damaged unless the attacker won a
    /// normal attack with siege engines still standing.
    #[allow(clippy::too_many_arguments)]
    pub fn calculate<R: Rng + ?Sized>(
        &self,
        outcome: CombatOutcome,
        attack_type: AttackType,
        ratio: f64,
        survivors: SiegeSurvivors,
        wall_level: u8,
        target: Option<TargetBuilding>,
        rng: &mut R,
    ) -> SiegeEffects {
        let mut fortification = FortificationState::untouched(wall_level);
        let mut building = BuildingState::untouched(target);

        if outcome != CombatOutcome::AttackerWin || attack_type != AttackType::Normal {
            return SiegeEffects {
                fortification,
                building,
            };
        }

        // Rams
        if survivors.rams > 0 && wall_level > 0 {
            let damage = self.volley(survivors.rams, self.config.ram_damage, ratio, rng);
            fortification.end_level = level_after_damage(wall_level, damage);
        }

        // A wall target is the same structure the rams hit: the report keeps its
        // declared level as start, the damage continues from what is left.
        let wall_target = target.is_some_and(|t| t.name == BuildingName::Wall);
        if wall_target {
            building.end_level = building.end_level.min(fortification.end_level);
        }

        // Catapults
        if target.is_some() && survivors.catapults > 0 && building.end_level > 0 {
            let damage = self.volley(survivors.catapults, self.config.catapult_damage, ratio, rng);
            building.end_level = level_after_damage(building.end_level, damage);

            if wall_target {
                fortification.end_level = fortification.end_level.min(building.end_level);
            }
        }

        SiegeEffects {
            fortification,
            building,
        }
    }

    fn volley<R: Rng + ?Sized>(&self, quantity: u32, damage: f64, ratio: f64, rng: &mut R) -> f64 {
        let spread = rng.gen_range(self.config.spread_min..=self.config.spread_max);
        machine_damage(quantity, damage, self.config.durability, ratio) * spread
    }
}

// sigma function from Kirilloid to calculate damages to buildings (catapults) and wall (rams)
// $this->sigma = function($x) { return ($x > 1 ? 2 - $x ** -1.5 : $x ** 1.5) / 2; };
fn sigma(x: f64) -> f64 {
    if x > 1.0 {
        (2.0 - x.powf(-1.5)) / 2.0
    } else {
        x.max(0.0).powf(1.5) / 2.0
    }
}

/// Damage points of a group of siege engines, non-decreasing in their amount.
fn machine_damage(quantity: u32, per_unit: f64, durability: f64, ad_ratio: f64) -> f64 {
    let efficiency = (quantity as f64 / durability).floor();
    per_unit * sigma(ad_ratio) * efficiency
}

/// Calculates the new level of a building hit by `damage` points. Each level costs its
/// own number in points, so high levels soak far more damage than low ones.
fn level_after_damage(old_level: u8, mut damage: f64) -> u8 {
    let mut current_level = old_level;
    damage -= 0.5;
    if damage < 0.0 {
        return current_level;
    }

    while current_level > 0 && damage >= current_level as f64 {
        damage -= current_level as f64;
        current_level -= 1;
    }
    current_level
}
