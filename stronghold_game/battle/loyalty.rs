use rand::Rng;
use serde::{Deserialize, Serialize};

use stronghold_types::battle::{AttackType, CombatOutcome, LoyaltyResult};

pub const MAX_LOYALTY: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    /// Per-unit drop range, drawn once per battle.
    pub min_drop: u16,
    pub max_drop: u16,
    pub wall_reduction_per_level: f64,
    pub max_wall_reduction: f64,
    /// Loyalty a village starts with under its new owner.
    pub after_conquest: u16,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            min_drop: 20,
            max_drop: 35,
            wall_reduction_per_level: 0.025,
            max_wall_reduction: 0.5,
            after_conquest: 25,
        }
    }
}

pub struct LoyaltyDropCalculator<'a> {
    config: &'a LoyaltyConfig,
}

impl<'a> LoyaltyDropCalculator<'a> {
    pub fn new(config: &'a LoyaltyConfig) -> Self {
        Self { config }
    }

    /// Share of the drop that gets through a wall of the given level.
    pub fn wall_reduction_factor(&self, wall_level: u8) -> f64 {
        let reduction = (wall_level as f64 * self.config.wall_reduction_per_level)
            .min(self.config.max_wall_reduction)
            .max(0.0);
        1.0 - reduction
    }

    /// Loyalty only drops when a normal attack is won with conquest units alive.
    pub fn calculate<R: Rng + ?Sized>(
        &self,
        outcome: CombatOutcome,
        attack_type: AttackType,
        surviving_conquerors: u32,
        wall_level: u8,
        before: u16,
        rng: &mut R,
    ) -> LoyaltyResult {
        if outcome != CombatOutcome::AttackerWin
            || attack_type != AttackType::Normal
            || surviving_conquerors == 0
        {
            return LoyaltyResult::unchanged(before);
        }

        let per_unit = rng.gen_range(self.config.min_drop..=self.config.max_drop) as f64;
        let total = per_unit * surviving_conquerors as f64 * self.wall_reduction_factor(wall_level);
        let drop = total.round().min(before as f64) as u16;
        let after = before - drop;

        LoyaltyResult {
            before,
            after,
            drop,
            conquered: after == 0,
        }
    }
}
