use rand::Rng;

use stronghold_types::{
    army::{UnitCategory, UnitId, UnitStack, UnitTag, UnitTypeStats},
    battle::{
        AttackType, BattleReport, CasualtyRecord, CasualtyTable, CombatOutcome, DefenderEconomy,
        TargetBuilding, WorldModifiers,
    },
    errors::GameError,
};

use crate::{catalog::UnitCatalog, config::BattleConfig};

use super::{
    advantage::StackProfile,
    loot::LootCalculator,
    loyalty::{LoyaltyDropCalculator, MAX_LOYALTY},
    report::BattleReportBuilder,
    siege::{SiegeEffectCalculator, SiegeSurvivors},
};

pub const LUCK_MIN: f64 = 0.8;
pub const LUCK_MAX: f64 = 1.2;

/// Battles with at least this many units involved start to flatten the loss curve.
const MASSIVE_BATTLE_UNITS: u32 = 1000;

type ResolvedStack<'a> = [(&'a UnitId, &'a UnitTypeStats, u32)];

/// Everything around the two armies that shapes a battle.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatContext {
    pub attack_type: AttackType,
    pub fortification_level: u8,
    pub attacker_points: f64,
    pub defender_points: f64,
    pub world: WorldModifiers,
    pub target_building: Option<TargetBuilding>,
    pub defender_economy: DefenderEconomy,
    pub loyalty: u16,
}

impl Default for CombatContext {
    fn default() -> Self {
        Self {
            attack_type: AttackType::Normal,
            fortification_level: 0,
            attacker_points: 0.0,
            defender_points: 0.0,
            world: WorldModifiers::default(),
            target_building: None,
            defender_economy: DefenderEconomy::default(),
            loyalty: MAX_LOYALTY,
        }
    }
}

/// Powers, modifiers and loss fractions of the fight itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clash {
    pub outcome: CombatOutcome,
    pub luck: f64,
    pub morale: f64,
    pub ratio: f64,
    pub attack_power: f64,
    pub defense_power: f64,
    pub attacker_loss: f64,
    pub defender_loss: f64,
}

pub struct CombatResolver<'a> {
    catalog: &'a UnitCatalog,
    config: &'a BattleConfig,
}

impl<'a> CombatResolver<'a> {
    pub fn new(catalog: &'a UnitCatalog, config: &'a BattleConfig) -> Self {
        Self { catalog, config }
    }

    /// Resolves a battle and all of its consequences. Unknown units are rejected
    /// before anything is computed.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        attacker: &UnitStack,
        defender: &UnitStack,
        context: &CombatContext,
        rng: &mut R,
    ) -> Result<BattleReport, GameError> {
        let attackers = self.catalog.resolve_stack(attacker)?;
        let defenders = self.catalog.resolve_stack(defender)?;

        let clash = self.clash(&attackers, &defenders, context, rng);

        let attacker_casualties = casualties(&attackers, clash.attacker_loss);
        let defender_casualties = casualties(&defenders, clash.defender_loss);

        let siege_survivors = SiegeSurvivors {
            rams: survivors_with_tag(&attackers, &attacker_casualties, UnitTag::Ram),
            catapults: survivors_with_tag(&attackers, &attacker_casualties, UnitTag::Catapult),
        };
        let siege = SiegeEffectCalculator::new(&self.config.siege).calculate(
            clash.outcome,
            context.attack_type,
            clash.ratio,
            siege_survivors,
            context.fortification_level,
            context.target_building,
            rng,
        );

        let capacity = surviving_capacity(&attackers, &attacker_casualties);
        let loot = LootCalculator::new(self.config.loot).calculate(
            clash.outcome,
            &context.defender_economy,
            capacity,
        );

        let conquerors = survivors_with_tag(&attackers, &attacker_casualties, UnitTag::Conquest);
        let loyalty = LoyaltyDropCalculator::new(&self.config.loyalty).calculate(
            clash.outcome,
            context.attack_type,
            conquerors,
            context.fortification_level,
            context.loyalty,
            rng,
        );

        Ok(BattleReportBuilder::new(context)
            .clash(&clash)
            .casualties(attacker_casualties, defender_casualties)
            .siege(siege)
            .loot(loot)
            .loyalty(loyalty)
            .build())
    }

    fn clash<R: Rng + ?Sized>(
        &self,
        attackers: &ResolvedStack<'_>,
        defenders: &ResolvedStack<'_>,
        context: &CombatContext,
        rng: &mut R,
    ) -> Clash {
        // ====================================================================
        // STEP 1: Luck and morale
        // ====================================================================
        let luck = rng.gen_range(LUCK_MIN..=LUCK_MAX);
        let morale = if context.world.morale_enabled {
            self.config
                .morale
                .morale(context.attacker_points, context.defender_points)
        } else {
            1.0
        };

        // ====================================================================
        // STEP 2: Attack and defense power
        // ====================================================================
        let wall = &self.config.wall;
        let wall_level = context.fortification_level;
        let advantage = &self.config.advantage;
        let attacker_profile = StackProfile::new(attackers.iter().map(|&(_, s, c)| (s, c)));
        let defender_profile = StackProfile::new(defenders.iter().map(|&(_, s, c)| (s, c)));

        // 2.1: Attack points, split by category to know what the defenders face
        let mut raw_attack = [0.0; UnitCategory::ALL.len()];
        let mut attack = 0.0;
        for &(_, stats, count) in attackers {
            let points = stats.attack as f64 * count as f64;
            raw_attack[stats.category.index()] += points;
            attack +=
                points * advantage.attack_multiplier(stats, &defender_profile, wall_level, wall);
        }
        let attack_power = attack * luck * morale;

        // 2.2: Defense points
        let mut defense = 0.0;
        for &(_, stats, count) in defenders {
            let points = blended_defense(stats, &raw_attack) * count as f64;
            defense +=
                points * advantage.defense_multiplier(stats, &attacker_profile, wall_level, wall);
        }
        let defense_power = defense * wall.multiplier(wall_level);

        // ====================================================================
        // STEP 3: Outcome and losses
        // ====================================================================
        if attack_power <= 0.0 && defense_power <= 0.0 {
            return Clash {
                outcome: CombatOutcome::DefenderHold,
                luck,
                morale,
                ratio: 0.0,
                attack_power,
                defense_power,
                attacker_loss: 0.0,
                defender_loss: 0.0,
            };
        }

        let ratio = if defense_power <= 0.0 {
            f64::INFINITY
        } else {
            attack_power / defense_power
        };
        let outcome = if ratio > 1.0 {
            CombatOutcome::AttackerWin
        } else {
            CombatOutcome::DefenderHold
        };

        let immensity = total_units(attackers).saturating_add(total_units(defenders));
        let (attacker_loss, defender_loss) =
            calculate_losses(context.attack_type, outcome, ratio, m_factor(immensity));

        Clash {
            outcome,
            luck,
            morale,
            ratio,
            attack_power,
            defense_power,
            attacker_loss,
            defender_loss,
        }
    }
}

// Defense stat weighted by how much of the raw attack comes from each category.
// Siege and conquest units are fought with the infantry stat.
fn blended_defense(stats: &UnitTypeStats, raw_attack: &[f64]) -> f64 {
    let total: f64 = raw_attack.iter().sum();
    if total <= 0.0 {
        return stats.defense_against(UnitCategory::Infantry) as f64;
    }

    UnitCategory::ALL
        .iter()
        .map(|&category| {
            let share = raw_attack[category.index()] / total;
            share * stats.defense_against(category) as f64
        })
        .sum()
}

fn total_units(stack: &ResolvedStack<'_>) -> u32 {
    stack
        .iter()
        .fold(0u32, |acc, &(_, _, count)| acc.saturating_add(count))
}

// Massive battles factor (Mfactor)
fn m_factor(immensity: u32) -> f64 {
    if immensity >= MASSIVE_BATTLE_UNITS {
        (2.0 * (1.8592 - (immensity as f64).powf(0.015))).clamp(1.2578, 1.5)
    } else {
        1.5
    }
}

/// Returns the (attacker, defender) loss fractions.
fn calculate_losses(
    attack_type: AttackType,
    outcome: CombatOutcome,
    ratio: f64,
    m_factor: f64,
) -> (f64, f64) {
    // Loser power over winner power, in [0, 1].
    let inverse = match outcome {
        CombatOutcome::AttackerWin => 1.0 / ratio,
        CombatOutcome::DefenderHold => ratio,
    };
    let loss_factor = inverse.clamp(0.0, 1.0).powf(m_factor);

    let (winner, loser) = match attack_type {
        AttackType::Raid => (loss_factor / (1.0 + loss_factor), 1.0 / (1.0 + loss_factor)),
        AttackType::Normal => (loss_factor, 1.0),
    };

    match outcome {
        CombatOutcome::AttackerWin => (winner, loser),
        CombatOutcome::DefenderHold => (loser, winner),
    }
}

fn casualties(stack: &ResolvedStack<'_>, loss: f64) -> CasualtyTable {
    stack
        .iter()
        .map(|&(id, _, count)| (id.clone(), CasualtyRecord::from_loss_fraction(count, loss)))
        .collect()
}

fn survivors_with_tag(stack: &ResolvedStack<'_>, casualties: &CasualtyTable, tag: UnitTag) -> u32 {
    stack
        .iter()
        .filter(|&&(_, stats, _)| stats.has_tag(tag))
        .filter_map(|&(id, _, _)| casualties.get(id))
        .fold(0u32, |acc, record| acc.saturating_add(record.survivors))
}

fn surviving_capacity(stack: &ResolvedStack<'_>, casualties: &CasualtyTable) -> u32 {
    stack
        .iter()
        .filter_map(|&(id, stats, _)| {
            casualties
                .get(id)
                .map(|record| stats.cargo_capacity.saturating_mul(record.survivors))
        })
        .fold(0u32, u32::saturating_add)
}
