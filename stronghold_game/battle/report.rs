use stronghold_types::battle::{
    AttackType, BattleReport, BuildingState, CasualtyTable, CombatOutcome, FortificationState,
    LootResult, LoyaltyResult,
};

use super::{
    resolver::{Clash, CombatContext},
    siege::SiegeEffects,
};

/// Assembles a [`BattleReport`]. It starts from the "nothing happened" state of
/// the context, so a report is complete even when a mechanic did not trigger.
#[derive(Debug, Clone)]
pub struct BattleReportBuilder {
    attack_type: AttackType,
    outcome: CombatOutcome,
    luck: f64,
    morale: f64,
    ratio: f64,
    attack_power: f64,
    defense_power: f64,
    fortification: FortificationState,
    building: BuildingState,
    attacker: CasualtyTable,
    defender: CasualtyTable,
    loot: LootResult,
    loyalty: LoyaltyResult,
}

impl BattleReportBuilder {
    pub fn new(context: &CombatContext) -> Self {
        Self {
            attack_type: context.attack_type,
            outcome: CombatOutcome::DefenderHold,
            luck: 1.0,
            morale: 1.0,
            ratio: 0.0,
            attack_power: 0.0,
            defense_power: 0.0,
            fortification: FortificationState::untouched(context.fortification_level),
            building: BuildingState::untouched(context.target_building),
            attacker: CasualtyTable::new(),
            defender: CasualtyTable::new(),
            loot: LootResult::default(),
            loyalty: LoyaltyResult::unchanged(context.loyalty),
        }
    }

    pub fn clash(mut self, clash: &Clash) -> Self {
        self.outcome = clash.outcome;
        self.luck = clash.luck;
        self.morale = clash.morale;
        self.ratio = clash.ratio;
        self.attack_power = clash.attack_power;
        self.defense_power = clash.defense_power;
        self
    }

    pub fn casualties(mut self, attacker: CasualtyTable, defender: CasualtyTable) -> Self {
        self.attacker = attacker;
        self.defender = defender;
        self
    }

    pub fn siege(mut self, effects: SiegeEffects) -> Self {
        self.fortification = effects.fortification;
        self.building = effects.building;
        self
    }

    pub fn loot(mut self, loot: LootResult) -> Self {
        self.loot = loot;
        self
    }

    pub fn loyalty(mut self, loyalty: LoyaltyResult) -> Self {
        self.loyalty = loyalty;
        self
    }

    pub fn build(self) -> BattleReport {
        BattleReport {
            attack_type: self.attack_type,
            outcome: self.outcome,
            luck: self.luck,
            morale: self.morale,
            ratio: self.ratio,
            attack_power: self.attack_power,
            defense_power: self.defense_power,
            fortification: self.fortification,
            building: self.building,
            attacker: self.attacker,
            defender: self.defender,
            loot: self.loot,
            loyalty: self.loyalty,
        }
    }
}
