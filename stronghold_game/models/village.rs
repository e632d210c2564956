use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stronghold_types::{
    army::UnitStack,
    battle::{AttackType, BattleReport, DefenderEconomy, TargetBuilding, WorldModifiers},
    buildings::BuildingName,
    common::ResourceGroup,
    errors::GameError,
};

use crate::battle::{CombatContext, loyalty::MAX_LOYALTY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    pub id: u32,
    pub name: String,
    pub player_id: Uuid,
    pub points: f64,
    buildings: BTreeMap<BuildingName, u8>,
    units: UnitStack,
    stocks: ResourceGroup,
    vault: ResourceGroup,
    loyalty: u16,
    /// Bumped on every change, used to detect concurrent writes.
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl Village {
    /// Returns a new village with a level 1 headquarters and full loyalty.
    pub fn new(id: u32, name: String, player_id: Uuid) -> Self {
        let mut buildings = BTreeMap::new();
        buildings.insert(BuildingName::Headquarters, 1);

        Self {
            id,
            name,
            player_id,
            points: 0.0,
            buildings,
            units: UnitStack::new(),
            stocks: ResourceGroup::default(),
            vault: ResourceGroup::default(),
            loyalty: MAX_LOYALTY,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn building_level(&self, name: BuildingName) -> u8 {
        self.buildings.get(&name).copied().unwrap_or(0)
    }

    pub fn buildings(&self) -> &BTreeMap<BuildingName, u8> {
        &self.buildings
    }

    /// Sets a building level, removing the building when it drops to zero.
    pub fn set_building_level(&mut self, name: BuildingName, level: u8) -> Result<(), GameError> {
        if level > name.max_level() {
            return Err(GameError::LevelOutOfRange {
                what: "building",
                level: level as i64,
            });
        }
        if level == 0 && name != BuildingName::Headquarters {
            self.buildings.remove(&name);
        } else {
            self.buildings.insert(name, level);
        }
        Ok(())
    }

    pub fn wall_level(&self) -> u8 {
        self.building_level(BuildingName::Wall)
    }

    pub fn units(&self) -> &UnitStack {
        &self.units
    }

    /// Adds units to the village garrison.
    pub fn station_units(&mut self, units: &UnitStack) {
        self.units.merge(units);
    }

    /// Takes units out of the garrison to send them on an attack.
    pub fn deploy_units(&mut self, units: &UnitStack) -> Result<(), GameError> {
        if units.is_empty() {
            return Err(GameError::NoUnitsSelected);
        }
        self.units.deploy(units)
    }

    pub fn stocks(&self) -> ResourceGroup {
        self.stocks
    }

    pub fn store_resources(&mut self, resources: &ResourceGroup) {
        self.stocks = self.stocks + *resources;
    }

    pub fn vault(&self) -> ResourceGroup {
        self.vault
    }

    pub fn set_vault(&mut self, vault: ResourceGroup) {
        self.vault = vault;
    }

    pub fn loyalty(&self) -> u16 {
        self.loyalty
    }

    pub fn defender_economy(&self) -> DefenderEconomy {
        let hiding = BuildingName::hiding_place_capacity(self.building_level(BuildingName::HidingPlace));
        DefenderEconomy {
            stock: self.stocks,
            vault_protected: self.vault,
            hiding_place: ResourceGroup::splat(hiding),
        }
    }

    /// Builds the defending side of a battle from the current state of the village.
    pub fn battle_snapshot(
        &self,
        attacker_points: f64,
        attack_type: AttackType,
        target: Option<BuildingName>,
        world: WorldModifiers,
    ) -> (UnitStack, CombatContext) {
        let target_building = target.map(|name| TargetBuilding {
            name,
            level: self.building_level(name),
        });

        let context = CombatContext {
            attack_type,
            fortification_level: self.wall_level(),
            attacker_points,
            defender_points: self.points,
            world,
            target_building,
            defender_economy: self.defender_economy(),
            loyalty: self.loyalty,
        };
        (self.units.clone(), context)
    }

    /// Applies losses, damages, plunder and loyalty from a battle this village defended.
    /// When loyalty is broken, the village changes owner keeping buildings and units.
    pub fn apply_battle_report(
        &mut self,
        report: &BattleReport,
        attacker_player_id: Uuid,
        loyalty_after_conquest: u16,
    ) -> Result<(), GameError> {
        // Casualties
        for (id, record) in &report.defender {
            self.units.set(id.clone(), record.survivors);
        }

        // Wall damage
        if report.fortification.end_level < report.fortification.start_level {
            self.set_building_level(BuildingName::Wall, report.fortification.end_level)?;
        }

        // Catapult damage
        if let Some(target) = report.building.target
            && target != BuildingName::Wall
            && report.building.end_level < report.building.start_level
        {
            if !self.buildings.contains_key(&target) {
                return Err(GameError::BuildingNotFound(target));
            }
            self.set_building_level(target, report.building.end_level)?;
        }

        // Bounty
        self.stocks = self.stocks.saturating_sub(&report.loot.plundered);

        // Loyalty
        if report.loyalty.conquered {
            self.player_id = attacker_player_id;
            self.loyalty = loyalty_after_conquest.min(MAX_LOYALTY);
        } else {
            self.loyalty = report.loyalty.after;
        }

        self.touch();
        Ok(())
    }

    /// Brings the surviving attackers home together with their plunder.
    pub fn return_survivors(&mut self, report: &BattleReport) {
        let survivors: UnitStack = report
            .attacker
            .iter()
            .map(|(id, record)| (id.clone(), record.survivors))
            .collect();
        self.units.merge(&survivors);
        self.store_resources(&report.loot.plundered);
        self.touch();
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_loyalty_for_test(&mut self, loyalty: u16) {
        self.loyalty = loyalty.min(MAX_LOYALTY);
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
