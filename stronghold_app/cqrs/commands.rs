use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stronghold_types::{
    army::UnitStack,
    battle::{AttackType, BattleReport},
    buildings::BuildingName,
};

use crate::cqrs::Command;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackVillage {
    pub player_id: Uuid,
    pub village_id: u32,
    pub target_village_id: u32,
    pub units: UnitStack,
    #[serde(default)]
    pub attack_type: AttackType,
    #[serde(default)]
    pub catapult_target: Option<BuildingName>,
}

impl Command for AttackVillage {
    type Output = BattleReport;
}
