use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stronghold_types::{
    army::{UnitCategory, UnitId, UnitStack, UnitTag, UnitTypeStats},
    errors::GameError,
};

/// Read-only table of unit types available on a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCatalog {
    units: BTreeMap<UnitId, UnitTypeStats>,
}

impl UnitCatalog {
    pub fn new(units: BTreeMap<UnitId, UnitTypeStats>) -> Self {
        Self { units }
    }

    /// The default set of units of a classic world.
    pub fn standard() -> Self {
        let units = STANDARD_UNITS
            .iter()
            .map(|u| (UnitId::new(u.id), u.stats()))
            .collect();
        Self { units }
    }

    /// Loads a catalog from its JSON representation (`{"spear": {...}, ...}`).
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let catalog: UnitCatalog =
            serde_json::from_str(json).map_err(|e| GameError::InvalidCatalog(e.to_string()))?;
        if catalog.units.is_empty() {
            return Err(GameError::InvalidCatalog("catalog has no units".to_string()));
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &UnitId) -> Result<&UnitTypeStats, GameError> {
        self.units
            .get(id)
            .ok_or_else(|| GameError::UnknownUnit(id.clone()))
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.units.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, &UnitTypeStats)> {
        self.units.iter()
    }

    /// Fails on the first unit of the stack that is not part of the catalog.
    pub fn validate_stack(&self, stack: &UnitStack) -> Result<(), GameError> {
        for id in stack.unit_ids() {
            self.get(id)?;
        }
        Ok(())
    }

    /// Returns the stats paired with the amount for each unit of a stack.
    pub fn resolve_stack<'a>(
        &'a self,
        stack: &'a UnitStack,
    ) -> Result<Vec<(&'a UnitId, &'a UnitTypeStats, u32)>, GameError> {
        stack
            .iter()
            .map(|(id, count)| self.get(id).map(|stats| (id, stats, count)))
            .collect()
    }

    /// Returns the total population (upkeep) of a stack.
    pub fn population(&self, stack: &UnitStack) -> Result<u32, GameError> {
        let mut total: u32 = 0;
        for (_, stats, count) in self.resolve_stack(stack)? {
            total = total.saturating_add(stats.population_cost.saturating_mul(count));
        }
        Ok(total)
    }

    /// Returns the total carry capacity of a stack.
    pub fn cargo_capacity(&self, stack: &UnitStack) -> Result<u32, GameError> {
        let mut capacity: u32 = 0;
        for (_, stats, count) in self.resolve_stack(stack)? {
            capacity = capacity.saturating_add(stats.cargo_capacity.saturating_mul(count));
        }
        Ok(capacity)
    }

    /// Returns the actual speed of a stack by taking the slowest unit (minutes per field).
    pub fn speed(&self, stack: &UnitStack) -> Result<u32, GameError> {
        let mut speed = 0;
        for (_, stats, count) in self.resolve_stack(stack)? {
            if count > 0 && stats.speed > speed {
                speed = stats.speed;
            }
        }
        Ok(speed)
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

struct StandardUnit {
    id: &'static str,
    category: UnitCategory,
    tags: &'static [UnitTag],
    attack: u32,
    defense_infantry: u32,
    defense_cavalry: u32,
    defense_ranged: u32,
    speed: u32,
    cargo_capacity: u32,
    population_cost: u32,
}

impl StandardUnit {
    fn stats(&self) -> UnitTypeStats {
        UnitTypeStats {
            category: self.category,
            tags: self.tags.to_vec(),
            attack: self.attack,
            defense_infantry: self.defense_infantry,
            defense_cavalry: self.defense_cavalry,
            defense_ranged: self.defense_ranged,
            speed: self.speed,
            cargo_capacity: self.cargo_capacity,
            population_cost: self.population_cost,
        }
    }
}

static STANDARD_UNITS: [StandardUnit; 12] = [
    StandardUnit {
        id: "spear",
        category: UnitCategory::Infantry,
        tags: &[UnitTag::Pike],
        attack: 10,
        defense_infantry: 15,
        defense_cavalry: 45,
        defense_ranged: 20,
        speed: 18,
        cargo_capacity: 25,
        population_cost: 1,
    },
    StandardUnit {
        id: "sword",
        category: UnitCategory::Infantry,
        tags: &[],
        attack: 25,
        defense_infantry: 50,
        defense_cavalry: 15,
        defense_ranged: 40,
        speed: 22,
        cargo_capacity: 15,
        population_cost: 1,
    },
    StandardUnit {
        id: "axe",
        category: UnitCategory::Infantry,
        tags: &[],
        attack: 40,
        defense_infantry: 10,
        defense_cavalry: 5,
        defense_ranged: 10,
        speed: 18,
        cargo_capacity: 10,
        population_cost: 1,
    },
    StandardUnit {
        id: "archer",
        category: UnitCategory::Ranged,
        tags: &[],
        attack: 15,
        defense_infantry: 50,
        defense_cavalry: 40,
        defense_ranged: 5,
        speed: 18,
        cargo_capacity: 10,
        population_cost: 1,
    },
    StandardUnit {
        id: "spy",
        category: UnitCategory::Cavalry,
        tags: &[UnitTag::Scout],
        attack: 0,
        defense_infantry: 2,
        defense_cavalry: 1,
        defense_ranged: 2,
        speed: 9,
        cargo_capacity: 0,
        population_cost: 2,
    },
    StandardUnit {
        id: "light",
        category: UnitCategory::Cavalry,
        tags: &[],
        attack: 130,
        defense_infantry: 30,
        defense_cavalry: 40,
        defense_ranged: 30,
        speed: 10,
        cargo_capacity: 80,
        population_cost: 4,
    },
    StandardUnit {
        id: "marcher",
        category: UnitCategory::Ranged,
        tags: &[UnitTag::Ranger],
        attack: 120,
        defense_infantry: 40,
        defense_cavalry: 30,
        defense_ranged: 50,
        speed: 10,
        cargo_capacity: 50,
        population_cost: 5,
    },
    StandardUnit {
        id: "heavy",
        category: UnitCategory::Cavalry,
        tags: &[],
        attack: 150,
        defense_infantry: 200,
        defense_cavalry: 80,
        defense_ranged: 180,
        speed: 11,
        cargo_capacity: 50,
        population_cost: 6,
    },
    StandardUnit {
        id: "ram",
        category: UnitCategory::Siege,
        tags: &[UnitTag::Ram],
        attack: 2,
        defense_infantry: 20,
        defense_cavalry: 50,
        defense_ranged: 20,
        speed: 30,
        cargo_capacity: 0,
        population_cost: 5,
    },
    StandardUnit {
        id: "catapult",
        category: UnitCategory::Siege,
        tags: &[UnitTag::Catapult],
        attack: 100,
        defense_infantry: 100,
        defense_cavalry: 50,
        defense_ranged: 100,
        speed: 30,
        cargo_capacity: 0,
        population_cost: 8,
    },
    StandardUnit {
        id: "knight",
        category: UnitCategory::Cavalry,
        tags: &[],
        attack: 150,
        defense_infantry: 250,
        defense_cavalry: 400,
        defense_ranged: 150,
        speed: 10,
        cargo_capacity: 100,
        population_cost: 10,
    },
    StandardUnit {
        id: "snob",
        category: UnitCategory::Infantry,
        tags: &[UnitTag::Conquest],
        attack: 30,
        defense_infantry: 100,
        defense_cavalry: 50,
        defense_ranged: 100,
        speed: 35,
        cargo_capacity: 0,
        population_cost: 100,
    },
];
