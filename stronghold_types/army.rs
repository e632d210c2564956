use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Identifier of a unit type inside a unit catalog (e.g. `spear`, `axe`, `snob`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    Infantry,
    Cavalry,
    Ranged,
    Siege,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 4] = [
        UnitCategory::Infantry,
        UnitCategory::Cavalry,
        UnitCategory::Ranged,
        UnitCategory::Siege,
    ];

    pub fn index(&self) -> usize {
        match self {
            UnitCategory::Infantry => 0,
            UnitCategory::Cavalry => 1,
            UnitCategory::Ranged => 2,
            UnitCategory::Siege => 3,
        }
    }
}

/// Special roles a unit type can carry on top of its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTag {
    /// Anti-cavalry infantry.
    Pike,
    /// Mounted or skirmishing ranged unit, effective against siege engines.
    Ranger,
    /// Damages the wall.
    Ram,
    /// Damages a targeted building.
    Catapult,
    /// Lowers loyalty (nobles, envoys).
    Conquest,
    Scout,
}

/// Static combat and logistic values of a unit type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTypeStats {
    pub category: UnitCategory,
    #[serde(default)]
    pub tags: Vec<UnitTag>,
    pub attack: u32,
    pub defense_infantry: u32,
    pub defense_cavalry: u32,
    pub defense_ranged: u32,
    /// Minutes per field.
    pub speed: u32,
    pub cargo_capacity: u32,
    pub population_cost: u32,
}

impl UnitTypeStats {
    pub fn has_tag(&self, tag: UnitTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Returns the defense value against attackers of the given category.
    /// Siege engines are fought off like infantry.
    pub fn defense_against(&self, category: UnitCategory) -> u32 {
        match category {
            UnitCategory::Infantry | UnitCategory::Siege => self.defense_infantry,
            UnitCategory::Cavalry => self.defense_cavalry,
            UnitCategory::Ranged => self.defense_ranged,
        }
    }
}

/// Amount of units per type for one side of a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitStack(BTreeMap<UnitId, u32>);

impl UnitStack {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a stack from raw signed counts, rejecting negative values.
    pub fn from_signed<I, K>(counts: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<UnitId>,
    {
        let mut stack = Self::new();
        for (id, count) in counts {
            let id = id.into();
            if count < 0 {
                return Err(GameError::NegativeUnitCount { unit: id, count });
            }
            let count = u32::try_from(count)
                .map_err(|_| GameError::UnitCountOverflow { unit: id.clone(), count })?;
            stack.add(id, count);
        }
        Ok(stack)
    }

    /// Builder-style helper, mostly useful in tests and fixtures.
    pub fn with(mut self, id: impl Into<UnitId>, count: u32) -> Self {
        self.add(id.into(), count);
        self
    }

    pub fn add(&mut self, id: UnitId, count: u32) {
        let entry = self.0.entry(id).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn set(&mut self, id: UnitId, count: u32) {
        self.0.insert(id, count);
    }

    /// Returns the amount of a given unit.
    pub fn count(&self, id: &UnitId) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, u32)> {
        self.0.iter().map(|(id, count)| (id, *count))
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = &UnitId> {
        self.0.keys()
    }

    /// Returns the total raw number of troops in the stack.
    pub fn immensity(&self) -> u32 {
        self.0.values().fold(0u32, |acc, c| acc.saturating_add(*c))
    }

    pub fn is_empty(&self) -> bool {
        self.immensity() == 0
    }

    /// Removes `other` from this stack, failing if any unit is missing.
    pub fn deploy(&mut self, other: &UnitStack) -> Result<(), GameError> {
        for (id, quantity) in other.iter() {
            if self.count(id) < quantity {
                return Err(GameError::NotEnoughUnits(id.clone()));
            }
        }
        for (id, quantity) in other.iter() {
            if let Some(current) = self.0.get_mut(id) {
                *current -= quantity;
            }
        }
        Ok(())
    }

    /// Adds all units of `other` to this stack.
    pub fn merge(&mut self, other: &UnitStack) {
        for (id, quantity) in other.iter() {
            self.add(id.clone(), quantity);
        }
    }
}

impl FromIterator<(UnitId, u32)> for UnitStack {
    fn from_iter<T: IntoIterator<Item = (UnitId, u32)>>(iter: T) -> Self {
        let mut stack = UnitStack::new();
        for (id, count) in iter {
            stack.add(id, count);
        }
        stack
    }
}
