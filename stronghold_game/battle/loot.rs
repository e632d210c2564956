use serde::{Deserialize, Serialize};

use stronghold_types::{
    battle::{CombatOutcome, DefenderEconomy, LootResult},
    common::ResourceGroup,
};

/// How the surviving carry capacity is split across resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootPolicy {
    /// Capacity split by each resource's share of what can be stolen.
    #[default]
    Proportional,
    /// Lumber first, then clay, then iron.
    Greedy,
}

pub struct LootCalculator {
    policy: LootPolicy,
}

impl LootCalculator {
    pub fn new(policy: LootPolicy) -> Self {
        Self { policy }
    }

    /// Resources exposed to plunder: stock minus the best of vault and hiding place.
    pub fn available(economy: &DefenderEconomy) -> ResourceGroup {
        let protected = economy.vault_protected.max(&economy.hiding_place);
        economy.stock.saturating_sub(&protected)
    }

    pub fn calculate(
        &self,
        outcome: CombatOutcome,
        economy: &DefenderEconomy,
        capacity: u32,
    ) -> LootResult {
        if outcome != CombatOutcome::AttackerWin || capacity == 0 {
            return LootResult {
                plundered: ResourceGroup::default(),
                capacity,
            };
        }

        let available = Self::available(economy);
        let plundered = if available.total() <= capacity as u64 {
            available
        } else {
            match self.policy {
                LootPolicy::Proportional => proportional(available, capacity),
                LootPolicy::Greedy => greedy(available, capacity),
            }
        };

        LootResult {
            plundered,
            capacity,
        }
    }
}

fn greedy(available: ResourceGroup, capacity: u32) -> ResourceGroup {
    let mut left = capacity;
    let taken = available.as_array().map(|amount| {
        let take = amount.min(left);
        left -= take;
        take
    });
    ResourceGroup::from_array(taken)
}

// Floors every share, then hands the remainder out one unit at a time so the whole
// capacity is used without exceeding any resource.
fn proportional(available: ResourceGroup, capacity: u32) -> ResourceGroup {
    let amounts = available.as_array().map(u64::from);
    let total: u64 = amounts.iter().sum();
    let capacity = u64::from(capacity).min(total);
    let mut taken = amounts.map(|amount| amount * capacity / total);

    let mut left = capacity - taken.iter().sum::<u64>();
    while left > 0 {
        let mut progressed = false;
        for (take, amount) in taken.iter_mut().zip(amounts) {
            if left > 0 && *take < amount {
                *take += 1;
                left -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    // Every share is bounded by its own u32 amount.
    ResourceGroup::from_array(taken.map(|take| take as u32))
}
