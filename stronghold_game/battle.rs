//! Combat resolution: one pure pass from two armies and their context to a
//! complete [`BattleReport`].

pub mod advantage;
pub mod loot;
pub mod loyalty;
pub mod morale;
pub mod report;
pub mod request;
pub mod resolver;
pub mod siege;
pub mod wall;

use rand::Rng;

use stronghold_types::{battle::BattleReport, errors::GameError};

use crate::{catalog::UnitCatalog, config::BattleConfig};

pub use report::BattleReportBuilder;
pub use request::{BattleRequest, PreparedBattle};
pub use resolver::{CombatContext, CombatResolver, LUCK_MAX, LUCK_MIN};

/// Validates a raw request and resolves it.
pub fn resolve_battle<R: Rng + ?Sized>(
    request: &BattleRequest,
    catalog: &UnitCatalog,
    config: &BattleConfig,
    rng: &mut R,
) -> Result<BattleReport, GameError> {
    config.validate()?;
    let prepared = request.validate(catalog)?;
    CombatResolver::new(catalog, config).resolve(
        &prepared.attacker,
        &prepared.defender,
        &prepared.context,
        rng,
    )
}
