use thiserror::Error;

use crate::{army::UnitId, buildings::BuildingName};

/// Errors for domain logic (game rules).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Unit {0} not found in the unit catalog")]
    UnknownUnit(UnitId),

    #[error("Negative amount {count} for unit {unit}")]
    NegativeUnitCount { unit: UnitId, count: i64 },

    #[error("Amount {count} for unit {unit} is too large")]
    UnitCountOverflow { unit: UnitId, count: i64 },

    #[error("Negative {what} level: {level}")]
    NegativeLevel { what: &'static str, level: i64 },

    #[error("{level} is an invalid level for {what}")]
    LevelOutOfRange { what: &'static str, level: i64 },

    #[error("Invalid world speed: {0}")]
    InvalidWorldSpeed(f64),

    #[error("Invalid {side} points: {points}")]
    InvalidPoints { side: &'static str, points: f64 },

    #[error("Not enough {0} available to deploy")]
    NotEnoughUnits(UnitId),

    #[error("No units selected to deploy")]
    NoUnitsSelected,

    #[error("Building {0:?} not found")]
    BuildingNotFound(BuildingName),

    #[error("Invalid unit catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid battle configuration: {0}")]
    InvalidBattleConfig(String),
}
