use thiserror::Error;

/// Errors for app logic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Village {0} not found")]
    VillageNotFound(u32),

    #[error("Village {village_id} was modified concurrently: expected version {expected}, found {found}")]
    VersionConflict {
        village_id: u32,
        expected: u64,
        found: u64,
    },

    #[error("Village {village_id} does not belong to the acting player")]
    VillageNotOwned { village_id: u32 },

    #[error("A village cannot attack itself")]
    SelfAttack,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
