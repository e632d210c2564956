use uuid::Uuid;

use stronghold_core::ApplicationError;
use stronghold_game::models::village::Village;

#[async_trait::async_trait]
pub trait VillageRepository: Send + Sync {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError>;
    async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Village>, ApplicationError>;

    /// Stores a brand new village.
    async fn insert(&self, village: &Village) -> Result<(), ApplicationError>;

    /// Stores a village only if the persisted copy still has `expected_version`,
    /// failing with a version conflict otherwise.
    async fn save(&self, village: &Village, expected_version: u64)
    -> Result<(), ApplicationError>;

    /// Stores several villages together, each paired with its expected version.
    /// Nothing is written unless every version matches.
    async fn save_all(&self, villages: &[(&Village, u64)]) -> Result<(), ApplicationError>;
}
