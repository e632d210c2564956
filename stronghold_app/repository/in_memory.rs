use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use stronghold_core::{AppError, ApplicationError};
use stronghold_game::models::village::Village;

use super::VillageRepository;

/// Village store kept in memory, shared by clones.
#[derive(Default, Clone)]
pub struct InMemoryVillageRepository {
    villages: Arc<RwLock<HashMap<u32, Village>>>,
}

impl InMemoryVillageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VillageRepository for InMemoryVillageRepository {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
        let villages = self.villages.read().await;
        villages
            .get(&village_id)
            .cloned()
            .ok_or_else(|| AppError::VillageNotFound(village_id).into())
    }

    async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Village>, ApplicationError> {
        let villages = self.villages.read().await;
        let mut owned: Vec<Village> = villages
            .values()
            .filter(|v| v.player_id == player_id)
            .cloned()
            .collect();
        owned.sort_by_key(|v| v.id);
        Ok(owned)
    }

    async fn insert(&self, village: &Village) -> Result<(), ApplicationError> {
        self.villages
            .write()
            .await
            .insert(village.id, village.clone());
        Ok(())
    }

    async fn save(
        &self,
        village: &Village,
        expected_version: u64,
    ) -> Result<(), ApplicationError> {
        self.save_all(&[(village, expected_version)]).await
    }

    async fn save_all(&self, updates: &[(&Village, u64)]) -> Result<(), ApplicationError> {
        let mut villages = self.villages.write().await;
        for (village, expected_version) in updates {
            let stored = villages
                .get(&village.id)
                .ok_or(AppError::VillageNotFound(village.id))?;
            if stored.version != *expected_version {
                return Err(AppError::VersionConflict {
                    village_id: village.id,
                    expected: *expected_version,
                    found: stored.version,
                }
                .into());
            }
        }

        for (village, _) in updates {
            villages.insert(village.id, (*village).clone());
        }
        Ok(())
    }
}
