use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use stronghold_core::{AppError, ApplicationError};
use stronghold_game::battle::CombatResolver;
use stronghold_types::battle::BattleReport;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::AttackVillage},
    locks::VillageLocks,
    repository::VillageRepository,
};

/// Resolves an attack between two villages and persists both of them.
/// Battles touching the same village are applied one at a time.
pub struct AttackVillageCommandHandler {
    locks: Arc<VillageLocks>,
    rng: Arc<Mutex<StdRng>>,
}

impl AttackVillageCommandHandler {
    pub fn new(locks: Arc<VillageLocks>) -> Self {
        Self::with_rng(locks, StdRng::from_entropy())
    }

    /// Builds a handler with a given random source, for reproducible battles.
    pub fn with_rng(locks: Arc<VillageLocks>, rng: StdRng) -> Self {
        Self {
            locks,
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler<AttackVillage> for AttackVillageCommandHandler {
    #[instrument(skip_all, fields(
        attacker = command.village_id,
        target = command.target_village_id,
        attack_type = ?command.attack_type,
    ))]
    async fn handle(
        &self,
        command: AttackVillage,
        villages: &Arc<dyn VillageRepository>,
        config: &Arc<Config>,
    ) -> Result<BattleReport, ApplicationError> {
        if command.village_id == command.target_village_id {
            return Err(AppError::SelfAttack.into());
        }

        let _guards = self
            .locks
            .acquire(&[command.village_id, command.target_village_id])
            .await;

        let mut attacker_village = villages.get_by_id(command.village_id).await?;
        let mut defender_village = villages.get_by_id(command.target_village_id).await?;
        if attacker_village.player_id != command.player_id {
            return Err(AppError::VillageNotOwned {
                village_id: command.village_id,
            }
            .into());
        }

        let attacker_version = attacker_village.version;
        let defender_version = defender_village.version;

        config.catalog.validate_stack(&command.units)?;
        attacker_village.deploy_units(&command.units)?;

        let (defender_units, context) = defender_village.battle_snapshot(
            attacker_village.points,
            command.attack_type,
            command.catapult_target,
            config.world_modifiers(),
        );

        let report = {
            let mut rng = self.rng.lock().await;
            CombatResolver::new(&config.catalog, &config.battle).resolve(
                &command.units,
                &defender_units,
                &context,
                &mut *rng,
            )?
        };

        debug!(
            outcome = ?report.outcome,
            ratio = report.ratio,
            luck = report.luck,
            morale = report.morale,
            "Battle resolved."
        );

        defender_village.apply_battle_report(
            &report,
            attacker_village.player_id,
            config.battle.loyalty.after_conquest,
        )?;
        attacker_village.return_survivors(&report);

        if let Err(err) = villages
            .save_all(&[
                (&defender_village, defender_version),
                (&attacker_village, attacker_version),
            ])
            .await
        {
            if let ApplicationError::App(AppError::VersionConflict { village_id, .. }) = &err {
                warn!(village_id, "Stale village write rejected: {err}");
            }
            return Err(err);
        }

        info!(
            attacker_losses = report.attacker_losses(),
            defender_losses = report.defender_losses(),
            plundered = report.loot.plundered.total(),
            conquered = report.loyalty.conquered,
            "Battle report applied."
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use stronghold_core::Result;
    use stronghold_game::{
        models::village::Village,
        test_utils::{VillageFactoryOptions, village_factory},
    };
    use stronghold_types::{
        army::{UnitId, UnitStack},
        battle::AttackType,
        buildings::BuildingName,
        common::ResourceGroup,
        errors::GameError,
    };

    use super::*;
    use crate::repository::InMemoryVillageRepository;

    fn setup() -> (Arc<dyn VillageRepository>, Arc<Config>, AttackVillageCommandHandler) {
        let repo: Arc<dyn VillageRepository> = Arc::new(InMemoryVillageRepository::new());
        let config = Arc::new(Config::default());
        let handler = AttackVillageCommandHandler::with_rng(
            Arc::new(VillageLocks::new()),
            StdRng::seed_from_u64(42),
        );
        (repo, config, handler)
    }

    fn attack(player_id: Uuid, from: u32, to: u32, units: UnitStack) -> AttackVillage {
        AttackVillage {
            player_id,
            village_id: from,
            target_village_id: to,
            units,
            attack_type: AttackType::Normal,
            catapult_target: None,
        }
    }

    #[tokio::test]
    async fn test_attack_village_handler_success() -> Result<()> {
        let (repo, config, handler) = setup();
        let player_id = Uuid::new_v4();

        let attacker = village_factory(VillageFactoryOptions {
            id: Some(1),
            player_id: Some(player_id),
            units: Some(UnitStack::new().with("axe", 200).with("light", 50)),
            ..Default::default()
        });
        let defender = village_factory(VillageFactoryOptions {
            id: Some(2),
            buildings: Some(vec![(BuildingName::Wall, 3)]),
            units: Some(UnitStack::new().with("spear", 20)),
            stocks: Some(ResourceGroup::splat(300)),
            ..Default::default()
        });
        repo.insert(&attacker).await?;
        repo.insert(&defender).await?;

        let units = UnitStack::new().with("axe", 150).with("light", 50);
        let report = handler
            .handle(attack(player_id, 1, 2, units), &repo, &config)
            .await?;
        assert!(report.attacker_won());

        let defender = repo.get_by_id(2).await?;
        assert_eq!(defender.units().count(&"spear".into()), 0);
        assert_eq!(defender.stocks(), ResourceGroup::default());
        assert_eq!(defender.version, 1);

        let attacker = repo.get_by_id(1).await?;
        let axe_survivors = report.attacker[&UnitId::new("axe")].survivors;
        assert_eq!(attacker.units().count(&"axe".into()), 50 + axe_survivors);
        assert_eq!(attacker.stocks(), ResourceGroup::splat(300));
        assert_eq!(attacker.version, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_self_attack_is_rejected() -> Result<()> {
        let (repo, config, handler) = setup();
        let result = handler
            .handle(
                attack(Uuid::new_v4(), 1, 1, UnitStack::new().with("axe", 1)),
                &repo,
                &config,
            )
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::SelfAttack))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_attack_requires_ownership_and_units() -> Result<()> {
        let (repo, config, handler) = setup();
        let player_id = Uuid::new_v4();
        repo.insert(&village_factory(VillageFactoryOptions {
            id: Some(1),
            player_id: Some(player_id),
            units: Some(UnitStack::new().with("axe", 10)),
            ..Default::default()
        }))
        .await?;
        repo.insert(&village_factory(VillageFactoryOptions {
            id: Some(2),
            ..Default::default()
        }))
        .await?;

        let stranger = handler
            .handle(
                attack(Uuid::new_v4(), 1, 2, UnitStack::new().with("axe", 5)),
                &repo,
                &config,
            )
            .await;
        assert!(matches!(
            stranger,
            Err(ApplicationError::App(AppError::VillageNotOwned { village_id: 1 }))
        ));

        let too_many = handler
            .handle(
                attack(player_id, 1, 2, UnitStack::new().with("axe", 11)),
                &repo,
                &config,
            )
            .await;
        assert!(matches!(
            too_many,
            Err(ApplicationError::Game(GameError::NotEnoughUnits(_)))
        ));

        let unknown = handler
            .handle(
                attack(player_id, 1, 2, UnitStack::new().with("dragon", 1)),
                &repo,
                &config,
            )
            .await;
        assert!(matches!(
            unknown,
            Err(ApplicationError::Game(GameError::UnknownUnit(_)))
        ));

        let missing = handler
            .handle(
                attack(player_id, 1, 3, UnitStack::new().with("axe", 1)),
                &repo,
                &config,
            )
            .await;
        assert!(matches!(
            missing,
            Err(ApplicationError::App(AppError::VillageNotFound(3)))
        ));

        // Nothing was persisted by the failed attempts
        let village = repo.get_by_id(1).await?;
        assert_eq!(village.units().count(&"axe".into()), 10);
        assert_eq!(village.version, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_conquest_transfers_ownership() -> Result<()> {
        let (repo, config, handler) = setup();
        let player_id = Uuid::new_v4();
        repo.insert(&village_factory(VillageFactoryOptions {
            id: Some(1),
            player_id: Some(player_id),
            units: Some(UnitStack::new().with("axe", 1000).with("snob", 1)),
            ..Default::default()
        }))
        .await?;
        repo.insert(&village_factory(VillageFactoryOptions {
            id: Some(2),
            buildings: Some(vec![(BuildingName::Farm, 10)]),
            loyalty: Some(15),
            ..Default::default()
        }))
        .await?;

        let units = UnitStack::new().with("axe", 1000).with("snob", 1);
        let report = handler
            .handle(attack(player_id, 1, 2, units), &repo, &config)
            .await?;
        assert!(report.loyalty.conquered);

        let conquered = repo.get_by_id(2).await?;
        assert_eq!(conquered.player_id, player_id);
        assert_eq!(conquered.loyalty(), config.battle.loyalty.after_conquest);
        assert_eq!(conquered.building_level(BuildingName::Farm), 10);
        Ok(())
    }

    /// Another writer bumps `racer` right after the handler reads it.
    struct RacingRepository {
        inner: InMemoryVillageRepository,
        racer: u32,
    }

    #[async_trait::async_trait]
    impl VillageRepository for RacingRepository {
        async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
            let village = self.inner.get_by_id(village_id).await?;
            if village_id == self.racer {
                let mut newer = village.clone();
                newer.version += 1;
                self.inner.save(&newer, village.version).await?;
            }
            Ok(village)
        }

        async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Village>, ApplicationError> {
            self.inner.list_by_player_id(player_id).await
        }

        async fn insert(&self, village: &Village) -> Result<(), ApplicationError> {
            self.inner.insert(village).await
        }

        async fn save(&self, village: &Village, expected_version: u64) -> Result<(), ApplicationError> {
            self.inner.save(village, expected_version).await
        }

        async fn save_all(&self, villages: &[(&Village, u64)]) -> Result<(), ApplicationError> {
            self.inner.save_all(villages).await
        }
    }

    #[tokio::test]
    async fn test_stale_attacker_leaves_defender_untouched() -> Result<()> {
        let (_, config, handler) = setup();
        let store = InMemoryVillageRepository::new();
        let repo: Arc<dyn VillageRepository> = Arc::new(RacingRepository {
            inner: store.clone(),
            racer: 1,
        });
        let player_id = Uuid::new_v4();
        repo.insert(&village_factory(VillageFactoryOptions {
            id: Some(1),
            player_id: Some(player_id),
            units: Some(UnitStack::new().with("axe", 500)),
            ..Default::default()
        }))
        .await?;
        repo.insert(&village_factory(VillageFactoryOptions {
            id: Some(2),
            units: Some(UnitStack::new().with("spear", 10)),
            stocks: Some(ResourceGroup::splat(300)),
            ..Default::default()
        }))
        .await?;

        let result = handler
            .handle(
                attack(player_id, 1, 2, UnitStack::new().with("axe", 500)),
                &repo,
                &config,
            )
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::VersionConflict { village_id: 1, .. }))
        ));

        let defender = store.get_by_id(2).await?;
        assert_eq!(defender.version, 0);
        assert_eq!(defender.units().count(&"spear".into()), 10);
        assert_eq!(defender.stocks(), ResourceGroup::splat(300));

        let attacker = store.get_by_id(1).await?;
        assert_eq!(attacker.version, 1);
        assert_eq!(attacker.units().count(&"axe".into()), 500);
        Ok(())
    }
}
