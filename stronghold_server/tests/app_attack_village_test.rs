
#[cfg(test)]
pub mod tests {
    use tokio::task::JoinSet;
    use uuid::Uuid;

    use stronghold_app::cqrs::commands::AttackVillage;
    use stronghold_core::Result;
    use stronghold_game::test_utils::VillageFactoryOptions;
    use stronghold_types::{
        army::UnitStack, battle::AttackType, buildings::BuildingName, common::ResourceGroup,
    };

    use crate::test_utils::tests::{setup_app, setup_village};

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
    async fn test_concurrent_attacks_lose_no_updates() -> Result<()> {
        let app = setup_app(11);
        let attackers_count = 8u32;

        setup_village(
            &app,
            VillageFactoryOptions {
                id: Some(100),
                stocks: Some(ResourceGroup::splat(1000)),
                ..Default::default()
            },
        )
        .await?;

        let mut owners = Vec::new();
        for id in 1..=attackers_count {
            let player_id = Uuid::new_v4();
            setup_village(
                &app,
                VillageFactoryOptions {
                    id: Some(id),
                    player_id: Some(player_id),
                    units: Some(UnitStack::new().with("axe", 20)),
                    ..Default::default()
                },
            )
            .await?;
            owners.push((id, player_id));
        }

        let mut tasks = JoinSet::new();
        for (id, player_id) in owners {
            let bus = app.bus.clone();
            let handler = app.handler.clone();
            tasks.spawn(async move {
                let command = attack(player_id, id, 100, UnitStack::new().with("axe", 20));
                bus.execute(command, handler.as_ref()).await
            });
        }

        let mut plundered = 0;
        while let Some(joined) = tasks.join_next().await {
            let report = joined.expect("attack task panicked")?;
            assert!(report.attacker_won(), "An empty village cannot hold");
            assert_eq!(report.attacker_losses(), 0);
            plundered += report.loot.plundered.total();
        }

        let defender = app.villages.get_by_id(100).await?;
        assert_eq!(
            defender.version, attackers_count as u64,
            "Every attack must be applied on top of the previous one"
        );
        assert_eq!(defender.stocks().total(), 3000 - plundered);
        // 8 attacks x 20 axes x 10 carry
        assert_eq!(plundered, 1600);

        let mut carried_home = 0;
        for id in 1..=attackers_count {
            let village = app.villages.get_by_id(id).await?;
            assert_eq!(village.version, 1);
            assert_eq!(village.units().count(&"axe".into()), 20);
            carried_home += village.stocks().total();
        }
        assert_eq!(carried_home, plundered);
        Ok(())
    }

    #[tokio::test]
    async fn test_crossed_attacks_do_not_deadlock() -> Result<()> {
        let app = setup_app(3);
        let (first_owner, second_owner) = (Uuid::new_v4(), Uuid::new_v4());
        for (id, owner) in [(1, first_owner), (2, second_owner)] {
            setup_village(
                &app,
                VillageFactoryOptions {
                    id: Some(id),
                    player_id: Some(owner),
                    units: Some(UnitStack::new().with("axe", 50).with("spear", 50)),
                    ..Default::default()
                },
            )
            .await?;
        }

        let forward = {
            let bus = app.bus.clone();
            let handler = app.handler.clone();
            tokio::spawn(async move {
                let command = attack(first_owner, 1, 2, UnitStack::new().with("axe", 50));
                bus.execute(command, handler.as_ref()).await
            })
        };
        let backward = {
            let bus = app.bus.clone();
            let handler = app.handler.clone();
            tokio::spawn(async move {
                let command = attack(second_owner, 2, 1, UnitStack::new().with("axe", 50));
                bus.execute(command, handler.as_ref()).await
            })
        };

        let (forward, backward) = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            async { tokio::join!(forward, backward) },
        )
        .await
        .expect("crossed attacks should both complete");
        // The second attack may find its axes already killed at home
        let applied = [
            forward.expect("forward attack panicked"),
            backward.expect("backward attack panicked"),
        ]
        .iter()
        .filter(|result| result.is_ok())
        .count() as u64;
        assert!(applied >= 1);

        for id in [1, 2] {
            let village = app.villages.get_by_id(id).await?;
            assert_eq!(village.version, applied, "Village {id} takes part in every attack");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_rams_razing_the_wall_persist_between_attacks() -> Result<()> {
        let app = setup_app(5);
        let player_id = Uuid::new_v4();
        setup_village(
            &app,
            VillageFactoryOptions {
                id: Some(1),
                player_id: Some(player_id),
                units: Some(UnitStack::new().with("axe", 100).with("ram", 20)),
                ..Default::default()
            },
        )
        .await?;
        setup_village(
            &app,
            VillageFactoryOptions {
                id: Some(2),
                buildings: Some(vec![(BuildingName::Wall, 5)]),
                ..Default::default()
            },
        )
        .await?;

        let command = attack(
            player_id,
            1,
            2,
            UnitStack::new().with("axe", 100).with("ram", 20),
        );
        let report = app.bus.execute(command, app.handler.as_ref()).await?;
        assert_eq!(report.fortification.start_level, 5);
        assert_eq!(report.fortification.end_level, 0);

        let defender = app.villages.get_by_id(2).await?;
        assert_eq!(defender.wall_level(), 0);

        let command = attack(player_id, 1, 2, UnitStack::new().with("axe", 10));
        let report = app.bus.execute(command, app.handler.as_ref()).await?;
        assert_eq!(report.fortification.start_level, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_catapults_hit_the_chosen_building() -> Result<()> {
        let app = setup_app(9);
        let player_id = Uuid::new_v4();
        setup_village(
            &app,
            VillageFactoryOptions {
                id: Some(1),
                player_id: Some(player_id),
                units: Some(UnitStack::new().with("axe", 100).with("catapult", 50)),
                ..Default::default()
            },
        )
        .await?;
        setup_village(
            &app,
            VillageFactoryOptions {
                id: Some(2),
                buildings: Some(vec![(BuildingName::Farm, 10)]),
                ..Default::default()
            },
        )
        .await?;

        let mut command = attack(
            player_id,
            1,
            2,
            UnitStack::new().with("axe", 100).with("catapult", 50),
        );
        command.catapult_target = Some(BuildingName::Farm);
        let report = app.bus.execute(command, app.handler.as_ref()).await?;

        assert_eq!(report.building.target, Some(BuildingName::Farm));
        assert_eq!(report.building.start_level, 10);
        assert!(report.building.end_level < 10);

        let defender = app.villages.get_by_id(2).await?;
        assert_eq!(
            defender.building_level(BuildingName::Farm),
            report.building.end_level
        );
        Ok(())
    }
}
