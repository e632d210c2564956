#[cfg(test)]
pub mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;

    use stronghold_game::{
        battle::{BattleRequest, resolve_battle},
        catalog::UnitCatalog,
        config::BattleConfig,
    };
    use stronghold_types::{
        battle::{BattleReport, CombatOutcome},
        errors::GameError,
    };

    fn fight(request: serde_json::Value, seed: u64) -> Result<BattleReport, GameError> {
        let request: BattleRequest =
            serde_json::from_value(request).expect("request should deserialize");
        let mut rng = StdRng::seed_from_u64(seed);
        resolve_battle(
            &request,
            &UnitCatalog::standard(),
            &BattleConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_mixed_army_breaks_a_small_garrison() {
        for seed in 0..25 {
            let report = fight(
                json!({
                    "attacker": { "axe": 100, "light": 50 },
                    "defender": { "spear": 50, "sword": 30 },
                    "fortification_level": 5,
                    "attacker_points": 2000,
                    "defender_points": 1000
                }),
                seed,
            )
            .unwrap();

            assert_eq!(report.outcome, CombatOutcome::AttackerWin, "seed {seed}");
            assert!(report.morale < 1.0, "A bigger attacker suffers morale");
            assert_eq!(report.defender_losses(), 80);
        }
    }

    #[test]
    fn test_fortified_village_holds_a_weak_attack() {
        for seed in 0..25 {
            let report = fight(
                json!({
                    "attacker": { "spear": 30 },
                    "defender": { "spear": 100, "sword": 50, "archer": 40 },
                    "fortification_level": 10,
                    "attacker_points": 1000,
                    "defender_points": 5000
                }),
                seed,
            )
            .unwrap();

            assert_eq!(report.outcome, CombatOutcome::DefenderHold, "seed {seed}");
            assert_eq!(report.attacker_losses(), 30);
            assert_eq!(report.loot.plundered.total(), 0);
            assert_eq!(report.fortification.end_level, 10);
        }
    }

    #[test]
    fn test_higher_wall_costs_the_attacker_more() {
        for seed in 0..25 {
            let at_level = |level: u8| {
                fight(
                    json!({
                        "attacker": { "axe": 100 },
                        "defender": { "spear": 50 },
                        "fortification_level": level
                    }),
                    seed,
                )
                .unwrap()
            };

            let open = at_level(0);
            let walled = at_level(15);
            assert!(
                walled.attacker_losses() >= open.attacker_losses(),
                "seed {seed}: {} < {}",
                walled.attacker_losses(),
                open.attacker_losses()
            );
            assert!(walled.defense_power > open.defense_power);
        }
    }

    #[test]
    fn test_same_seed_replays_the_same_battle() {
        let request = json!({
            "attacker": { "axe": 300, "ram": 20, "catapult": 10, "snob": 1 },
            "defender": { "spear": 100, "archer": 50 },
            "fortification_level": 8,
            "attacker_points": 4000,
            "defender_points": 3000,
            "target_building": { "name": "farm", "level": 12 },
            "defender_economy": { "stock": [5000, 5000, 5000], "hiding_place": [100, 100, 100] },
            "loyalty": 60
        });

        let first = fight(request.clone(), 99).unwrap();
        let second = fight(request, 99).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_invalid_requests_are_rejected() {
        let negative = fight(json!({ "attacker": { "axe": -5 } }), 1);
        assert!(matches!(negative, Err(GameError::NegativeUnitCount { .. })));

        let unknown = fight(json!({ "attacker": { "dragon": 5 } }), 1);
        assert!(matches!(unknown, Err(GameError::UnknownUnit(_))));

        let negative_wall = fight(
            json!({ "attacker": { "axe": 5 }, "fortification_level": -1 }),
            1,
        );
        assert!(matches!(negative_wall, Err(GameError::NegativeLevel { .. })));

        let huge_wall = fight(
            json!({ "attacker": { "axe": 5 }, "fortification_level": 300 }),
            1,
        );
        assert!(matches!(huge_wall, Err(GameError::LevelOutOfRange { .. })));

        let bad_speed = fight(
            json!({ "attacker": { "axe": 5 }, "world": { "speed": 0.0, "morale_enabled": true } }),
            1,
        );
        assert!(matches!(bad_speed, Err(GameError::InvalidWorldSpeed(_))));
    }

    #[test]
    fn test_custom_catalog_is_used_for_battles() {
        let catalog = UnitCatalog::from_json(
            r#"{
                "militia": { "category": "infantry", "attack": 5, "defense_infantry": 5,
                             "defense_cavalry": 5, "defense_ranged": 5, "speed": 18,
                             "cargo_capacity": 5, "population_cost": 1 },
                "knight": { "category": "cavalry", "attack": 200, "defense_infantry": 100,
                            "defense_cavalry": 100, "defense_ranged": 100, "speed": 10,
                            "cargo_capacity": 0, "population_cost": 10 }
            }"#,
        )
        .unwrap();

        let request: BattleRequest = serde_json::from_value(json!({
            "attacker": { "knight": 10 },
            "defender": { "militia": 20 }
        }))
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let report =
            resolve_battle(&request, &catalog, &BattleConfig::default(), &mut rng).unwrap();
        assert_eq!(report.outcome, CombatOutcome::AttackerWin);

        let standard_units: BattleRequest =
            serde_json::from_value(json!({ "attacker": { "axe": 1 } })).unwrap();
        let result = resolve_battle(&standard_units, &catalog, &BattleConfig::default(), &mut rng);
        assert!(matches!(result, Err(GameError::UnknownUnit(_))));
    }
}
