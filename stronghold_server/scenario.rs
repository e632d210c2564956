use std::{collections::HashMap, sync::Arc};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{info, warn};

use stronghold_app::{
    app_bus::AppBus,
    command_handlers::AttackVillageCommandHandler,
    config::Config,
    cqrs::commands::AttackVillage,
    locks::VillageLocks,
    repository::{InMemoryVillageRepository, VillageRepository},
};
use stronghold_core::ApplicationError;
use stronghold_game::{
    battle::{BattleRequest, resolve_battle},
    models::village::Village,
};
use stronghold_types::battle::BattleReport;

/// What the binary accepts on input: either standalone battles or a small
/// world of villages with the attacks to play on it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Scenario {
    Battles(Vec<BattleRequest>),
    World(WorldScenario),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldScenario {
    pub villages: Vec<Village>,
    pub attacks: Vec<AttackVillage>,
}

/// Result of a single battle: its report, or why it could not be fought.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BattleOutcome {
    Report(Box<BattleReport>),
    Rejected { error: String },
}

impl BattleOutcome {
    fn from_result<E: ToString>(result: Result<BattleReport, E>) -> Self {
        match result {
            Ok(report) => BattleOutcome::Report(Box::new(report)),
            Err(err) => BattleOutcome::Rejected {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorldOutcome {
    pub reports: Vec<BattleOutcome>,
    pub villages: Vec<Village>,
}

pub async fn run(input: &str, config: Arc<Config>) -> Result<serde_json::Value, ApplicationError> {
    let output = match serde_json::from_str::<Scenario>(input)? {
        Scenario::Battles(requests) => serde_json::to_value(resolve_battles(&requests, &config))?,
        Scenario::World(world) => serde_json::to_value(play_world(world, config).await?)?,
    };
    Ok(output)
}

fn battle_rng(config: &Config) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Resolves independent battles in order. A bad request is reported and skipped.
pub fn resolve_battles(requests: &[BattleRequest], config: &Config) -> Vec<BattleOutcome> {
    let mut rng = battle_rng(config);
    let outcomes: Vec<BattleOutcome> = requests
        .iter()
        .enumerate()
        .map(|(idx, request)| {
            let result = resolve_battle(request, &config.catalog, &config.battle, &mut rng);
            if let Err(err) = &result {
                warn!(battle = idx, "Battle rejected: {err}");
            }
            BattleOutcome::from_result(result)
        })
        .collect();

    info!(battles = outcomes.len(), "Battles resolved.");
    outcomes
}

/// Groups attacks that share a village, directly or through other attacks.
/// Each chain lists its attack indices in input order.
fn attack_chains(attacks: &[AttackVillage]) -> Vec<Vec<usize>> {
    let mut chains: Vec<Vec<usize>> = Vec::new();
    let mut owner: HashMap<u32, usize> = HashMap::new();

    for (idx, attack) in attacks.iter().enumerate() {
        let ids = [attack.village_id, attack.target_village_id];
        let mut touched: Vec<usize> = ids.iter().filter_map(|id| owner.get(id).copied()).collect();
        touched.sort_unstable();
        touched.dedup();

        let chain = match touched.split_first() {
            None => {
                chains.push(Vec::new());
                chains.len() - 1
            }
            Some((&first, rest)) => {
                for &other in rest {
                    let merged = std::mem::take(&mut chains[other]);
                    chains[first].extend(merged);
                    owner.values_mut().filter(|c| **c == other).for_each(|c| *c = first);
                }
                first
            }
        };
        chains[chain].push(idx);
        for id in ids {
            owner.insert(id, chain);
        }
    }

    chains.retain(|chain| !chain.is_empty());
    for chain in &mut chains {
        chain.sort_unstable();
    }
    chains
}

/// Plays the attacks against an in-memory world and returns the reports (in
/// input order) with the final state of the villages.
///
/// Attacks with no village in common run concurrently, attacks sharing one
/// run in input order. Every attack gets its own random source, drawn from
/// the configured seed in input order, so a seeded world always plays out the
/// same way.
pub async fn play_world(
    world: WorldScenario,
    config: Arc<Config>,
) -> Result<WorldOutcome, ApplicationError> {
    let repo = InMemoryVillageRepository::new();
    for village in &world.villages {
        repo.insert(village).await?;
    }
    let repo: Arc<dyn VillageRepository> = Arc::new(repo);

    let mut master = battle_rng(&config);
    let seeds: Vec<u64> = world.attacks.iter().map(|_| master.next_u64()).collect();
    let chains = attack_chains(&world.attacks);
    let mut pending: Vec<Option<AttackVillage>> = world.attacks.into_iter().map(Some).collect();

    let bus = Arc::new(AppBus::new(config, repo.clone()));
    let locks = Arc::new(VillageLocks::new());

    let mut tasks = JoinSet::new();
    for chain in chains {
        let attacks: Vec<(usize, AttackVillage, u64)> = chain
            .into_iter()
            .filter_map(|idx| pending[idx].take().map(|attack| (idx, attack, seeds[idx])))
            .collect();
        let bus = bus.clone();
        let locks = locks.clone();
        tasks.spawn(async move {
            let mut results = Vec::with_capacity(attacks.len());
            for (idx, attack, seed) in attacks {
                let handler =
                    AttackVillageCommandHandler::with_rng(locks.clone(), StdRng::seed_from_u64(seed));
                results.push((idx, bus.execute(attack, &handler).await));
            }
            results
        });
    }

    let mut results = Vec::with_capacity(seeds.len());
    while let Some(joined) = tasks.join_next().await {
        let chain = joined.map_err(|e| ApplicationError::Unknown(e.to_string()))?;
        for (idx, result) in chain {
            if let Err(err) = &result {
                warn!(attack = idx, "Attack rejected: {err}");
            }
            results.push((idx, BattleOutcome::from_result(result)));
        }
    }
    results.sort_by_key(|(idx, _)| *idx);

    let mut villages = Vec::with_capacity(world.villages.len());
    for village in &world.villages {
        villages.push(repo.get_by_id(village.id).await?);
    }

    info!(attacks = results.len(), "World played.");
    Ok(WorldOutcome {
        reports: results.into_iter().map(|(_, outcome)| outcome).collect(),
        villages,
    })
}
