use rand::Rng;
use uuid::Uuid;

use stronghold_types::{army::UnitStack, buildings::BuildingName, common::ResourceGroup};

use crate::models::village::Village;

#[derive(Default, Clone)]
pub struct VillageFactoryOptions {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub player_id: Option<Uuid>,
    pub points: Option<f64>,
    pub buildings: Option<Vec<(BuildingName, u8)>>,
    pub units: Option<UnitStack>,
    pub stocks: Option<ResourceGroup>,
    pub vault: Option<ResourceGroup>,
    pub loyalty: Option<u16>,
}

pub fn village_factory(options: VillageFactoryOptions) -> Village {
    let id = options
        .id
        .unwrap_or_else(|| rand::thread_rng().gen_range(1..1_000_000));
    let mut village = Village::new(
        id,
        options.name.unwrap_or("Factory Village".to_string()),
        options.player_id.unwrap_or_else(Uuid::new_v4),
    );

    village.points = options.points.unwrap_or(1000.0);
    for (name, level) in options.buildings.unwrap_or_default() {
        village
            .set_building_level(name, level)
            .expect("factory building level");
    }
    if let Some(units) = options.units {
        village.station_units(&units);
    }
    if let Some(stocks) = options.stocks {
        village.store_resources(&stocks);
    }
    village.set_vault(options.vault.unwrap_or_default());
    if let Some(loyalty) = options.loyalty {
        village.set_loyalty_for_test(loyalty);
    }
    village.version = 0;
    village
}
