use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingName {
    Headquarters,
    Barracks,
    Stable,
    Workshop,
    Academy,
    Smithy,
    RallyPoint,
    Statue,
    Market,
    TimberCamp,
    ClayPit,
    IronMine,
    Farm,
    Warehouse,
    HidingPlace,
    Wall,
    Watchtower,
    Church,
}

impl BuildingName {
    /// Highest level a building of this kind can reach.
    pub fn max_level(&self) -> u8 {
        match self {
            BuildingName::Headquarters => 30,
            BuildingName::Barracks => 25,
            BuildingName::Stable => 20,
            BuildingName::Workshop => 15,
            BuildingName::Academy => 1,
            BuildingName::Smithy => 20,
            BuildingName::RallyPoint => 1,
            BuildingName::Statue => 1,
            BuildingName::Market => 25,
            BuildingName::TimberCamp => 30,
            BuildingName::ClayPit => 30,
            BuildingName::IronMine => 30,
            BuildingName::Farm => 30,
            BuildingName::Warehouse => 30,
            BuildingName::HidingPlace => 10,
            BuildingName::Wall => 20,
            BuildingName::Watchtower => 20,
            BuildingName::Church => 3,
        }
    }

    /// Resources protected from plunder by a hiding place at `level` (per resource).
    pub fn hiding_place_capacity(level: u8) -> u32 {
        if level == 0 {
            return 0;
        }
        // 150 at level 1, 2000 at level 10
        let growth = (2000.0f64 / 150.0).powf((level as f64 - 1.0) / 9.0);
        (150.0 * growth).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiding_place_capacity_curve() {
        assert_eq!(BuildingName::hiding_place_capacity(0), 0);
        assert_eq!(BuildingName::hiding_place_capacity(1), 150);
        assert_eq!(BuildingName::hiding_place_capacity(10), 2000);

        let mut previous = 0;
        for level in 1..=10 {
            let capacity = BuildingName::hiding_place_capacity(level);
            assert!(capacity > previous);
            previous = capacity;
        }
    }
}
