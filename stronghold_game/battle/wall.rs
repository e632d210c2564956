use serde::{Deserialize, Serialize};

/// Turns the wall level into a defense multiplier and tells whether a fight
/// happens in the open field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallDefenseModel {
    /// Defense bonus added for each wall level (0.04 = +4%).
    pub bonus_per_level: f64,
    /// Upper bound of the multiplier.
    pub max_multiplier: f64,
    /// Walls below this level do not count as fortified.
    pub open_field_below: u8,
}

impl Default for WallDefenseModel {
    fn default() -> Self {
        Self {
            bonus_per_level: 0.04,
            max_multiplier: 2.0,
            open_field_below: 3,
        }
    }
}

impl WallDefenseModel {
    pub fn multiplier(&self, level: u8) -> f64 {
        (1.0 + level as f64 * self.bonus_per_level).min(self.max_multiplier.max(1.0))
    }

    pub fn is_open_field(&self, level: u8) -> bool {
        level < self.open_field_below
    }
}
