use serde::{Deserialize, Serialize};

/// Anti-farming rule: attacking a much smaller player weakens the attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoraleCurve {
    /// Lowest morale an attacker can suffer.
    pub floor: f64,
    /// Shape of the curve between the floor and 1.0 (smaller = steeper near zero).
    pub exponent: f64,
}

impl Default for MoraleCurve {
    fn default() -> Self {
        Self {
            floor: 0.3,
            exponent: 0.5,
        }
    }
}

impl MoraleCurve {
    /// Returns the attacker morale given both players' points.
    ///
    /// Full morale when the defender is at least as strong as the attacker, otherwise
    /// `floor + (1 - floor) * (defender / attacker) ^ exponent`.
    pub fn morale(&self, attacker_points: f64, defender_points: f64) -> f64 {
        let floor = self.floor.clamp(0.0, 1.0);
        if attacker_points <= 0.0 {
            return 1.0;
        }

        let ratio = (defender_points.max(0.0) / attacker_points).min(1.0);
        if ratio >= 1.0 {
            return 1.0;
        }

        (floor + (1.0 - floor) * ratio.powf(self.exponent)).clamp(floor, 1.0)
    }
}
