use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup(pub u32, pub u32, pub u32);

impl ResourceGroup {
    pub const fn new(lumber: u32, clay: u32, iron: u32) -> Self {
        Self(lumber, clay, iron)
    }

    pub const fn splat(amount: u32) -> Self {
        Self(amount, amount, amount)
    }

    /// Sum of the three resources. Wide enough to never overflow.
    pub fn total(&self) -> u64 {
        self.0 as u64 + self.1 as u64 + self.2 as u64
    }

    pub fn lumber(&self) -> u32 {
        self.0
    }
    pub fn clay(&self) -> u32 {
        self.1
    }
    pub fn iron(&self) -> u32 {
        self.2
    }

    pub fn as_array(&self) -> [u32; 3] {
        [self.0, self.1, self.2]
    }

    pub fn from_array(values: [u32; 3]) -> Self {
        Self(values[0], values[1], values[2])
    }

    /// Per-resource maximum of two groups.
    pub fn max(&self, other: &ResourceGroup) -> ResourceGroup {
        Self(
            self.0.max(other.0),
            self.1.max(other.1),
            self.2.max(other.2),
        )
    }

    /// Per-resource subtraction, floored at zero.
    pub fn saturating_sub(&self, other: &ResourceGroup) -> ResourceGroup {
        Self(
            self.0.saturating_sub(other.0),
            self.1.saturating_sub(other.1),
            self.2.saturating_sub(other.2),
        )
    }
}

impl core::ops::Add for ResourceGroup {
    type Output = ResourceGroup;

    fn add(self, rhs: Self) -> Self::Output {
        Self(
            self.0.saturating_add(rhs.0),
            self.1.saturating_add(rhs.1),
            self.2.saturating_add(rhs.2),
        )
    }
}
