//! Resource piles that trucks harvest.

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::geometry::{Circle, Footprint};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// A finite heap of salvage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePile {
    /// Stable handle.
    pub id: EntityId,
    /// Centre of the pile.
    pub position: Vec2Fixed,
    /// Trucks within this distance can harvest.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Stock left to take.
    pub stock: u32,
}

impl ResourcePile {
    /// Create a pile.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2Fixed, radius: Fixed, stock: u32) -> Self {
        Self {
            id,
            position,
            radius,
            stock,
        }
    }

    /// Check if nothing is left.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.stock == 0
    }

    /// Remove up to `requested` stock, returning what was actually taken.
    pub fn take(&mut self, requested: u32) -> u32 {
        let taken = requested.min(self.stock);
        self.stock -= taken;
        taken
    }

    /// Space the pile blocks for construction.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint::Circle(Circle::new(self.position, self.radius))
    }
}
