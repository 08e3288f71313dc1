//! Static structures.
//!
//! HQs and garages produce units, depots anchor trucks and pay passive
//! income, and the fortin is a fixed defense with a firing arc. All of them
//! share the same construction lifecycle.

use serde::{Deserialize, Serialize};

use crate::combat::FixedDefense;
use crate::components::{EntityId, Health};
use crate::config::SimConfig;
use crate::construction::ConstructionState;
use crate::factions::FactionId;
use crate::geometry::Footprint;
use crate::ledger::IncomeTimer;
use crate::math::Vec2Fixed;
use crate::production::ProductionQueue;
use crate::units::UnitKind;

/// Building kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Headquarters. Produces infantry and sweepers.
    Hq,
    /// Storage depot. Accepts truck deliveries.
    Depot,
    /// Garage. Produces trucks and tanks.
    Garage,
    /// Fixed defense.
    Fortin,
}

impl BuildingKind {
    /// Every building kind.
    pub const ALL: [Self; 4] = [Self::Hq, Self::Depot, Self::Garage, Self::Fortin];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hq => "HQ",
            Self::Depot => "Depot",
            Self::Garage => "Garage",
            Self::Fortin => "Fortin",
        }
    }

    /// Whether this kind of building can produce `unit`.
    #[must_use]
    pub const fn can_produce(self, unit: UnitKind) -> bool {
        matches!(
            (self, unit),
            (Self::Hq, UnitKind::Soldier | UnitKind::Sweeper)
                | (Self::Garage, UnitKind::Truck | UnitKind::Tank)
        )
    }

    /// Whether this kind carries a production queue at all.
    #[must_use]
    pub const fn has_queue(self) -> bool {
        matches!(self, Self::Hq | Self::Garage)
    }
}

/// A static structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    /// Stable handle.
    pub id: EntityId,
    /// Kind tag.
    pub kind: BuildingKind,
    /// Owning side.
    pub faction: FactionId,
    /// Centre point.
    pub position: Vec2Fixed,
    /// Occupied space.
    pub footprint: Footprint,
    /// Hit points.
    pub health: Health,
    /// Construction lifecycle.
    pub construction: ConstructionState,
    /// Player HQs and garages only.
    pub production: Option<ProductionQueue>,
    /// Player depots only.
    pub income: Option<IncomeTimer>,
    /// Fortins only.
    pub defense: Option<FixedDefense>,
}

impl Building {
    /// Placed building whose construction has not started.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: BuildingKind,
        faction: FactionId,
        position: Vec2Fixed,
        config: &SimConfig,
    ) -> Self {
        let stats = config.buildings.get(kind);
        let player = faction == FactionId::Player;
        Self {
            id,
            kind,
            faction,
            position,
            footprint: stats.footprint.at(position),
            health: Health::new(stats.hp),
            construction: ConstructionState::NotStarted,
            production: (player && kind.has_queue()).then(ProductionQueue::new),
            income: (player && kind == BuildingKind::Depot).then(IncomeTimer::default),
            defense: stats.defense.map(FixedDefense::from_profile),
        }
    }

    /// Building that is already finished, as placed by world seeding.
    #[must_use]
    pub fn complete(
        id: EntityId,
        kind: BuildingKind,
        faction: FactionId,
        position: Vec2Fixed,
        config: &SimConfig,
    ) -> Self {
        let mut building = Self::new(id, kind, faction, position, config);
        building.construction = ConstructionState::Complete;
        building
    }

    /// A building is alive while it has hit points left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Check if construction has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.construction.is_complete()
    }

    /// Whether an `Enqueue` for `unit` is acceptable here.
    #[must_use]
    pub fn accepts_order(&self, unit: UnitKind) -> bool {
        self.production.is_some() && self.kind.can_produce(unit)
    }

    /// A complete depot of the given faction that trucks may deliver to.
    #[must_use]
    pub fn is_storage_for(&self, faction: FactionId) -> bool {
        self.kind == BuildingKind::Depot
            && self.faction == faction
            && self.is_complete()
            && self.is_alive()
    }
}
