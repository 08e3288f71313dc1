//! Read-only views of the world.
//!
//! A [`Snapshot`] is a plain copy of what a renderer or HUD needs: entity
//! positions, hit points, queue contents, the ledger balance and the match
//! status. Coordinates are written as decimals so the serialized form is
//! readable.

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingKind};
use crate::combat::{Projectile, ProjectileTarget};
use crate::components::EntityId;
use crate::events::GameStatus;
use crate::factions::FactionId;
use crate::hauler::HaulerState;
use crate::math::{decimal_serde, decimal_vec_serde, Fixed, Vec2Fixed};
use crate::mines::{Mine, MineState};
use crate::piles::ResourcePile;
use crate::production::ProductionOrder;
use crate::simulation::Simulation;
use crate::units::{Unit, UnitKind};

/// A unit as seen from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    /// Handle.
    pub id: EntityId,
    /// Kind tag.
    pub kind: UnitKind,
    /// Owning side.
    pub faction: FactionId,
    /// Position.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Whether the unit has somewhere to go.
    pub moving: bool,
    /// Truck state, for trucks.
    pub hauler_state: Option<HaulerState>,
    /// Truck cargo, for trucks.
    pub cargo: Option<u32>,
    /// Whether a constructor has an order outstanding.
    pub building: bool,
}

impl From<&Unit> for UnitView {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            kind: unit.kind,
            faction: unit.faction,
            position: unit.position,
            hp: unit.health.current,
            max_hp: unit.health.max,
            moving: unit.movement.target.is_some(),
            hauler_state: unit.hauler.map(|h| h.state),
            cargo: unit.hauler.map(|h| h.cargo),
            building: unit.constructor.is_some_and(|c| c.is_busy()),
        }
    }
}

/// A unit order in production.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    /// What is being produced.
    pub kind: UnitKind,
    /// Seconds left.
    #[serde(with = "decimal_serde")]
    pub time_left: Fixed,
}

impl From<&ProductionOrder> for OrderView {
    fn from(order: &ProductionOrder) -> Self {
        Self {
            kind: order.kind,
            time_left: order.time_left,
        }
    }
}

/// A building as seen from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingView {
    /// Handle.
    pub id: EntityId,
    /// Kind tag.
    pub kind: BuildingKind,
    /// Owning side.
    pub faction: FactionId,
    /// Centre.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Construction progress in `[0, 1]`.
    #[serde(with = "decimal_serde")]
    pub progress: Fixed,
    /// Whether construction has finished.
    pub complete: bool,
    /// Orders waiting behind the current one.
    pub queue_len: usize,
    /// Order in production, if any.
    pub current: Option<OrderView>,
}

impl From<&Building> for BuildingView {
    fn from(building: &Building) -> Self {
        let queue = building.production.as_ref();
        Self {
            id: building.id,
            kind: building.kind,
            faction: building.faction,
            position: building.position,
            hp: building.health.current,
            max_hp: building.health.max,
            progress: building.construction.progress(),
            complete: building.is_complete(),
            queue_len: queue.map_or(0, |q| q.len()),
            current: queue.and_then(|q| q.current()).map(OrderView::from),
        }
    }
}

/// A mine as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MineView {
    /// Handle.
    pub id: EntityId,
    /// Position.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Lifecycle state.
    pub state: MineState,
    /// Whether a sweeper is working on it.
    pub being_disarmed: bool,
}

/// A projectile as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    /// Handle.
    pub id: EntityId,
    /// Position.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Side that fired it.
    pub faction: FactionId,
    /// Bound target.
    pub target: ProjectileTarget,
}

impl From<&Projectile> for ProjectileView {
    fn from(projectile: &Projectile) -> Self {
        Self {
            id: projectile.id,
            position: projectile.position,
            faction: projectile.faction,
            target: projectile.target,
        }
    }
}

/// A resource pile as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileView {
    /// Handle.
    pub id: EntityId,
    /// Centre.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Stock left.
    pub stock: u32,
}

impl From<&ResourcePile> for PileView {
    fn from(pile: &ResourcePile) -> Self {
        Self {
            id: pile.id,
            position: pile.position,
            stock: pile.stock,
        }
    }
}

/// Copy of the observable world state at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks run so far.
    pub tick: u64,
    /// Simulated seconds so far.
    #[serde(with = "decimal_serde")]
    pub elapsed: Fixed,
    /// Ledger balance.
    pub balance: u32,
    /// Match status.
    pub status: GameStatus,
    /// Hash of the full internal state.
    pub state_hash: u64,
    /// Live units, by id.
    pub units: Vec<UnitView>,
    /// Live buildings, by id.
    pub buildings: Vec<BuildingView>,
    /// Mines still in the world, by id.
    pub mines: Vec<MineView>,
    /// Projectiles in flight, by id.
    pub projectiles: Vec<ProjectileView>,
    /// Piles with stock left, by id.
    pub piles: Vec<PileView>,
}

impl Snapshot {
    /// Capture the current state of `sim`.
    #[must_use]
    pub fn capture(sim: &Simulation) -> Self {
        let jobs = sim.disarm_jobs();
        Self {
            tick: sim.tick_count(),
            elapsed: sim.elapsed(),
            balance: sim.ledger().balance(),
            status: sim.status(),
            state_hash: sim.state_hash(),
            units: sim.units().values().map(UnitView::from).collect(),
            buildings: sim.buildings().values().map(BuildingView::from).collect(),
            mines: sim
                .mines()
                .values()
                .map(|mine: &Mine| MineView {
                    id: mine.id,
                    position: mine.position,
                    state: mine.state(),
                    being_disarmed: jobs.for_mine(mine.id).is_some(),
                })
                .collect(),
            projectiles: sim.projectiles().values().map(ProjectileView::from).collect(),
            piles: sim.piles().values().map(PileView::from).collect(),
        }
    }

    /// Look up a unit view by id.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&UnitView> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Look up a building view by id.
    #[must_use]
    pub fn building(&self, id: EntityId) -> Option<&BuildingView> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Count live units of a faction.
    #[must_use]
    pub fn unit_count(&self, faction: FactionId) -> usize {
        self.units.iter().filter(|u| u.faction == faction).count()
    }
}
