//! What a tick reports back.
//!
//! Systems return their own event enums; the simulation wraps them in
//! [`GameEvent`] in the order they happened and hands the lot to the caller
//! as [`TickEvents`].

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::combat::CombatEvent;
use crate::commands::Command;
use crate::components::EntityId;
use crate::error::CommandRejection;
use crate::factions::FactionId;
use crate::hauler::HaulEvent;
use crate::mines::MineEvent;
use crate::units::UnitKind;

/// Outcome of the match so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Still being played.
    #[default]
    Running,
    /// Every enemy building is gone.
    Victory,
    /// The player has no units and no buildings left.
    Defeat,
}

impl GameStatus {
    /// Whether the match has been decided.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// A single observable occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    /// A queued order was paid for and started.
    ProductionStarted {
        /// Producing building.
        building: EntityId,
        /// What is being built.
        kind: UnitKind,
        /// Amount debited.
        cost: u32,
    },
    /// A produced unit entered the world.
    UnitProduced {
        /// Producing building.
        building: EntityId,
        /// The new unit.
        unit: EntityId,
        /// Its kind.
        kind: UnitKind,
    },
    /// A constructor arrived, paid and laid a foundation.
    BuildStarted {
        /// The constructor.
        constructor: EntityId,
        /// The new structure.
        building: EntityId,
        /// Its kind.
        kind: BuildingKind,
        /// Amount debited.
        cost: u32,
    },
    /// A constructor arrived but could not build.
    BuildCancelled {
        /// The constructor.
        constructor: EntityId,
        /// What it meant to build.
        kind: BuildingKind,
    },
    /// A structure finished construction.
    StructureCompleted {
        /// The structure.
        building: EntityId,
        /// Its kind.
        kind: BuildingKind,
    },
    /// A depot paid out passive income.
    DepotIncome {
        /// The depot.
        depot: EntityId,
        /// Amount credited.
        amount: u32,
    },
    /// Hauling activity.
    Haul(HaulEvent),
    /// Mine and disarm activity.
    Mine(MineEvent),
    /// Firing and impacts.
    Combat(CombatEvent),
    /// A unit died and was removed.
    UnitDestroyed {
        /// The unit.
        unit: EntityId,
        /// Its kind.
        kind: UnitKind,
        /// Its side.
        faction: FactionId,
    },
    /// A building was destroyed and removed.
    BuildingDestroyed {
        /// The building.
        building: EntityId,
        /// Its kind.
        kind: BuildingKind,
        /// Its side.
        faction: FactionId,
    },
    /// The match was decided.
    StatusChanged(GameStatus),
}

/// A command that was not applied, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rejection {
    /// The rejected command.
    pub command: Command,
    /// Why it was rejected.
    pub reason: CommandRejection,
}

/// Everything a tick produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick number these events belong to.
    pub tick: u64,
    /// Commands that were turned down.
    pub rejections: Vec<Rejection>,
    /// Events in the order they happened.
    pub events: Vec<GameEvent>,
}

impl TickEvents {
    /// Number of units produced this tick.
    #[must_use]
    pub fn units_produced(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::UnitProduced { .. }))
            .count()
    }

    /// Mine events, in order.
    pub fn mine_events(&self) -> impl Iterator<Item = &MineEvent> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Mine(event) => Some(event),
            _ => None,
        })
    }

    /// Combat events, in order.
    pub fn combat_events(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Combat(event) => Some(event),
            _ => None,
        })
    }

    /// Whether any entity died this tick.
    #[must_use]
    pub fn has_deaths(&self) -> bool {
        self.events.iter().any(|e| {
            matches!(
                e,
                GameEvent::UnitDestroyed { .. } | GameEvent::BuildingDestroyed { .. }
            )
        })
    }
}
