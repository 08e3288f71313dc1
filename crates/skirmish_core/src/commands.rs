//! Player commands.
//!
//! Input handling is reduced to a stream of these. Each one is validated
//! and either applied or rejected during the tick it is passed to. Points
//! are written as decimal `(x, y)` pairs so scenario files stay readable.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::components::EntityId;
use crate::math::{decimal_vec_serde, Vec2Fixed};
use crate::units::UnitKind;

/// A discrete player instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Move a selection toward a point in formation.
    MoveTo {
        /// Selected units, in selection order.
        units: Vec<EntityId>,
        /// Formation anchor.
        #[serde(with = "decimal_vec_serde")]
        point: Vec2Fixed,
    },
    /// Send a truck to harvest a pile.
    AssignHaul {
        /// The truck.
        truck: EntityId,
        /// The pile.
        pile: EntityId,
    },
    /// Have an idle constructor put up a structure.
    OrderBuild {
        /// Structure kind.
        kind: BuildingKind,
        /// Footprint centre.
        #[serde(with = "decimal_vec_serde")]
        point: Vec2Fixed,
    },
    /// Append a unit order to a building's production queue.
    Enqueue {
        /// Producing building.
        building: EntityId,
        /// Unit to produce.
        kind: UnitKind,
    },
    /// Flip a sweeper's auto-disarm flag.
    ToggleAutoDisarm {
        /// The sweeper.
        sweeper: EntityId,
    },
}

impl Command {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move_to",
            Self::AssignHaul { .. } => "assign_haul",
            Self::OrderBuild { .. } => "order_build",
            Self::Enqueue { .. } => "enqueue",
            Self::ToggleAutoDisarm { .. } => "toggle_auto_disarm",
        }
    }
}

/// A command scheduled for a specific tick, as written in scenario files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledCommand {
    /// Tick at which the command is issued.
    pub tick: u64,
    /// The command.
    pub command: Command,
}
