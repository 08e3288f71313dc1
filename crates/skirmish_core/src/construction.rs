//! Structure construction and constructor build orders.
//!
//! Structures move through [`ConstructionState`] once:
//! `NotStarted -> UnderConstruction -> Complete`. While under construction a
//! structure does not produce, earn, anchor trucks or fire.
//!
//! Constructors carry at most one [`BuildOrder`]. Placement is validated when
//! the order is given and again when the constructor arrives; funds are only
//! debited on arrival.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingKind};
use crate::components::{Arena, EntityId};
use crate::error::{CommandRejection, GameError, Result};
use crate::factions::FactionId;
use crate::geometry::{Footprint, MapBounds};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::piles::ResourcePile;

/// Construction lifecycle of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConstructionState {
    /// Placed but the timer has not been started.
    #[default]
    NotStarted,
    /// Timer running.
    UnderConstruction {
        /// Seconds spent so far.
        #[serde(with = "fixed_serde")]
        elapsed: Fixed,
        /// Seconds required.
        #[serde(with = "fixed_serde")]
        total: Fixed,
    },
    /// Finished. Terminal.
    Complete,
}

impl ConstructionState {
    /// Begin the build timer.
    pub fn start(&mut self, total: Fixed) -> Result<()> {
        match self {
            Self::NotStarted => {
                *self = Self::UnderConstruction {
                    elapsed: Fixed::ZERO,
                    total: total.max(Fixed::ZERO),
                };
                Ok(())
            }
            other => Err(GameError::InvalidState(format!(
                "construction already started: {other:?}"
            ))),
        }
    }

    /// Advance the timer. Returns true on the tick the structure completes.
    pub fn tick(&mut self, dt: Fixed) -> bool {
        let Self::UnderConstruction { elapsed, total } = self else {
            return false;
        };
        *elapsed += dt;
        if *total - *elapsed > Fixed::ZERO {
            return false;
        }
        *self = Self::Complete;
        true
    }

    /// Elapsed over total, clamped to `[0, 1]`.
    ///
    /// Anything not under construction reports 1.
    #[must_use]
    pub fn progress(&self) -> Fixed {
        match *self {
            Self::UnderConstruction { elapsed, total } if total > Fixed::ZERO => {
                (elapsed / total).clamp(Fixed::ZERO, Fixed::ONE)
            }
            _ => Fixed::ONE,
        }
    }

    /// Check if the structure is finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Check if the timer is running.
    #[must_use]
    pub fn is_under_construction(&self) -> bool {
        matches!(self, Self::UnderConstruction { .. })
    }
}

/// An outstanding order to erect a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildOrder {
    /// Structure to build.
    pub kind: BuildingKind,
    /// Centre of the structure.
    pub target: Vec2Fixed,
    /// Where the constructor stands to start building.
    pub approach: Vec2Fixed,
}

/// Build capability of a constructor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Constructor {
    /// The single outstanding order.
    pub order: Option<BuildOrder>,
}

impl Constructor {
    /// Check if an order is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.order.is_some()
    }

    /// Take on an order, unless one is already pending.
    pub fn assign(&mut self, order: BuildOrder) -> std::result::Result<(), CommandRejection> {
        if self.order.is_some() {
            return Err(CommandRejection::AlreadyPending);
        }
        self.order = Some(order);
        Ok(())
    }

    /// Drop the pending order, returning it.
    pub fn cancel(&mut self) -> Option<BuildOrder> {
        self.order.take()
    }
}

/// Check a candidate footprint against the map, structures and piles.
pub fn validate_placement(
    footprint: &Footprint,
    bounds: &MapBounds,
    buildings: &Arena<Building>,
    piles: &Arena<ResourcePile>,
) -> std::result::Result<(), CommandRejection> {
    // Centre first: extents of a far off-map footprint would overflow.
    if !bounds.contains(footprint.center()) || !bounds.contains_footprint(footprint) {
        return Err(CommandRejection::InvalidPlacement);
    }
    if buildings.values().any(|b| b.footprint.overlaps(footprint)) {
        return Err(CommandRejection::InvalidPlacement);
    }
    if piles.values().any(|p| p.footprint().overlaps(footprint)) {
        return Err(CommandRejection::InvalidPlacement);
    }
    Ok(())
}

/// A structure finished construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionNotice {
    /// The completed structure.
    pub building: EntityId,
    /// Its kind.
    pub kind: BuildingKind,
    /// Its owner.
    pub faction: FactionId,
}

/// Completion notices waiting to be handled this tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NotificationQueue {
    pending: VecDeque<CompletionNotice>,
}

impl NotificationQueue {
    /// Queue a notice.
    pub fn push(&mut self, notice: CompletionNotice) {
        self.pending.push_back(notice);
    }

    /// Take every queued notice in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = CompletionNotice> + '_ {
        self.pending.drain(..)
    }

    /// Check if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
