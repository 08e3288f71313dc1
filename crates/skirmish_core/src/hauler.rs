//! Truck hauling state machine.
//!
//! A truck with an assigned pile shuttles between the pile and its storage
//! anchor (a complete friendly depot):
//!
//! ```text
//! Idle -> ToPile -> Harvesting -> ToStorage -> (deposit) -> ToPile ...
//!                              \-> WaitingStorage -(anchor set)-> ToStorage
//! ```
//!
//! Harvesting accumulates fractional progress so the integer stock of a pile
//! is never over-drawn, and cargo never exceeds capacity.

use serde::{Deserialize, Serialize};

use crate::buildings::Building;
use crate::components::{Arena, EntityId, Movement};
use crate::config::HaulerConfig;
use crate::factions::FactionId;
use crate::ledger::Ledger;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::piles::ResourcePile;
use crate::units::Unit;

/// Where a truck is in its haul cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HaulerState {
    /// No work.
    #[default]
    Idle,
    /// Driving to the assigned pile.
    ToPile,
    /// Loading at the pile.
    Harvesting,
    /// Driving to the storage anchor with cargo.
    ToStorage,
    /// Loaded, but no depot is available.
    WaitingStorage,
}

/// Something a truck did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaulEvent {
    /// Cargo delivered to a depot and credited.
    Delivered {
        /// The truck.
        truck: EntityId,
        /// The receiving depot.
        depot: EntityId,
        /// Amount credited.
        amount: u32,
    },
    /// The truck took the last of a pile.
    PileExhausted {
        /// The truck.
        truck: EntityId,
        /// The emptied pile.
        pile: EntityId,
    },
}

/// Hauling capability of a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hauler {
    /// Current state.
    pub state: HaulerState,
    /// Assigned pile.
    pub pile: Option<EntityId>,
    /// Depot that receives deliveries.
    pub anchor: Option<EntityId>,
    /// Cargo on board.
    pub cargo: u32,
    /// Maximum cargo.
    pub capacity: u32,
    #[serde(with = "fixed_serde")]
    harvest_rate: Fixed,
    #[serde(with = "fixed_serde")]
    storage_radius: Fixed,
    /// Fraction of a unit gathered but not yet loaded.
    #[serde(with = "fixed_serde")]
    progress: Fixed,
}

impl Hauler {
    /// Empty, idle truck.
    #[must_use]
    pub fn new(config: &HaulerConfig) -> Self {
        Self {
            state: HaulerState::Idle,
            pile: None,
            anchor: None,
            cargo: 0,
            capacity: config.capacity,
            harvest_rate: config.harvest_rate,
            storage_radius: config.storage_radius,
            progress: Fixed::ZERO,
        }
    }

    /// Check if the cargo hold is full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cargo >= self.capacity
    }

    /// Assign (or clear) the pile to work.
    ///
    /// The caller re-steers with [`Hauler::steer`] afterwards.
    pub fn assign_pile(&mut self, pile: Option<EntityId>) {
        self.pile = pile;
        self.progress = Fixed::ZERO;
        if pile.is_some() {
            if self.is_full() {
                self.decide_after_harvest();
            } else {
                self.state = HaulerState::ToPile;
            }
        } else if self.cargo > 0 {
            self.decide_after_harvest();
        } else {
            self.state = HaulerState::Idle;
        }
    }

    /// Hand control back to the player. Cargo is kept.
    pub fn release(&mut self) {
        self.pile = None;
        self.progress = Fixed::ZERO;
        self.state = HaulerState::Idle;
    }

    /// Set (or clear) the storage anchor.
    ///
    /// A loaded truck waiting for storage leaves for the new anchor right
    /// away; a truck heading for a cleared anchor goes back to waiting.
    pub fn set_storage_anchor(&mut self, anchor: Option<EntityId>) {
        self.anchor = anchor;
        match (anchor, self.state) {
            (Some(_), HaulerState::WaitingStorage) if self.cargo > 0 => {
                self.state = HaulerState::ToStorage;
            }
            (None, HaulerState::ToStorage) => self.state = HaulerState::WaitingStorage,
            _ => {}
        }
    }

    fn decide_after_harvest(&mut self) {
        self.state = if self.anchor.is_some() {
            HaulerState::ToStorage
        } else {
            HaulerState::WaitingStorage
        };
    }

    fn lose_pile(&mut self) {
        self.pile = None;
        self.progress = Fixed::ZERO;
        if self.cargo > 0 {
            self.decide_after_harvest();
        } else {
            self.state = HaulerState::Idle;
        }
    }

    /// Point the truck's movement at whatever its state calls for.
    pub fn steer(
        &self,
        movement: &mut Movement,
        piles: &Arena<ResourcePile>,
        buildings: &Arena<Building>,
    ) {
        match self.state {
            HaulerState::ToPile => {
                if let Some(pile) = self.pile.and_then(|id| piles.get(id)) {
                    movement.move_to(pile.position);
                }
            }
            HaulerState::ToStorage => {
                if let Some(depot) = self.anchor.and_then(|id| buildings.get(id)) {
                    movement.move_to(depot.position);
                }
            }
            HaulerState::Harvesting => movement.stop(),
            HaulerState::Idle | HaulerState::WaitingStorage => {}
        }
    }

    /// Load from `pile` for `dt` seconds.
    ///
    /// Returns true if the pile ran out.
    fn harvest(&mut self, pile: &mut ResourcePile, dt: Fixed) -> bool {
        self.progress += self.harvest_rate * dt;
        let whole: u32 = self.progress.to_num();
        let room = self.capacity.saturating_sub(self.cargo);
        self.cargo += pile.take(whole.min(room));
        self.progress -= Fixed::from_num(whole);
        pile.is_depleted()
    }

    fn update(
        &mut self,
        truck: EntityId,
        faction: FactionId,
        position: Vec2Fixed,
        piles: &mut Arena<ResourcePile>,
        buildings: &Arena<Building>,
        ledger: &mut Ledger,
        dt: Fixed,
        events: &mut Vec<HaulEvent>,
    ) {
        match self.state {
            HaulerState::Idle => {
                if self.pile.is_some() {
                    if self.is_full() {
                        self.decide_after_harvest();
                    } else {
                        self.state = HaulerState::ToPile;
                    }
                }
            }

            HaulerState::ToPile => match self.pile.and_then(|id| piles.get(id)) {
                Some(pile) if position.within(pile.position, pile.radius) => {
                    self.state = HaulerState::Harvesting;
                }
                Some(_) => {}
                None => self.lose_pile(),
            },

            HaulerState::Harvesting => {
                let Some((pile_id, pile)) = self
                    .pile
                    .and_then(|id| piles.get_mut(id).map(|pile| (id, pile)))
                else {
                    self.lose_pile();
                    return;
                };

                let exhausted = self.harvest(pile, dt);
                if exhausted {
                    events.push(HaulEvent::PileExhausted {
                        truck,
                        pile: pile_id,
                    });
                    self.lose_pile();
                } else if self.is_full() {
                    self.progress = Fixed::ZERO;
                    self.decide_after_harvest();
                }
            }

            HaulerState::ToStorage => {
                let anchor = self
                    .anchor
                    .and_then(|id| buildings.get(id))
                    .filter(|depot| depot.is_storage_for(faction));
                let Some(depot) = anchor else {
                    // Anchor gone: fall back to another depot, or wait.
                    let fallback = nearest_storage(buildings, faction, position);
                    self.set_storage_anchor(fallback);
                    return;
                };

                if position.within(depot.position, self.storage_radius) {
                    let amount = self.cargo;
                    ledger.add(amount);
                    self.cargo = 0;
                    events.push(HaulEvent::Delivered {
                        truck,
                        depot: depot.id,
                        amount,
                    });
                    self.state = if self.pile.is_some() {
                        HaulerState::ToPile
                    } else {
                        HaulerState::Idle
                    };
                }
            }

            // Leaves only through `set_storage_anchor`.
            HaulerState::WaitingStorage => {}
        }
    }
}

/// Nearest complete depot of `faction`, ties to the lowest id.
#[must_use]
pub fn nearest_storage(
    buildings: &Arena<Building>,
    faction: FactionId,
    from: Vec2Fixed,
) -> Option<EntityId> {
    let mut best: Option<(EntityId, Fixed)> = None;
    for (id, building) in buildings.iter() {
        if !building.is_storage_for(faction) {
            continue;
        }
        let d2 = from.distance_squared(building.position);
        if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
            best = Some((id, d2));
        }
    }
    best.map(|(id, _)| id)
}

/// Run every truck's state machine for one tick.
pub fn hauler_system(
    units: &mut Arena<Unit>,
    piles: &mut Arena<ResourcePile>,
    buildings: &Arena<Building>,
    ledger: &mut Ledger,
    dt: Fixed,
) -> Vec<HaulEvent> {
    let mut events = Vec::new();

    for (id, unit) in units.iter_mut() {
        if !unit.is_alive() {
            continue;
        }
        let Some(hauler) = unit.hauler.as_mut() else {
            continue;
        };
        hauler.update(
            id,
            unit.faction,
            unit.position,
            piles,
            buildings,
            ledger,
            dt,
            &mut events,
        );
        hauler.steer(&mut unit.movement, piles, buildings);
    }

    events
}
