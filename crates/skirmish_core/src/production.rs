//! Per-building unit production.
//!
//! A queue holds waiting orders and at most one active order. Orders are
//! accepted whatever the balance; funds are only checked, and debited, when
//! the head of the queue is promoted to active production. A promotion that
//! cannot be paid for is retried on the next tick.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::UnitTable;
use crate::ledger::Ledger;
use crate::math::{fixed_serde, Fixed};
use crate::units::UnitKind;

/// The order being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// What is being built.
    pub kind: UnitKind,
    /// Seconds until it is done.
    #[serde(with = "fixed_serde")]
    pub time_left: Fixed,
}

/// Production state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductionState {
    /// Nothing in production.
    #[default]
    Idle,
    /// An order has been paid for and is counting down.
    Producing(ProductionOrder),
}

/// What a call to [`ProductionQueue::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionStep {
    /// Nothing changed state.
    None,
    /// The head order was paid for and started.
    Promoted {
        /// Kind that started.
        kind: UnitKind,
        /// Amount debited.
        cost: u32,
    },
    /// The active order finished; the caller spawns the unit.
    Completed(UnitKind),
}

/// FIFO production queue owned by a building.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProductionQueue {
    waiting: VecDeque<UnitKind>,
    state: ProductionState,
}

impl ProductionQueue {
    /// Create a new empty production queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order. Never refused.
    pub fn enqueue(&mut self, kind: UnitKind) {
        self.waiting.push_back(kind);
    }

    /// Number of orders waiting behind the active one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    /// Check if no orders are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// The active order, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ProductionOrder> {
        match &self.state {
            ProductionState::Idle => None,
            ProductionState::Producing(order) => Some(order),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ProductionState {
        self.state
    }

    /// Waiting orders, head first.
    pub fn waiting(&self) -> impl Iterator<Item = UnitKind> + '_ {
        self.waiting.iter().copied()
    }

    /// Advance production by `dt`.
    ///
    /// An idle queue tries to pay for its head order; a tick that promotes
    /// does not also count down. An active order counts down and completes
    /// once its time is used up.
    pub fn tick(&mut self, dt: Fixed, ledger: &mut Ledger, stats: &UnitTable) -> ProductionStep {
        match &mut self.state {
            ProductionState::Idle => {
                let Some(&kind) = self.waiting.front() else {
                    return ProductionStep::None;
                };
                let unit = stats.get(kind);
                if !ledger.try_spend(unit.cost) {
                    return ProductionStep::None;
                }
                self.waiting.pop_front();
                self.state = ProductionState::Producing(ProductionOrder {
                    kind,
                    time_left: unit.build_time,
                });
                ProductionStep::Promoted {
                    kind,
                    cost: unit.cost,
                }
            }
            ProductionState::Producing(order) => {
                order.time_left -= dt;
                if order.time_left > Fixed::ZERO {
                    return ProductionStep::None;
                }
                let kind = order.kind;
                self.state = ProductionState::Idle;
                ProductionStep::Completed(kind)
            }
        }
    }
}
