//! The player's resource ledger.
//!
//! Every credit and debit in the simulation goes through [`Ledger::add`] and
//! [`Ledger::try_spend`]. The balance is unsigned, so it cannot go negative.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Shared spend/add counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ledger {
    balance: u32,
}

impl Ledger {
    /// Ledger with an opening balance.
    #[must_use]
    pub const fn new(balance: u32) -> Self {
        Self { balance }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Check if the balance covers `amount`.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        self.balance >= amount
    }

    /// Unconditional credit.
    pub fn add(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Debit `amount` if the balance covers it.
    ///
    /// Returns true if the debit happened. A failed call leaves the balance
    /// untouched.
    pub fn try_spend(&mut self, amount: u32) -> bool {
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                true
            }
            None => false,
        }
    }
}

/// Passive income accumulator carried by player depots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IncomeTimer {
    #[serde(with = "fixed_serde")]
    accumulated: Fixed,
}

impl IncomeTimer {
    /// Add `dt` of elapsed time and return how many payouts fell due.
    pub fn accrue(&mut self, dt: Fixed, interval: Fixed) -> u32 {
        self.accumulated += dt;
        let mut payouts = 0;
        while self.accumulated >= interval {
            self.accumulated -= interval;
            payouts += 1;
        }
        payouts
    }
}
