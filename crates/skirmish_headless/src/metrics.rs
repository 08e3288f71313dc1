//! Run metrics for scenario playback and batch analysis.
//!
//! [`RunMetrics`] tallies the event stream of one run; [`BatchSummary`]
//! aggregates many of them.

use serde::{Deserialize, Serialize};
use skirmish_core::prelude::*;

/// Event tallies over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Units that left a production queue.
    pub units_produced: u32,
    /// Foundations laid by constructors.
    pub builds_started: u32,
    /// Constructor orders that ended without a foundation.
    pub builds_cancelled: u32,
    /// Structures that finished construction.
    pub structures_completed: u32,
    /// Mines that went off.
    pub mines_detonated: u32,
    /// Mines made safe by sweepers or player defenses.
    pub mines_disarmed: u32,
    /// Projectiles launched by either side.
    pub shots_fired: u32,
    /// Player units lost.
    pub player_units_lost: u32,
    /// Enemy units lost.
    pub enemy_units_lost: u32,
    /// Buildings destroyed on either side.
    pub buildings_destroyed: u32,
    /// Commands turned down.
    pub rejections: u32,
    /// Everything credited to the ledger.
    pub income: u64,
    /// Everything debited from the ledger.
    pub spent: u64,
}

impl RunMetrics {
    /// Fold one tick's report into the tallies.
    pub fn record(&mut self, report: &TickEvents) {
        self.rejections += report.rejections.len() as u32;
        for event in &report.events {
            match *event {
                GameEvent::ProductionStarted { cost, .. } => self.spent += u64::from(cost),
                GameEvent::UnitProduced { .. } => self.units_produced += 1,
                GameEvent::BuildStarted { cost, .. } => {
                    self.builds_started += 1;
                    self.spent += u64::from(cost);
                }
                GameEvent::BuildCancelled { .. } => self.builds_cancelled += 1,
                GameEvent::StructureCompleted { .. } => self.structures_completed += 1,
                GameEvent::DepotIncome { amount, .. }
                | GameEvent::Haul(HaulEvent::Delivered { amount, .. }) => {
                    self.income += u64::from(amount);
                }
                GameEvent::Haul(HaulEvent::PileExhausted { .. }) => {}
                GameEvent::Mine(MineEvent::Detonated { .. }) => self.mines_detonated += 1,
                GameEvent::Mine(
                    MineEvent::Disarmed { reward, .. } | MineEvent::ClearedByDefense { reward, .. },
                ) => {
                    self.mines_disarmed += 1;
                    self.income += u64::from(reward);
                }
                GameEvent::Mine(_) => {}
                GameEvent::Combat(CombatEvent::Fired { .. }) => self.shots_fired += 1,
                GameEvent::Combat(CombatEvent::Destroyed { bounty, .. }) => {
                    self.income += u64::from(bounty);
                }
                GameEvent::Combat(_) => {}
                GameEvent::UnitDestroyed { faction, .. } => match faction {
                    FactionId::Player => self.player_units_lost += 1,
                    FactionId::Enemy => self.enemy_units_lost += 1,
                },
                GameEvent::BuildingDestroyed { .. } => self.buildings_destroyed += 1,
                GameEvent::StatusChanged(_) => {}
            }
        }
    }
}

/// Aggregate over a batch of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Runs that completed.
    pub total_games: u32,
    /// Runs that ended in victory.
    pub victories: u32,
    /// Runs that ended in defeat.
    pub defeats: u32,
    /// Runs still undecided at the tick limit.
    pub undecided: u32,
    /// Mean tick of the deciding event, over decided runs.
    pub avg_decided_tick: Option<f64>,
    /// Mean final ledger balance.
    pub avg_final_balance: f64,
    /// Mean mines detonated per run.
    pub avg_mines_detonated: f64,
    /// Mean units produced per run.
    pub avg_units_produced: f64,
}

impl BatchSummary {
    /// Summarize a set of run reports.
    pub fn from_reports(reports: &[crate::runner::RunReport]) -> Self {
        let total = reports.len();
        if total == 0 {
            return Self::default();
        }
        let count = |status: GameStatus| reports.iter().filter(|r| r.status == status).count() as u32;
        let mean = |f: &dyn Fn(&crate::runner::RunReport) -> f64| {
            reports.iter().map(f).sum::<f64>() / total as f64
        };

        let decided: Vec<u64> = reports.iter().filter_map(|r| r.decided_at).collect();
        let avg_decided_tick = if decided.is_empty() {
            None
        } else {
            Some(decided.iter().sum::<u64>() as f64 / decided.len() as f64)
        };

        Self {
            total_games: total as u32,
            victories: count(GameStatus::Victory),
            defeats: count(GameStatus::Defeat),
            undecided: count(GameStatus::Running),
            avg_decided_tick,
            avg_final_balance: mean(&|r| f64::from(r.final_balance)),
            avg_mines_detonated: mean(&|r| f64::from(r.metrics.mines_detonated)),
            avg_units_produced: mean(&|r| f64::from(r.metrics.units_produced)),
        }
    }
}
