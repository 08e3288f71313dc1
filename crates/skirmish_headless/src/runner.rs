//! Scenario playback.
//!
//! Loads a RON scenario (and optionally a RON config and world), steps the
//! simulation for the scenario's tick count, and condenses the run into a
//! serializable [`RunReport`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::prelude::*;
use tracing::{debug, info};

use crate::error::{HeadlessError, Result};
use crate::metrics::RunMetrics;

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(HeadlessError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Load a scenario from a RON file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    Ok(Scenario::from_ron_str(&read_file(path)?)?)
}

/// Load a (possibly partial) config from a RON file.
pub fn load_config(path: &Path) -> Result<SimConfig> {
    Ok(SimConfig::from_ron_str(&read_file(path)?)?)
}

/// Load a starting world, such as one written by `generate`.
pub fn load_world(path: &Path) -> Result<WorldSeed> {
    Ok(ron::from_str(&read_file(path)?)?)
}

/// Write a starting world as pretty RON.
pub fn world_to_ron(world: &WorldSeed) -> Result<String> {
    Ok(ron::ser::to_string_pretty(
        world,
        ron::ser::PrettyConfig::default(),
    )?)
}

/// Condensed outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Generator seed.
    pub seed: u64,
    /// Ticks actually run.
    pub ticks_run: u64,
    /// Final status.
    pub status: GameStatus,
    /// Tick on which the match was decided.
    pub decided_at: Option<u64>,
    /// Ledger balance at the end.
    pub final_balance: u32,
    /// State hash at the end.
    pub final_state_hash: u64,
    /// Event tallies.
    pub metrics: RunMetrics,
    /// Every rejection, with the tick it happened on.
    pub rejections: Vec<(u64, Rejection)>,
    /// Full world state at the end, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
}

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop as soon as the match is decided.
    pub stop_when_decided: bool,
    /// Attach the final snapshot to the report.
    pub include_snapshot: bool,
}

/// Steps scenarios through a simulation.
#[derive(Debug, Clone)]
pub struct HeadlessRunner {
    config: SimConfig,
    options: RunOptions,
}

impl HeadlessRunner {
    /// Runner using `config` for every run.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            options: RunOptions::default(),
        }
    }

    /// Replace the run options.
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Tuning used by this runner.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Play `scenario` to its tick count.
    pub fn run(&self, scenario: &Scenario) -> RunReport {
        let world = scenario.world_seed(&self.config);
        let sim = Simulation::from_seed(self.config, &world);
        self.run_from(scenario, sim)
    }

    /// Play `scenario`'s commands against an already populated simulation.
    pub fn run_from(&self, scenario: &Scenario, mut sim: Simulation) -> RunReport {
        info!(
            scenario = %scenario.name,
            seed = scenario.seed,
            ticks = scenario.ticks,
            "Starting run"
        );

        let mut metrics = RunMetrics::default();
        let mut rejections = Vec::new();
        let mut decided_at = None;

        for tick in 0..scenario.ticks {
            let commands: Vec<Command> = scenario.commands_at(tick).cloned().collect();
            let report = sim.tick(scenario.dt, &commands);
            metrics.record(&report);
            rejections.extend(report.rejections.iter().cloned().map(|r| (tick, r)));

            if decided_at.is_none() && sim.status().is_over() {
                decided_at = Some(tick);
                info!(tick, status = ?sim.status(), "Match decided");
                if self.options.stop_when_decided {
                    break;
                }
            }
        }

        debug!(
            produced = metrics.units_produced,
            detonated = metrics.mines_detonated,
            rejections = metrics.rejections,
            "Run tallies"
        );

        let report = RunReport {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            ticks_run: sim.tick_count(),
            status: sim.status(),
            decided_at,
            final_balance: sim.ledger().balance(),
            final_state_hash: sim.state_hash(),
            metrics,
            rejections,
            snapshot: self.options.include_snapshot.then(|| sim.snapshot()),
        };
        info!(
            ticks = report.ticks_run,
            status = ?report.status,
            balance = report.final_balance,
            hash = report.final_state_hash,
            "Run complete"
        );
        report
    }
}

impl Default for HeadlessRunner {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
