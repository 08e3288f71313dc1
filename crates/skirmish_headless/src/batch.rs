//! Batch runner for seed sweeps.
//!
//! Plays one scenario against a range of generator seeds in parallel using
//! rayon and aggregates the outcomes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_core::prelude::*;
use tracing::{debug, info};

use crate::metrics::BatchSummary;
use crate::runner::{HeadlessRunner, RunOptions, RunReport};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario file the batch was built from, for the record
    pub scenario_path: Option<PathBuf>,
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Starting seed; game `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Stop each game once decided
    pub stop_when_decided: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario_path: None,
            game_count: 16,
            parallel_games: 0,
            seed_start: 0,
            stop_when_decided: true,
        }
    }
}

impl BatchConfig {
    /// Config for `game_count` games
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set parallelism
    pub fn with_parallel(mut self, parallel: u32) -> Self {
        self.parallel_games = parallel;
        self
    }

    /// Record the source scenario file
    pub fn with_scenario_path(mut self, path: PathBuf) -> Self {
        self.scenario_path = Some(path);
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Scenario name
    pub scenario: String,
    /// Individual game reports, in seed order
    pub games: Vec<RunReport>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run `scenario` once per seed in the configured range.
///
/// Each game regenerates its world from its own seed, so an explicit world
/// in the scenario is ignored here.
pub fn run_batch(scenario: &Scenario, sim_config: SimConfig, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        "Starting batch run: {} games of '{}' from seed {}",
        config.game_count, scenario.name, config.seed_start
    );

    let runner = HeadlessRunner::new(sim_config).with_options(RunOptions {
        stop_when_decided: config.stop_when_decided,
        include_snapshot: false,
    });

    let play = |i: u32| {
        let seed = config.seed_start.wrapping_add(u64::from(i));
        let game = Scenario {
            seed,
            world: None,
            ..scenario.clone()
        };
        let report = runner.run(&game);
        debug!(game = i, seed, status = ?report.status, "Game finished");
        report
    };

    let games: Vec<RunReport> = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(|| (0..config.game_count).into_par_iter().map(play).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not build thread pool, using the global one");
                (0..config.game_count).into_par_iter().map(play).collect()
            }
        }
    } else {
        (0..config.game_count).into_par_iter().map(play).collect()
    };

    let summary = BatchSummary::from_reports(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({} victories, {} defeats, {} undecided)",
        games.len(),
        duration_seconds,
        summary.victories,
        summary.defeats,
        summary.undecided
    );

    BatchResults {
        config,
        scenario: scenario.name.clone(),
        games,
        summary,
        duration_seconds,
    }
}
