//! Headless skirmish runner for scenario playback and CI verification.
//!
//! Plays RON scenarios through [`skirmish_core`] without any rendering and
//! reports the outcome as JSON:
//!
//! - **Scenario playback**: run one scripted scenario and summarize it
//! - **Seed sweeps**: run a scenario across many generated worlds in parallel
//! - **World generation**: dump a generated starting world as RON
//!
//! # Example
//!
//! ```bash
//! # Play a scenario, print the JSON report
//! cargo run -p skirmish_headless -- run --scenario scenarios/opening.ron
//!
//! # Sweep 100 seeds with custom tuning
//! cargo run -p skirmish_headless -- batch --scenario scenarios/opening.ron \
//!     --config tuning.ron --count 100 --output results/batch.json
//!
//! # Dump the world for seed 7
//! cargo run -p skirmish_headless -- generate --seed 7 > world.ron
//! ```
//!
//! Reports go to stdout; logs go to stderr.

pub mod batch;
pub mod error;
pub mod metrics;
pub mod runner;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use error::{HeadlessError, Result};
pub use metrics::{BatchSummary, RunMetrics};
pub use runner::{HeadlessRunner, RunOptions, RunReport};
