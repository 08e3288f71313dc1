//! Headless skirmish runner.
//!
//! # Usage
//!
//! ```bash
//! # Play one scenario
//! cargo run -p skirmish_headless -- run --scenario opening.ron --snapshot
//!
//! # Sweep seeds in parallel
//! cargo run -p skirmish_headless -- batch --scenario opening.ron --count 1000 --output results/batch.json
//!
//! # Dump a generated world
//! cargo run -p skirmish_headless -- generate --seed 42
//! ```
//!
//! JSON and RON output go to stdout (or `--output`); logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_core::prelude::*;
use skirmish_core::world_gen;
use skirmish_headless::{
    batch::{run_batch, BatchConfig},
    runner::{self, HeadlessRunner, RunOptions},
    HeadlessError, Result,
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless skirmish runner for scenario playback and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Tuning overrides (RON); defaults fill anything left out
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single scenario and print its report
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Starting world (RON), overriding the scenario's own
        #[arg(short, long)]
        world: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the final snapshot in the report
        #[arg(long)]
        snapshot: bool,

        /// Stop as soon as the match is decided
        #[arg(long)]
        stop_when_decided: bool,
    },

    /// Run a scenario across a range of generated worlds
    Batch {
        /// Scenario to run
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of games to run
        #[arg(short = 'n', long, default_value = "16")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output file for results
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,
    },

    /// Print the generated starting world for a seed as RON
    Generate {
        /// Generator seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Write the world here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries reports. RUST_LOG wins when set.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = load_sim_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Run {
            scenario,
            world,
            output,
            snapshot,
            stop_when_decided,
        } => cmd_run(
            config,
            &scenario,
            world.as_deref(),
            output.as_deref(),
            RunOptions {
                stop_when_decided,
                include_snapshot: snapshot,
            },
        ),
        Commands::Batch {
            scenario,
            count,
            parallel,
            seed,
            output,
        } => cmd_batch(config, scenario, count, parallel, seed, &output),
        Commands::Generate { seed, output } => cmd_generate(&config, seed, output.as_deref()),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Headless run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_sim_config(path: Option<&Path>) -> Result<SimConfig> {
    match path {
        Some(path) => {
            let config = runner::load_config(path)?;
            tracing::info!(path = %path.display(), "Loaded config");
            Ok(config)
        }
        None => Ok(SimConfig::default()),
    }
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), "Wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Play one scenario
fn cmd_run(
    config: SimConfig,
    scenario_path: &Path,
    world_path: Option<&Path>,
    output: Option<&Path>,
    options: RunOptions,
) -> Result<()> {
    let scenario = runner::load_scenario(scenario_path)?;
    let headless = HeadlessRunner::new(config).with_options(options);

    let report = match world_path {
        Some(path) => {
            let world = runner::load_world(path)?;
            headless.run_from(&scenario, Simulation::from_seed(config, &world))
        }
        None => headless.run(&scenario),
    };

    emit(&serde_json::to_string_pretty(&report)?, output)
}

/// Sweep seeds
fn cmd_batch(
    config: SimConfig,
    scenario_path: PathBuf,
    count: u32,
    parallel: u32,
    seed: u64,
    output: &Path,
) -> Result<()> {
    let scenario = runner::load_scenario(&scenario_path)?;
    tracing::info!(
        scenario = %scenario.name,
        count,
        parallel,
        seed,
        output = %output.display(),
        "Batch configuration"
    );

    let batch = BatchConfig::new(count)
        .with_seed(seed)
        .with_parallel(parallel)
        .with_scenario_path(scenario_path);
    let results = run_batch(&scenario, config, batch);
    results.save(output).map_err(HeadlessError::Io)?;

    println!("{}", serde_json::to_string_pretty(&results.summary)?);
    Ok(())
}

/// Dump a generated world
fn cmd_generate(config: &SimConfig, seed: u64, output: Option<&Path>) -> Result<()> {
    let world = world_gen::generate(seed, config);
    tracing::info!(
        seed,
        units = world.units.len(),
        buildings = world.buildings.len(),
        mines = world.mines.len(),
        piles = world.piles.len(),
        "Generated world"
    );
    emit(&runner::world_to_ron(&world)?, output)
}
