//! # Skirmish Core
//!
//! Deterministic tactical simulation core for Plastic Skirmish.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless runs and batch balancing
//! - Scripted scenarios
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`simulation`] - Core simulation loop
//! - [`commands`], [`events`], [`snapshot`] - What goes in and what comes out
//! - [`ledger`], [`production`], [`construction`] - Economy and build orders
//! - [`hauler`], [`piles`] - Resource trucks
//! - [`mines`] - Mines and disarm jobs
//! - [`combat`] - Targeting and projectiles
//! - [`scenario`], [`world_gen`], [`config`] - Starting worlds and tuning
//! - [`math`], [`geometry`] - Fixed-point math and shapes

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buildings;
pub mod combat;
pub mod commands;
pub mod components;
pub mod config;
pub mod construction;
pub mod error;
pub mod events;
pub mod factions;
pub mod geometry;
pub mod hauler;
pub mod ledger;
pub mod math;
pub mod mines;
pub mod piles;
pub mod production;
pub mod scenario;
pub mod simulation;
pub mod snapshot;
pub mod units;
pub mod world_gen;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{Building, BuildingKind};
    pub use crate::combat::{CombatEvent, Projectile, ProjectileTarget};
    pub use crate::commands::{Command, ScheduledCommand};
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::error::{CommandRejection, GameError, Result};
    pub use crate::events::{GameEvent, GameStatus, Rejection, TickEvents};
    pub use crate::factions::FactionId;
    pub use crate::hauler::{HaulEvent, HaulerState};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::mines::{MineEvent, MineState};
    pub use crate::scenario::{Scenario, WorldSeed};
    pub use crate::simulation::{tick_dt, Simulation, TICK_RATE};
    pub use crate::snapshot::Snapshot;
    pub use crate::units::{Unit, UnitKind};
}
