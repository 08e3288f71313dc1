//! Starting worlds and scripted scenarios.
//!
//! A [`WorldSeed`] lists what exists at tick zero. A [`Scenario`] wraps a
//! seed (or a generator seed), a tick budget and a schedule of commands,
//! and is what the headless runner loads from RON:
//!
//! ```
//! use skirmish_core::scenario::Scenario;
//!
//! let text = r#"(
//!     name: "tiny",
//!     seed: 7,
//!     ticks: 20,
//!     world: Some((
//!         units: [(kind: Soldier, faction: Player, position: (100.0, 100.0))],
//!         buildings: [(kind: Hq, faction: Player, position: (300.0, 300.0))],
//!     )),
//! )"#;
//! let scenario = Scenario::from_ron_str(text).unwrap();
//! assert_eq!(scenario.ticks, 20);
//! ```

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::commands::ScheduledCommand;
use crate::config::SimConfig;
use crate::error::{GameError, Result};
use crate::factions::FactionId;
use crate::math::{decimal_path_serde, decimal_serde, decimal_vec_serde, Fixed, Vec2Fixed};
use crate::units::UnitKind;
use crate::world_gen;

/// A unit present at the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpawn {
    /// Kind tag.
    pub kind: UnitKind,
    /// Owning side.
    pub faction: FactionId,
    /// Starting position.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Never moves.
    #[serde(default)]
    pub stationary: bool,
    /// Hit point override.
    #[serde(default)]
    pub hp: Option<u32>,
    /// Patrol waypoints, looped.
    #[serde(default, with = "decimal_path_serde", skip_serializing_if = "Vec::is_empty")]
    pub route: Vec<Vec2Fixed>,
}

impl UnitSpawn {
    /// A mobile unit at full stat-table health.
    #[must_use]
    pub fn new(kind: UnitKind, faction: FactionId, position: Vec2Fixed) -> Self {
        Self {
            kind,
            faction,
            position,
            stationary: false,
            hp: None,
            route: Vec::new(),
        }
    }

    /// Pin the unit in place.
    #[must_use]
    pub fn stationary(mut self) -> Self {
        self.stationary = true;
        self
    }
}

fn complete_by_default() -> bool {
    true
}

/// A building present at the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpawn {
    /// Kind tag.
    pub kind: BuildingKind,
    /// Owning side.
    pub faction: FactionId,
    /// Footprint centre.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Starts finished unless set to false.
    #[serde(default = "complete_by_default")]
    pub complete: bool,
}

/// A mine present at the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineSpawn {
    /// Position.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Owning side, if any.
    #[serde(default)]
    pub owner: Option<FactionId>,
}

/// A resource pile present at the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileSpawn {
    /// Centre.
    #[serde(with = "decimal_vec_serde")]
    pub position: Vec2Fixed,
    /// Starting stock.
    pub stock: u32,
}

/// Everything placed at tick zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSeed {
    /// Units.
    pub units: Vec<UnitSpawn>,
    /// Buildings.
    pub buildings: Vec<BuildingSpawn>,
    /// Mines.
    pub mines: Vec<MineSpawn>,
    /// Resource piles.
    pub piles: Vec<PileSpawn>,
}

impl WorldSeed {
    /// Total number of placements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len() + self.buildings.len() + self.mines.len() + self.piles.len()
    }

    /// Check if nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn default_dt() -> Fixed {
    crate::simulation::tick_dt()
}

/// A scripted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name.
    pub name: String,
    /// Generator seed, used when no explicit world is given.
    #[serde(default)]
    pub seed: u64,
    /// Explicit starting world.
    #[serde(default)]
    pub world: Option<WorldSeed>,
    /// Ticks to run.
    pub ticks: u64,
    /// Seconds per tick.
    #[serde(default = "default_dt", with = "decimal_serde")]
    pub dt: Fixed,
    /// Commands to issue, by tick.
    #[serde(default)]
    pub commands: Vec<ScheduledCommand>,
}

impl Scenario {
    /// Parse a scenario from RON.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let scenario: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            what: "scenario",
            message: e.to_string(),
        })?;
        if scenario.dt <= Fixed::ZERO {
            return Err(GameError::InvalidConfig(format!(
                "scenario '{}' has a non-positive dt",
                scenario.name
            )));
        }
        Ok(scenario)
    }

    /// The starting world: the explicit one, or a generated one.
    #[must_use]
    pub fn world_seed(&self, config: &SimConfig) -> WorldSeed {
        match &self.world {
            Some(world) => world.clone(),
            None => world_gen::generate(self.seed, config),
        }
    }

    /// Commands due at `tick`, in file order.
    pub fn commands_at(&self, tick: u64) -> impl Iterator<Item = &crate::commands::Command> {
        self.commands
            .iter()
            .filter(move |c| c.tick == tick)
            .map(|c| &c.command)
    }
}
