//! Simulation tuning.
//!
//! Every constant the systems consult lives in [`SimConfig`]. The defaults
//! are the canonical values; a RON file may override any subset of them.
//!
//! ```
//! use skirmish_core::config::SimConfig;
//!
//! let config = SimConfig::from_ron_str("(economy: (starting_funds: 500))").unwrap();
//! assert_eq!(config.economy.starting_funds, 500);
//! assert_eq!(config.hauler.capacity, 150);
//! ```

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::error::{GameError, Result};
use crate::geometry::{Circle, Footprint, MapBounds, Rect};
use crate::math::{decimal_serde, decimal_vec_serde, Fixed, Vec2Fixed};
use crate::units::UnitKind;

fn fx(value: f64) -> Fixed {
    Fixed::from_num(value)
}

/// Weapon numbers for a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatProfile {
    /// Damage per projectile.
    pub damage: u32,
    /// Engagement range.
    #[serde(with = "decimal_serde")]
    pub range: Fixed,
    /// Seconds between shots.
    #[serde(with = "decimal_serde")]
    pub cooldown: Fixed,
}

/// Stat block for one unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Ledger cost when produced.
    pub cost: u32,
    /// Seconds of production.
    #[serde(with = "decimal_serde")]
    pub build_time: Fixed,
    /// Maximum hit points.
    pub hp: u32,
    /// Movement speed per second.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,
    /// Collision radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
    /// Weapon, for kinds that fight.
    pub combat: Option<CombatProfile>,
}

/// Per-kind unit stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTable {
    /// Basic infantry.
    pub soldier: UnitStats,
    /// Heavy armour.
    pub tank: UnitStats,
    /// Resource hauler.
    pub truck: UnitStats,
    /// Mine sweeper.
    pub sweeper: UnitStats,
    /// Constructor.
    pub bulldozer: UnitStats,
    /// Enemy patrol infantry.
    pub patrol: UnitStats,
}

impl UnitTable {
    /// Stats for `kind`.
    #[must_use]
    pub fn get(&self, kind: UnitKind) -> &UnitStats {
        match kind {
            UnitKind::Soldier => &self.soldier,
            UnitKind::Tank => &self.tank,
            UnitKind::Truck => &self.truck,
            UnitKind::Sweeper => &self.sweeper,
            UnitKind::Bulldozer => &self.bulldozer,
            UnitKind::Patrol => &self.patrol,
        }
    }
}

impl Default for UnitTable {
    fn default() -> Self {
        let radius = fx(25.0);
        Self {
            soldier: UnitStats {
                cost: 30,
                build_time: fx(1.0),
                hp: 100,
                speed: fx(200.0),
                radius,
                combat: Some(CombatProfile {
                    damage: 10,
                    range: fx(200.0),
                    cooldown: fx(0.6),
                }),
            },
            tank: UnitStats {
                cost: 90,
                build_time: fx(1.6),
                hp: 220,
                speed: fx(140.0),
                radius,
                combat: Some(CombatProfile {
                    damage: 20,
                    range: fx(260.0),
                    cooldown: fx(1.1),
                }),
            },
            truck: UnitStats {
                cost: 50,
                build_time: fx(1.2),
                hp: 120,
                speed: fx(160.0),
                radius,
                combat: None,
            },
            sweeper: UnitStats {
                cost: 40,
                build_time: fx(1.2),
                hp: 80,
                speed: fx(180.0),
                radius,
                combat: None,
            },
            bulldozer: UnitStats {
                cost: 0,
                build_time: fx(0.0),
                hp: 150,
                speed: fx(150.0),
                radius,
                combat: None,
            },
            patrol: UnitStats {
                cost: 0,
                build_time: fx(0.0),
                hp: 100,
                speed: fx(120.0),
                radius,
                combat: Some(CombatProfile {
                    damage: 10,
                    range: fx(200.0),
                    cooldown: fx(0.6),
                }),
            },
        }
    }
}

/// Footprint dimensions, positioned at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FootprintShape {
    /// Axis-aligned rectangle.
    Rect {
        /// Full width.
        #[serde(with = "decimal_serde")]
        width: Fixed,
        /// Full height.
        #[serde(with = "decimal_serde")]
        height: Fixed,
    },
    /// Circle.
    Circle {
        /// Radius.
        #[serde(with = "decimal_serde")]
        radius: Fixed,
    },
}

impl FootprintShape {
    /// The footprint centred on `center`.
    #[must_use]
    pub fn at(&self, center: Vec2Fixed) -> Footprint {
        match *self {
            Self::Rect { width, height } => Footprint::Rect(Rect::centered(center, width, height)),
            Self::Circle { radius } => Footprint::Circle(Circle::new(center, radius)),
        }
    }
}

/// Weapon and arc numbers for a fixed defense.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfile {
    /// Damage per projectile.
    pub damage: u32,
    /// Engagement range.
    #[serde(with = "decimal_serde")]
    pub range: Fixed,
    /// Seconds between shots.
    #[serde(with = "decimal_serde")]
    pub cooldown: Fixed,
    /// Width of the firing arc in degrees.
    #[serde(with = "decimal_serde")]
    pub fov_degrees: Fixed,
}

/// Stat block for one building kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingStats {
    /// Ledger cost when placed by a constructor.
    pub cost: u32,
    /// Seconds of construction.
    #[serde(with = "decimal_serde")]
    pub build_time: Fixed,
    /// Maximum hit points.
    pub hp: u32,
    /// Occupied space.
    pub footprint: FootprintShape,
    /// Present on fixed defenses only.
    pub defense: Option<DefenseProfile>,
}

/// Per-kind building stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingTable {
    /// Headquarters.
    pub hq: BuildingStats,
    /// Storage depot.
    pub depot: BuildingStats,
    /// Vehicle garage.
    pub garage: BuildingStats,
    /// Fixed defense.
    pub fortin: BuildingStats,
}

impl BuildingTable {
    /// Stats for `kind`.
    #[must_use]
    pub fn get(&self, kind: BuildingKind) -> &BuildingStats {
        match kind {
            BuildingKind::Hq => &self.hq,
            BuildingKind::Depot => &self.depot,
            BuildingKind::Garage => &self.garage,
            BuildingKind::Fortin => &self.fortin,
        }
    }
}

impl Default for BuildingTable {
    fn default() -> Self {
        let block = FootprintShape::Rect {
            width: fx(80.0),
            height: fx(80.0),
        };
        Self {
            hq: BuildingStats {
                cost: 100,
                build_time: fx(5.0),
                hp: 300,
                footprint: block,
                defense: None,
            },
            depot: BuildingStats {
                cost: 50,
                build_time: fx(3.0),
                hp: 300,
                footprint: block,
                defense: None,
            },
            garage: BuildingStats {
                cost: 120,
                build_time: fx(5.0),
                hp: 300,
                footprint: block,
                defense: None,
            },
            fortin: BuildingStats {
                cost: 80,
                build_time: fx(4.0),
                hp: 150,
                footprint: FootprintShape::Circle { radius: fx(30.0) },
                defense: Some(DefenseProfile {
                    damage: 30,
                    range: fx(260.0),
                    cooldown: fx(0.8),
                    fov_degrees: fx(180.0),
                }),
            },
        }
    }
}

/// Mine and sweeper numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineConfig {
    /// Distance at which a unit sets a mine off.
    #[serde(with = "decimal_serde")]
    pub activation_radius: Fixed,
    /// Blast reach; never smaller than the activation radius.
    #[serde(with = "decimal_serde")]
    pub blast_radius: Fixed,
    /// Damage dealt to everything in the blast.
    pub damage: u32,
    /// Whether the owner's units may trigger and be hurt by owned mines.
    pub friendly_fire: bool,
    /// Seconds a sweeper needs to disarm a mine.
    #[serde(with = "decimal_serde")]
    pub disarm_time: Fixed,
    /// Distance at which a sweeper starts disarming.
    #[serde(with = "decimal_serde")]
    pub sweeper_disarm_radius: Fixed,
    /// Distance at which a player fixed defense clears a mine outright.
    #[serde(with = "decimal_serde")]
    pub defense_clear_radius: Fixed,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            activation_radius: fx(22.0),
            blast_radius: fx(28.0),
            damage: 150,
            friendly_fire: false,
            disarm_time: fx(2.0),
            sweeper_disarm_radius: fx(30.0),
            defense_clear_radius: fx(260.0),
        }
    }
}

/// Truck numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaulerConfig {
    /// Maximum cargo.
    pub capacity: u32,
    /// Cargo gathered per second of harvesting.
    #[serde(with = "decimal_serde")]
    pub harvest_rate: Fixed,
    /// Collection radius given to new resource piles.
    #[serde(with = "decimal_serde")]
    pub pile_radius: Fixed,
    /// Distance from the depot at which cargo is delivered.
    #[serde(with = "decimal_serde")]
    pub storage_radius: Fixed,
}

impl Default for HaulerConfig {
    fn default() -> Self {
        Self {
            capacity: 150,
            harvest_rate: fx(45.0),
            pile_radius: fx(32.0),
            storage_radius: fx(24.0),
        }
    }
}

/// Projectile numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Speed of shots aimed at units.
    #[serde(with = "decimal_serde")]
    pub speed_vs_units: Fixed,
    /// Speed of shots aimed at buildings.
    #[serde(with = "decimal_serde")]
    pub speed_vs_buildings: Fixed,
    /// Projectile radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
    /// Extra reach added to the radius for unit hits.
    #[serde(with = "decimal_serde")]
    pub hit_margin: Fixed,
    /// Seconds before an unresolved projectile is discarded.
    #[serde(with = "decimal_serde")]
    pub ttl: Fixed,
}

impl ProjectileConfig {
    /// Distance from a unit target that counts as a hit.
    #[must_use]
    pub fn hit_threshold(&self) -> Fixed {
        self.radius + self.hit_margin
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed_vs_units: fx(560.0),
            speed_vs_buildings: fx(540.0),
            radius: fx(4.0),
            hit_margin: fx(10.0),
            ttl: fx(3.0),
        }
    }
}

/// Ledger income and rewards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Opening balance.
    pub starting_funds: u32,
    /// Credit per completed player depot per interval.
    pub depot_income: u32,
    /// Seconds between depot payouts.
    #[serde(with = "decimal_serde")]
    pub depot_interval: Fixed,
    /// Credit for a completed disarm.
    pub disarm_reward: u32,
    /// Credit when player fire kills an enemy unit.
    pub unit_bounty: u32,
    /// Credit when player fire destroys an enemy building.
    pub building_bounty: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_funds: 200,
            depot_income: 5,
            depot_interval: fx(1.0),
            disarm_reward: 5,
            unit_bounty: 5,
            building_bounty: 20,
        }
    }
}

/// Constructor behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Distance from the approach point at which building starts.
    #[serde(with = "decimal_serde")]
    pub start_radius: Fixed,
    /// Gap between the footprint edge and the approach point.
    #[serde(with = "decimal_serde")]
    pub approach_gap: Fixed,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            start_radius: fx(12.0),
            approach_gap: fx(30.0),
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Playable area.
    pub map: MapBounds,
    /// Income and rewards.
    pub economy: EconomyConfig,
    /// Unit stat table.
    pub units: UnitTable,
    /// Building stat table.
    pub buildings: BuildingTable,
    /// Mine and sweeper numbers.
    pub mines: MineConfig,
    /// Truck numbers.
    pub hauler: HaulerConfig,
    /// Projectile numbers.
    pub projectiles: ProjectileConfig,
    /// Constructor behaviour.
    pub construction: ConstructionConfig,
    /// Where produced units appear, relative to the building centre.
    #[serde(with = "decimal_vec_serde")]
    pub spawn_offset: Vec2Fixed,
    /// Spacing of the move formation.
    #[serde(with = "decimal_serde")]
    pub formation_spacing: Fixed,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: MapBounds::new(fx(6000.0), fx(6000.0)),
            economy: EconomyConfig::default(),
            units: UnitTable::default(),
            buildings: BuildingTable::default(),
            mines: MineConfig::default(),
            hauler: HaulerConfig::default(),
            projectiles: ProjectileConfig::default(),
            construction: ConstructionConfig::default(),
            spawn_offset: Vec2Fixed::from_ints(50, 50),
            formation_spacing: fx(40.0),
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) config from RON and validate it.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            what: "config",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no simulation can run with.
    pub fn validate(&self) -> Result<()> {
        if self.map.width <= Fixed::ZERO || self.map.height <= Fixed::ZERO {
            return Err(GameError::InvalidConfig("map size must be positive".into()));
        }
        if self.hauler.capacity == 0 {
            return Err(GameError::InvalidConfig(
                "hauler capacity must be positive".into(),
            ));
        }
        if self.economy.depot_interval <= Fixed::ZERO {
            return Err(GameError::InvalidConfig(
                "depot interval must be positive".into(),
            ));
        }
        if self.projectiles.ttl <= Fixed::ZERO {
            return Err(GameError::InvalidConfig(
                "projectile ttl must be positive".into(),
            ));
        }
        if self.mines.activation_radius < Fixed::ZERO {
            return Err(GameError::InvalidConfig(
                "mine activation radius must not be negative".into(),
            ));
        }
        Ok(())
    }
}
