//! Mobile units.
//!
//! A [`Unit`] is one record with a kind tag and optional capability blocks.
//! Systems act on whichever blocks are present: anything with a
//! [`Combatant`] fights, anything with a [`Hauler`] hauls, and so on.

use serde::{Deserialize, Serialize};

use crate::components::{Combatant, EntityId, Health, Movement, PatrolRoute};
use crate::config::SimConfig;
use crate::construction::Constructor;
use crate::factions::FactionId;
use crate::hauler::Hauler;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::mines::SweeperGear;

/// Unit kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Basic infantry.
    Soldier,
    /// Heavy armour.
    Tank,
    /// Resource hauler.
    Truck,
    /// Mine sweeper.
    Sweeper,
    /// Constructor.
    Bulldozer,
    /// Infantry walking a waypoint loop.
    Patrol,
}

impl UnitKind {
    /// Every unit kind.
    pub const ALL: [Self; 6] = [
        Self::Soldier,
        Self::Tank,
        Self::Truck,
        Self::Sweeper,
        Self::Bulldozer,
        Self::Patrol,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Soldier => "Soldier",
            Self::Tank => "Tank",
            Self::Truck => "Truck",
            Self::Sweeper => "Sweeper",
            Self::Bulldozer => "Bulldozer",
            Self::Patrol => "Patrol",
        }
    }
}

/// A mobile unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Stable handle.
    pub id: EntityId,
    /// Kind tag.
    pub kind: UnitKind,
    /// Owning side.
    pub faction: FactionId,
    /// World position.
    pub position: Vec2Fixed,
    /// Collision radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Movement state.
    pub movement: Movement,
    /// Garrison units never move.
    pub stationary: bool,
    /// Hit points.
    pub health: Health,
    /// Weapon, if the unit fights.
    pub combatant: Option<Combatant>,
    /// Cargo state machine, if the unit hauls.
    pub hauler: Option<Hauler>,
    /// Disarm gear, if the unit sweeps mines.
    pub sweeper: Option<SweeperGear>,
    /// Build order slot, if the unit constructs.
    pub constructor: Option<Constructor>,
    /// Waypoint loop, if the unit patrols.
    pub patrol: Option<PatrolRoute>,
}

impl Unit {
    /// Build a unit of `kind` from the stat tables.
    ///
    /// Capability blocks follow the kind: trucks haul, sweepers sweep,
    /// bulldozers construct, and any kind with a weapon profile fights.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: UnitKind,
        faction: FactionId,
        position: Vec2Fixed,
        config: &SimConfig,
    ) -> Self {
        let stats = config.units.get(kind);
        Self {
            id,
            kind,
            faction,
            position,
            radius: stats.radius,
            movement: Movement::new(stats.speed),
            stationary: false,
            health: Health::new(stats.hp),
            combatant: stats
                .combat
                .map(|c| Combatant::new(c.damage, c.range, c.cooldown)),
            hauler: (kind == UnitKind::Truck).then(|| Hauler::new(&config.hauler)),
            sweeper: (kind == UnitKind::Sweeper)
                .then(|| SweeperGear::new(config.mines.sweeper_disarm_radius)),
            constructor: (kind == UnitKind::Bulldozer).then(Constructor::default),
            patrol: None,
        }
    }

    /// Pin the unit in place.
    pub fn into_stationary(mut self) -> Self {
        self.stationary = true;
        self.movement.stop();
        self
    }

    /// Attach a waypoint loop.
    pub fn with_route(mut self, waypoints: Vec<Vec2Fixed>) -> Self {
        self.patrol = Some(PatrolRoute::new(waypoints));
        self
    }

    /// Override hit points, at full health.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.health = Health::new(hp);
        self
    }

    /// A unit is alive while it has hit points left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }
}
