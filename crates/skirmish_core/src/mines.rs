//! Mines, sweepers and disarm jobs.
//!
//! A mine is `Armed` until it either explodes or is disarmed:
//!
//! ```text
//! Armed -> Exploded -> Consumed
//! Armed -> Consumed            (disarmed)
//! ```
//!
//! Each tick the disarm pass runs first, then player fixed defenses clear
//! mines in their radius, then the trigger pass. A mine that a sweeper is
//! working on can never go off under it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buildings::Building;
use crate::components::{Arena, EntityId};
use crate::config::MineConfig;
use crate::error::{GameError, Result};
use crate::factions::FactionId;
use crate::geometry::Circle;
use crate::ledger::Ledger;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::units::Unit;

/// Lifecycle of a mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineState {
    /// Live and waiting.
    Armed,
    /// Went off this tick.
    Exploded,
    /// Spent. Removed at cleanup.
    Consumed,
}

impl MineState {
    /// Whether `self -> next` is a legal step.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Armed, Self::Exploded) | (Self::Armed, Self::Consumed) | (Self::Exploded, Self::Consumed)
        )
    }
}

/// A proximity mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mine {
    /// Stable handle.
    pub id: EntityId,
    /// World position.
    pub position: Vec2Fixed,
    state: MineState,
    /// Distance at which a unit sets the mine off.
    #[serde(with = "fixed_serde")]
    pub activation_radius: Fixed,
    /// Reach of the blast. At least the activation radius.
    #[serde(with = "fixed_serde")]
    pub blast_radius: Fixed,
    /// Damage to everything in the blast.
    pub damage: u32,
    /// Side that laid the mine, if any.
    pub owner: Option<FactionId>,
    /// Whether the owner's units trigger and take damage too.
    pub friendly_fire: bool,
}

impl Mine {
    /// Armed mine with the configured defaults.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2Fixed, owner: Option<FactionId>, config: &MineConfig) -> Self {
        Self {
            id,
            position,
            state: MineState::Armed,
            activation_radius: config.activation_radius,
            blast_radius: config.blast_radius.max(config.activation_radius),
            damage: config.damage,
            owner,
            friendly_fire: config.friendly_fire,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> MineState {
        self.state
    }

    /// Check if the mine is live.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state == MineState::Armed
    }

    /// Move to `next`, refusing anything that goes backwards.
    pub fn transition(&mut self, next: MineState) -> Result<()> {
        if !self.state.can_become(next) {
            return Err(GameError::IllegalMineTransition {
                mine: self.id,
                from: self.state,
                to: next,
            });
        }
        debug!(mine = self.id, from = ?self.state, to = ?next, "mine transition");
        self.state = next;
        Ok(())
    }

    /// Whether units of `faction` trigger this mine and take its damage.
    #[must_use]
    pub fn affects(&self, faction: FactionId) -> bool {
        match self.owner {
            None => true,
            Some(owner) => self.friendly_fire || owner.is_hostile_to(faction),
        }
    }

    /// Blast area.
    #[must_use]
    pub fn blast(&self) -> Circle {
        Circle::new(self.position, self.blast_radius)
    }
}

/// Disarm capability of a sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SweeperGear {
    /// Distance at which the sweeper works on a mine.
    #[serde(with = "fixed_serde")]
    pub disarm_radius: Fixed,
    /// Whether the sweeper starts jobs on its own.
    pub auto_disarm: bool,
}

impl SweeperGear {
    /// Gear with auto-disarm on.
    #[must_use]
    pub const fn new(disarm_radius: Fixed) -> Self {
        Self {
            disarm_radius,
            auto_disarm: true,
        }
    }
}

/// One sweeper working on one mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisarmJob {
    /// Mine being disarmed.
    pub mine: EntityId,
    /// Sweeper doing the work.
    pub sweeper: EntityId,
    /// Seconds of work left.
    #[serde(with = "fixed_serde")]
    pub time_left: Fixed,
}

/// Active disarm jobs, at most one per mine and one per sweeper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DisarmJobs {
    by_mine: BTreeMap<EntityId, DisarmJob>,
}

impl DisarmJobs {
    /// Job on `mine`, if any.
    #[must_use]
    pub fn for_mine(&self, mine: EntityId) -> Option<&DisarmJob> {
        self.by_mine.get(&mine)
    }

    /// Job worked by `sweeper`, if any.
    #[must_use]
    pub fn for_sweeper(&self, sweeper: EntityId) -> Option<&DisarmJob> {
        self.by_mine.values().find(|job| job.sweeper == sweeper)
    }

    /// Number of active jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_mine.len()
    }

    /// Check if there are no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_mine.is_empty()
    }

    /// Jobs in mine id order.
    pub fn iter(&self) -> impl Iterator<Item = &DisarmJob> {
        self.by_mine.values()
    }

    /// Drop every job whose mine or sweeper fails `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&DisarmJob) -> bool) {
        self.by_mine.retain(|_, job| keep(job));
    }

    fn insert(&mut self, job: DisarmJob) {
        self.by_mine.insert(job.mine, job);
    }
}

/// Something that happened to a mine this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineEvent {
    /// A sweeper began work on a mine.
    DisarmStarted {
        /// The mine.
        mine: EntityId,
        /// The sweeper.
        sweeper: EntityId,
    },
    /// A job ended without result.
    DisarmCancelled {
        /// The mine.
        mine: EntityId,
        /// The sweeper.
        sweeper: EntityId,
    },
    /// A mine was made safe and the reward credited.
    Disarmed {
        /// The mine.
        mine: EntityId,
        /// The sweeper.
        sweeper: EntityId,
        /// Amount credited.
        reward: u32,
    },
    /// A player fixed defense cleared a mine in its radius.
    ClearedByDefense {
        /// The mine.
        mine: EntityId,
        /// The defense building.
        defense: EntityId,
        /// Amount credited.
        reward: u32,
    },
    /// A mine went off.
    Detonated {
        /// The mine.
        mine: EntityId,
        /// Unit that set it off.
        triggered_by: EntityId,
    },
}

/// Only player sweepers work mines; the ledger is the player's.
fn sweeper_in_reach(unit: &Unit, mine: &Mine) -> bool {
    unit.is_alive()
        && unit.faction == FactionId::Player
        && unit
            .sweeper
            .is_some_and(|gear| gear.auto_disarm && unit.position.within(mine.position, gear.disarm_radius))
}

/// Progress, cancel and start disarm jobs.
///
/// Existing jobs are advanced first; a job started this tick begins
/// counting down on the next one.
pub fn disarm_system(
    mines: &mut Arena<Mine>,
    jobs: &mut DisarmJobs,
    units: &Arena<Unit>,
    ledger: &mut Ledger,
    config: &MineConfig,
    reward: u32,
    dt: Fixed,
) -> Result<Vec<MineEvent>> {
    let mut events = Vec::new();

    // 1. Cancel jobs that lost their sweeper, their mine, or their reach.
    jobs.retain(|job| {
        let valid = match (mines.get(job.mine), units.get(job.sweeper)) {
            (Some(mine), Some(sweeper)) => mine.is_armed() && sweeper_in_reach(sweeper, mine),
            _ => false,
        };
        if !valid {
            debug!(mine = job.mine, sweeper = job.sweeper, "disarm cancelled");
            events.push(MineEvent::DisarmCancelled {
                mine: job.mine,
                sweeper: job.sweeper,
            });
        }
        valid
    });

    // 2. Count down the survivors.
    let mut finished = Vec::new();
    for job in jobs.by_mine.values_mut() {
        job.time_left -= dt;
        if job.time_left <= Fixed::ZERO {
            finished.push(*job);
        }
    }
    for job in finished {
        jobs.by_mine.remove(&job.mine);
        if let Some(mine) = mines.get_mut(job.mine) {
            mine.transition(MineState::Consumed)?;
        }
        ledger.add(reward);
        debug!(mine = job.mine, sweeper = job.sweeper, reward, "mine disarmed");
        events.push(MineEvent::Disarmed {
            mine: job.mine,
            sweeper: job.sweeper,
            reward,
        });
    }

    // 3. Idle sweepers pick up the nearest free armed mine in reach.
    for (sweeper_id, unit) in units.iter() {
        if unit.sweeper.is_none() || jobs.for_sweeper(sweeper_id).is_some() {
            continue;
        }
        let mut best: Option<(EntityId, Fixed)> = None;
        for (mine_id, mine) in mines.iter() {
            if !mine.is_armed() || jobs.for_mine(mine_id).is_some() || !sweeper_in_reach(unit, mine) {
                continue;
            }
            let d2 = unit.position.distance_squared(mine.position);
            if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((mine_id, d2));
            }
        }
        if let Some((mine_id, _)) = best {
            debug!(mine = mine_id, sweeper = sweeper_id, "disarm started");
            jobs.insert(DisarmJob {
                mine: mine_id,
                sweeper: sweeper_id,
                time_left: config.disarm_time,
            });
            events.push(MineEvent::DisarmStarted {
                mine: mine_id,
                sweeper: sweeper_id,
            });
        }
    }

    Ok(events)
}

/// Clear armed mines near a completed player fixed defense.
///
/// Runs after [`disarm_system`] and before [`trigger_system`]. Mines under an
/// active disarm job are left to the sweeper. The lowest-id defense in
/// range gets the credit.
pub fn defense_clear_system(
    mines: &mut Arena<Mine>,
    jobs: &DisarmJobs,
    buildings: &Arena<Building>,
    ledger: &mut Ledger,
    config: &MineConfig,
    reward: u32,
) -> Result<Vec<MineEvent>> {
    let mut events = Vec::new();

    for (mine_id, mine) in mines.iter_mut() {
        if !mine.is_armed() || jobs.for_mine(mine_id).is_some() {
            continue;
        }
        let defense = buildings
            .iter()
            .find(|(_, b)| {
                b.faction == FactionId::Player
                    && b.defense.is_some()
                    && b.is_alive()
                    && b.is_complete()
                    && b.position.within(mine.position, config.defense_clear_radius)
            })
            .map(|(id, _)| id);
        let Some(defense) = defense else {
            continue;
        };

        mine.transition(MineState::Consumed)?;
        ledger.add(reward);
        debug!(mine = mine_id, defense, reward, "mine cleared by defense");
        events.push(MineEvent::ClearedByDefense {
            mine: mine_id,
            defense,
            reward,
        });
    }

    Ok(events)
}

/// Set off armed mines that a unit has wandered onto.
///
/// The lowest-id qualifying unit inside the activation radius triggers the
/// mine. The blast damages every affected live unit and fixed defense in
/// reach, then the mine is spent.
pub fn trigger_system(
    mines: &mut Arena<Mine>,
    jobs: &DisarmJobs,
    units: &mut Arena<Unit>,
    buildings: &mut Arena<Building>,
) -> Result<Vec<MineEvent>> {
    let mut events = Vec::new();

    for (mine_id, mine) in mines.iter_mut() {
        if !mine.is_armed() || jobs.for_mine(mine_id).is_some() {
            continue;
        }

        let trigger = units
            .iter()
            .find(|(_, u)| {
                u.is_alive() && mine.affects(u.faction) && u.position.within(mine.position, mine.activation_radius)
            })
            .map(|(id, _)| id);
        let Some(triggered_by) = trigger else {
            continue;
        };

        mine.transition(MineState::Exploded)?;
        debug!(mine = mine_id, triggered_by, "mine detonated");
        events.push(MineEvent::Detonated {
            mine: mine_id,
            triggered_by,
        });

        for (_, unit) in units.iter_mut() {
            if unit.is_alive() && mine.affects(unit.faction) && unit.position.within(mine.position, mine.blast_radius) {
                unit.health.apply_damage(mine.damage);
            }
        }

        let blast = mine.blast();
        for (_, building) in buildings.iter_mut() {
            if building.defense.is_some()
                && building.is_alive()
                && mine.affects(building.faction)
                && building.footprint.overlaps_circle(&blast)
            {
                building.health.apply_damage(mine.damage);
            }
        }

        mine.transition(MineState::Consumed)?;
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::BuildingKind;
    use crate::config::SimConfig;
    use crate::units::UnitKind;

    fn pos(x: i32, y: i32) -> Vec2Fixed {
        Vec2Fixed::from_ints(x, y)
    }

    fn sturdy(id: EntityId, faction: FactionId, at: Vec2Fixed) -> Unit {
        Unit::new(id, UnitKind::Soldier, faction, at, &SimConfig::default()).with_hp(1000)
    }

    #[test]
    fn test_transitions_never_go_back() {
        let mut mine = Mine::new(1, pos(0, 0), None, &MineConfig::default());
        assert!(mine.transition(MineState::Exploded).is_ok());
        assert!(mine.transition(MineState::Armed).is_err());
        assert!(mine.transition(MineState::Consumed).is_ok());
        for next in [MineState::Armed, MineState::Exploded, MineState::Consumed] {
            assert!(matches!(
                mine.transition(next),
                Err(GameError::IllegalMineTransition { .. })
            ));
        }
    }

    #[test]
    fn test_blast_radius_clamped_to_activation() {
        let config = MineConfig {
            blast_radius: Fixed::from_num(5),
            ..MineConfig::default()
        };
        let mine = Mine::new(1, pos(0, 0), None, &config);
        assert_eq!(mine.blast_radius, Fixed::from_num(22));
    }

    #[test]
    fn test_owner_units_do_not_trigger_without_friendly_fire() {
        let config = MineConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(100, 100), Some(FactionId::Enemy), &config));
        let mut units = Arena::new();
        units.insert(2, sturdy(2, FactionId::Enemy, pos(100, 100)));
        let mut buildings = Arena::new();

        let events = trigger_system(&mut mines, &DisarmJobs::default(), &mut units, &mut buildings).unwrap();
        assert!(events.is_empty());
        assert!(mines.get(1).is_some_and(Mine::is_armed));

        units.insert(3, sturdy(3, FactionId::Player, pos(110, 100)));
        let events = trigger_system(&mut mines, &DisarmJobs::default(), &mut units, &mut buildings).unwrap();
        assert_eq!(
            events,
            vec![MineEvent::Detonated {
                mine: 1,
                triggered_by: 3
            }]
        );
        assert_eq!(units.get(2).map(|u| u.health.current), Some(1000));
        assert_eq!(units.get(3).map(|u| u.health.current), Some(850));
    }

    #[test]
    fn test_lowest_id_triggers() {
        let config = MineConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(100, 100), None, &config));
        let mut units = Arena::new();
        units.insert(7, sturdy(7, FactionId::Player, pos(100, 110)));
        units.insert(4, sturdy(4, FactionId::Player, pos(100, 90)));

        let events = trigger_system(&mut mines, &DisarmJobs::default(), &mut units, &mut Arena::new()).unwrap();
        assert_eq!(
            events,
            vec![MineEvent::Detonated {
                mine: 1,
                triggered_by: 4
            }]
        );
        assert_eq!(mines.get(1).map(Mine::state), Some(MineState::Consumed));
    }

    #[test]
    fn test_blast_hits_fixed_defense() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(100, 100), None, &sim_config.mines));
        let mut units = Arena::new();
        units.insert(2, sturdy(2, FactionId::Player, pos(100, 100)));
        let mut buildings = Arena::new();
        // Circle radius 30 centred 50 away reaches within 20 of the mine.
        buildings.insert(
            3,
            Building::complete(3, BuildingKind::Fortin, FactionId::Player, pos(150, 100), &sim_config),
        );
        // Ordinary buildings are not caught by blasts.
        buildings.insert(
            4,
            Building::complete(4, BuildingKind::Depot, FactionId::Player, pos(100, 150), &sim_config),
        );

        trigger_system(&mut mines, &DisarmJobs::default(), &mut units, &mut buildings).unwrap();
        assert_eq!(buildings.get(3).map(|b| b.health.current), Some(0));
        assert_eq!(buildings.get(4).map(|b| b.health.current), Some(300));
    }

    #[test]
    fn test_disarm_job_lifecycle() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(100, 100), None, &sim_config.mines));
        let mut units = Arena::new();
        units.insert(
            2,
            Unit::new(2, UnitKind::Sweeper, FactionId::Player, pos(120, 100), &sim_config),
        );
        let mut jobs = DisarmJobs::default();
        let mut ledger = Ledger::new(0);
        let dt = Fixed::from_num(0.5);

        let run = |mines: &mut Arena<Mine>, jobs: &mut DisarmJobs, ledger: &mut Ledger| {
            disarm_system(mines, jobs, &units, ledger, &sim_config.mines, 5, dt).unwrap()
        };

        let events = run(&mut mines, &mut jobs, &mut ledger);
        assert_eq!(events, vec![MineEvent::DisarmStarted { mine: 1, sweeper: 2 }]);
        assert_eq!(jobs.for_mine(1).map(|j| j.time_left), Some(Fixed::from_num(2)));

        for _ in 0..3 {
            run(&mut mines, &mut jobs, &mut ledger);
        }
        assert!(mines.get(1).is_some_and(Mine::is_armed));

        let events = run(&mut mines, &mut jobs, &mut ledger);
        assert!(events.contains(&MineEvent::Disarmed {
            mine: 1,
            sweeper: 2,
            reward: 5
        }));
        assert_eq!(mines.get(1).map(Mine::state), Some(MineState::Consumed));
        assert_eq!(ledger.balance(), 5);
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_job_blocks_trigger() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(100, 100), None, &sim_config.mines));
        let mut units = Arena::new();
        units.insert(
            2,
            Unit::new(2, UnitKind::Sweeper, FactionId::Player, pos(100, 100), &sim_config),
        );
        let mut jobs = DisarmJobs::default();
        let mut ledger = Ledger::new(0);

        disarm_system(&mut mines, &mut jobs, &units, &mut ledger, &sim_config.mines, 5, Fixed::from_num(0.1))
            .unwrap();
        let events = trigger_system(&mut mines, &jobs, &mut units, &mut Arena::new()).unwrap();
        assert!(events.is_empty());
        assert!(mines.get(1).is_some_and(Mine::is_armed));
    }

    #[test]
    fn test_enemy_sweeper_never_pays_player() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(100, 100), None, &sim_config.mines));
        let mut units = Arena::new();
        units.insert(
            2,
            Unit::new(2, UnitKind::Sweeper, FactionId::Enemy, pos(110, 100), &sim_config),
        );
        let mut jobs = DisarmJobs::default();
        let mut ledger = Ledger::new(0);

        for _ in 0..10 {
            let events = disarm_system(
                &mut mines,
                &mut jobs,
                &units,
                &mut ledger,
                &sim_config.mines,
                5,
                Fixed::from_num(0.5),
            )
            .unwrap();
            assert!(events.is_empty());
        }
        assert!(jobs.is_empty());
        assert!(mines.get(1).is_some_and(Mine::is_armed));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_player_defense_clears_nearby_mines() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(1200, 1000), None, &sim_config.mines));
        mines.insert(2, Mine::new(2, pos(1300, 1000), None, &sim_config.mines));
        let mut buildings = Arena::new();
        buildings.insert(
            3,
            Building::complete(3, BuildingKind::Fortin, FactionId::Player, pos(1000, 1000), &sim_config),
        );
        buildings.insert(
            4,
            Building::complete(4, BuildingKind::Fortin, FactionId::Player, pos(1050, 1000), &sim_config),
        );
        let mut ledger = Ledger::new(0);

        let events = defense_clear_system(
            &mut mines,
            &DisarmJobs::default(),
            &buildings,
            &mut ledger,
            &sim_config.mines,
            5,
        )
        .unwrap();
        // Mine 2 is 300 from fortin 3 but 250 from fortin 4.
        assert_eq!(
            events,
            vec![
                MineEvent::ClearedByDefense {
                    mine: 1,
                    defense: 3,
                    reward: 5
                },
                MineEvent::ClearedByDefense {
                    mine: 2,
                    defense: 4,
                    reward: 5
                },
            ]
        );
        assert_eq!(ledger.balance(), 10);
        assert_eq!(mines.get(1).map(Mine::state), Some(MineState::Consumed));
    }

    #[test]
    fn test_defense_clear_skips_enemy_unfinished_and_far() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(1100, 1000), None, &sim_config.mines));
        mines.insert(2, Mine::new(2, pos(3000, 3000), None, &sim_config.mines));
        let mut buildings = Arena::new();
        buildings.insert(
            3,
            Building::complete(3, BuildingKind::Fortin, FactionId::Enemy, pos(1000, 1000), &sim_config),
        );
        buildings.insert(
            4,
            Building::new(4, BuildingKind::Fortin, FactionId::Player, pos(1000, 1100), &sim_config),
        );
        buildings.insert(
            5,
            Building::complete(5, BuildingKind::Depot, FactionId::Player, pos(1100, 1100), &sim_config),
        );
        let mut ledger = Ledger::new(0);

        let events = defense_clear_system(
            &mut mines,
            &DisarmJobs::default(),
            &buildings,
            &mut ledger,
            &sim_config.mines,
            5,
        )
        .unwrap();
        assert!(events.is_empty());
        assert!(mines.values().all(Mine::is_armed));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_defense_clear_leaves_sweeper_job_alone() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(1100, 1000), None, &sim_config.mines));
        let mut units = Arena::new();
        units.insert(
            2,
            Unit::new(2, UnitKind::Sweeper, FactionId::Player, pos(1110, 1000), &sim_config),
        );
        let mut buildings = Arena::new();
        buildings.insert(
            3,
            Building::complete(3, BuildingKind::Fortin, FactionId::Player, pos(1000, 1000), &sim_config),
        );
        let mut jobs = DisarmJobs::default();
        let mut ledger = Ledger::new(0);

        disarm_system(&mut mines, &mut jobs, &units, &mut ledger, &sim_config.mines, 5, Fixed::from_num(0.5))
            .unwrap();
        let events =
            defense_clear_system(&mut mines, &jobs, &buildings, &mut ledger, &sim_config.mines, 5).unwrap();
        assert!(events.is_empty());
        assert!(mines.get(1).is_some_and(Mine::is_armed));
    }

    #[test]
    fn test_toggle_off_cancels_job() {
        let sim_config = SimConfig::default();
        let mut mines = Arena::new();
        mines.insert(1, Mine::new(1, pos(100, 100), None, &sim_config.mines));
        let mut units = Arena::new();
        units.insert(
            2,
            Unit::new(2, UnitKind::Sweeper, FactionId::Player, pos(110, 100), &sim_config),
        );
        let mut jobs = DisarmJobs::default();
        let mut ledger = Ledger::new(0);
        let dt = Fixed::from_num(0.5);

        disarm_system(&mut mines, &mut jobs, &units, &mut ledger, &sim_config.mines, 5, dt).unwrap();
        assert_eq!(jobs.len(), 1);

        if let Some(gear) = units.get_mut(2).and_then(|u| u.sweeper.as_mut()) {
            gear.auto_disarm = false;
        }
        let events =
            disarm_system(&mut mines, &mut jobs, &units, &mut ledger, &sim_config.mines, 5, dt).unwrap();
        assert_eq!(events, vec![MineEvent::DisarmCancelled { mine: 1, sweeper: 2 }]);
        assert!(jobs.is_empty());
        assert!(mines.get(1).is_some_and(Mine::is_armed));
        assert_eq!(ledger.balance(), 0);
    }
}
