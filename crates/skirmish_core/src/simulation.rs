//! Core simulation loop.
//!
//! [`Simulation`] owns every entity arena, the ledger and the completion
//! notification queue, and advances them all through [`Simulation::tick`]
//! in a fixed order.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - No system randomness (world generation is seeded)
//! - Consistent iteration order (arenas iterate by ascending id)
//! - Same inputs always produce same outputs
//!
//! # Example
//!
//! ```
//! use skirmish_core::commands::Command;
//! use skirmish_core::config::SimConfig;
//! use skirmish_core::factions::FactionId;
//! use skirmish_core::math::{Fixed, Vec2Fixed};
//! use skirmish_core::simulation::Simulation;
//! use skirmish_core::units::UnitKind;
//!
//! let mut sim = Simulation::new(SimConfig::default());
//! let soldier = sim.spawn_unit(UnitKind::Soldier, FactionId::Player, Vec2Fixed::from_ints(100, 100));
//!
//! let order = Command::MoveTo {
//!     units: vec![soldier],
//!     point: Vec2Fixed::from_ints(400, 100),
//! };
//! let events = sim.tick(Fixed::from_num(0.05), &[order]);
//! assert!(events.rejections.is_empty());
//! assert_eq!(sim.tick_count(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::{debug, error, info, trace};

use crate::buildings::{Building, BuildingKind};
use crate::combat::{combat_system, projectile_system, Projectile};
use crate::commands::Command;
use crate::components::{Arena, EntityId, IdAllocator};
use crate::config::SimConfig;
use crate::construction::{validate_placement, BuildOrder, CompletionNotice, NotificationQueue};
use crate::error::{CommandRejection, GameError, Result};
use crate::events::{GameEvent, GameStatus, Rejection, TickEvents};
use crate::factions::FactionId;
use crate::hauler::{hauler_system, nearest_storage};
use crate::ledger::Ledger;
use crate::math::{Fixed, Vec2Fixed};
use crate::mines::{
    defense_clear_system, disarm_system, trigger_system, DisarmJobs, Mine, MineEvent, MineState,
};
use crate::piles::ResourcePile;
use crate::production::ProductionStep;
use crate::scenario::{UnitSpawn, WorldSeed};
use crate::snapshot::Snapshot;
use crate::units::{Unit, UnitKind};

/// Ticks per second used by the headless runner and scenario defaults.
pub const TICK_RATE: u32 = 20;

/// Seconds per tick at [`TICK_RATE`].
///
/// `1 / TICK_RATE` is not exact in binary, so the step is rounded up to the
/// next representable value. `TICK_RATE` steps then cover at least one
/// second and a timer of `n / TICK_RATE` seconds ends on tick `n`.
#[must_use]
pub fn tick_dt() -> Fixed {
    let one = Fixed::from_num(1).to_bits();
    let rate = i64::from(TICK_RATE);
    Fixed::from_bits((one + rate - 1) / rate)
}

type CommandResult = std::result::Result<(), CommandRejection>;

/// Log a broken internal invariant; fatal in debug builds.
fn defect(context: &str, err: &GameError) {
    error!(%err, context, "simulation invariant violated");
    debug_assert!(false, "{context}: {err}");
}

/// The core game simulation.
///
/// # System Execution Order
///
/// Each tick, systems run in this order:
/// 1. **Commands** - validate and apply or reject
/// 2. **Movement** - patrol waypoints, straight-line motion
/// 3. **Construction** - structure timers, constructor arrivals
/// 4. **Notifications** - completed depots become truck anchors
/// 5. **Production** - promote and count down queue heads
/// 6. **Income** - depot payouts
/// 7. **Haulers** - truck state machines
/// 8. **Mines** - disarm jobs, player defenses clear nearby mines, then triggers
/// 9. **Combat** - targeting and firing
/// 10. **Projectiles** - flight and impact
/// 11. **Cleanup** - purge the dead and the spent, then decide the match
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    tick: u64,
    elapsed: Fixed,
    ids: IdAllocator,
    ledger: Ledger,
    units: Arena<Unit>,
    buildings: Arena<Building>,
    mines: Arena<Mine>,
    piles: Arena<ResourcePile>,
    projectiles: Arena<Projectile>,
    disarm_jobs: DisarmJobs,
    notifications: NotificationQueue,
    status: GameStatus,
}

impl Simulation {
    /// Create an empty world with the configured starting funds.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            ledger: Ledger::new(config.economy.starting_funds),
            config,
            tick: 0,
            elapsed: Fixed::ZERO,
            ids: IdAllocator::default(),
            units: Arena::new(),
            buildings: Arena::new(),
            mines: Arena::new(),
            piles: Arena::new(),
            projectiles: Arena::new(),
            disarm_jobs: DisarmJobs::default(),
            notifications: NotificationQueue::default(),
            status: GameStatus::Running,
        }
    }

    /// Create a world populated from `seed`.
    ///
    /// Buildings are placed first so that seeded trucks find their depot.
    #[must_use]
    pub fn from_seed(config: SimConfig, seed: &WorldSeed) -> Self {
        let mut sim = Self::new(config);
        for b in &seed.buildings {
            sim.spawn_building(b.kind, b.faction, b.position, b.complete);
        }
        for pile in &seed.piles {
            sim.spawn_pile(pile.position, pile.stock);
        }
        for mine in &seed.mines {
            sim.spawn_mine(mine.position, mine.owner);
        }
        for unit in &seed.units {
            sim.spawn_from(unit);
        }
        debug!(
            units = sim.units.len(),
            buildings = sim.buildings.len(),
            mines = sim.mines.len(),
            piles = sim.piles.len(),
            "world seeded"
        );
        sim
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Add a unit at full health. New trucks anchor to the nearest depot.
    pub fn spawn_unit(&mut self, kind: UnitKind, faction: FactionId, position: Vec2Fixed) -> EntityId {
        self.spawn_from(&UnitSpawn::new(kind, faction, position))
    }

    /// Add a unit described by a spawn entry.
    pub fn spawn_from(&mut self, spawn: &UnitSpawn) -> EntityId {
        let id = self.ids.allocate();
        let mut unit = Unit::new(id, spawn.kind, spawn.faction, spawn.position, &self.config);
        if let Some(hp) = spawn.hp {
            unit = unit.with_hp(hp);
        }
        if spawn.stationary {
            unit = unit.into_stationary();
        }
        if !spawn.route.is_empty() {
            unit = unit.with_route(spawn.route.clone());
        }
        if let Some(hauler) = unit.hauler.as_mut() {
            hauler.set_storage_anchor(nearest_storage(&self.buildings, spawn.faction, spawn.position));
        }
        self.units.insert(id, unit);
        id
    }

    /// Add a building, either finished or waiting for construction to start.
    pub fn spawn_building(
        &mut self,
        kind: BuildingKind,
        faction: FactionId,
        position: Vec2Fixed,
        complete: bool,
    ) -> EntityId {
        let id = self.ids.allocate();
        let building = if complete {
            Building::complete(id, kind, faction, position, &self.config)
        } else {
            Building::new(id, kind, faction, position, &self.config)
        };
        self.buildings.insert(id, building);
        id
    }

    /// Add an armed mine.
    pub fn spawn_mine(&mut self, position: Vec2Fixed, owner: Option<FactionId>) -> EntityId {
        let id = self.ids.allocate();
        self.mines
            .insert(id, Mine::new(id, position, owner, &self.config.mines));
        id
    }

    /// Add a resource pile with the configured collection radius.
    pub fn spawn_pile(&mut self, position: Vec2Fixed, stock: u32) -> EntityId {
        let id = self.ids.allocate();
        self.piles.insert(
            id,
            ResourcePile::new(id, position, self.config.hauler.pile_radius, stock),
        );
        id
    }

    /// Move a unit instantly, for scripted setups.
    pub fn place_unit(&mut self, id: EntityId, position: Vec2Fixed) -> Result<()> {
        let unit = self.units.get_mut(id).ok_or(GameError::EntityNotFound(id))?;
        unit.position = position;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds so far.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// The player's ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable ledger access, for scripted setups.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Match status.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Live units.
    #[must_use]
    pub const fn units(&self) -> &Arena<Unit> {
        &self.units
    }

    /// Live buildings.
    #[must_use]
    pub const fn buildings(&self) -> &Arena<Building> {
        &self.buildings
    }

    /// Mines not yet consumed.
    #[must_use]
    pub const fn mines(&self) -> &Arena<Mine> {
        &self.mines
    }

    /// Piles with stock left.
    #[must_use]
    pub const fn piles(&self) -> &Arena<ResourcePile> {
        &self.piles
    }

    /// Projectiles in flight.
    #[must_use]
    pub const fn projectiles(&self) -> &Arena<Projectile> {
        &self.projectiles
    }

    /// Active disarm jobs.
    #[must_use]
    pub const fn disarm_jobs(&self) -> &DisarmJobs {
        &self.disarm_jobs
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Look up a building.
    #[must_use]
    pub fn building(&self, id: EntityId) -> Option<&Building> {
        self.buildings.get(id)
    }

    /// Look up a mine.
    #[must_use]
    pub fn mine(&self, id: EntityId) -> Option<&Mine> {
        self.mines.get(id)
    }

    /// Look up a pile.
    #[must_use]
    pub fn pile(&self, id: EntityId) -> Option<&ResourcePile> {
        self.piles.get(id)
    }

    /// Copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds, applying `commands` first.
    pub fn tick(&mut self, dt: Fixed, commands: &[Command]) -> TickEvents {
        let mut report = TickEvents::default();
        let events = &mut report.events;

        // 1. Commands
        for command in commands {
            if let Err(reason) = self.apply_command(command) {
                debug!(command = command.name(), %reason, "command rejected");
                report.rejections.push(Rejection {
                    command: command.clone(),
                    reason,
                });
            }
        }

        // 2. Movement and patrol
        self.run_movement(dt);

        // 3. Construction
        self.run_construction_timers(dt, events);
        self.run_constructor_arrivals(events);

        // 4. Completion notifications
        self.drain_notifications();

        // 5. Production
        self.run_production(dt, events);

        // 6. Depot income
        self.run_depot_income(dt, events);

        // 7. Haulers
        let hauls = hauler_system(
            &mut self.units,
            &mut self.piles,
            &self.buildings,
            &mut self.ledger,
            dt,
        );
        events.extend(hauls.into_iter().map(GameEvent::Haul));

        // 8. Mines: disarm, defense clearing, then trigger
        match disarm_system(
            &mut self.mines,
            &mut self.disarm_jobs,
            &self.units,
            &mut self.ledger,
            &self.config.mines,
            self.config.economy.disarm_reward,
            dt,
        ) {
            Ok(mine_events) => events.extend(mine_events.into_iter().map(GameEvent::Mine)),
            Err(err) => defect("disarm pass", &err),
        }
        match defense_clear_system(
            &mut self.mines,
            &self.disarm_jobs,
            &self.buildings,
            &mut self.ledger,
            &self.config.mines,
            self.config.economy.disarm_reward,
        ) {
            Ok(mine_events) => events.extend(mine_events.into_iter().map(GameEvent::Mine)),
            Err(err) => defect("defense clear pass", &err),
        }
        match trigger_system(
            &mut self.mines,
            &self.disarm_jobs,
            &mut self.units,
            &mut self.buildings,
        ) {
            Ok(mine_events) => events.extend(mine_events.into_iter().map(GameEvent::Mine)),
            Err(err) => defect("trigger pass", &err),
        }

        // 9. Combat
        let shots = combat_system(
            &mut self.units,
            &mut self.buildings,
            &mut self.projectiles,
            &mut self.ids,
            &self.config.projectiles,
            dt,
        );
        events.extend(shots.into_iter().map(GameEvent::Combat));

        // 10. Projectiles
        let impacts = projectile_system(
            &mut self.projectiles,
            &mut self.units,
            &mut self.buildings,
            &mut self.ledger,
            &self.config.projectiles,
            &self.config.economy,
            dt,
        );
        events.extend(impacts.into_iter().map(GameEvent::Combat));

        // 11. Cleanup, then status
        self.run_cleanup(events);
        self.update_status(events);

        self.tick += 1;
        self.elapsed += dt;
        report.tick = self.tick;

        trace!(tick = self.tick, state_hash = self.state_hash(), "Simulation state hash");
        report
    }

    /// Validate and apply one command.
    fn apply_command(&mut self, command: &Command) -> CommandResult {
        match command {
            Command::MoveTo { units, point } => self.command_move(units, *point),
            Command::AssignHaul { truck, pile } => self.command_assign_haul(*truck, *pile),
            Command::OrderBuild { kind, point } => self.command_order_build(*kind, *point),
            Command::Enqueue { building, kind } => self.command_enqueue(*building, *kind),
            Command::ToggleAutoDisarm { sweeper } => self.command_toggle_disarm(*sweeper),
        }
    }

    fn player_unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units
            .get_mut(id)
            .filter(|u| u.is_alive() && u.faction == FactionId::Player)
    }

    fn command_move(&mut self, selection: &[EntityId], point: Vec2Fixed) -> CommandResult {
        let movable: Vec<EntityId> = selection
            .iter()
            .copied()
            .filter(|&id| {
                self.units
                    .get(id)
                    .is_some_and(|u| u.is_alive() && u.faction == FactionId::Player && !u.stationary)
            })
            .collect();
        if movable.is_empty() {
            return Err(CommandRejection::InvalidTarget);
        }

        let spacing = self.config.formation_spacing;
        let map = self.config.map;
        for (i, id) in movable.into_iter().enumerate() {
            // Three-wide formation centred on the clicked point.
            let col = Fixed::from_num(i % 3);
            let row = Fixed::from_num(i / 3);
            let offset = Vec2Fixed::new(col * spacing - spacing, row * spacing - spacing);
            let target = map.clamp(map.clamp(point) + offset);

            let Some(unit) = self.units.get_mut(id) else {
                continue;
            };
            unit.movement.move_to(target);
            if let Some(hauler) = unit.hauler.as_mut() {
                hauler.release();
            }
            if let Some(constructor) = unit.constructor.as_mut() {
                if let Some(order) = constructor.cancel() {
                    debug!(constructor = id, kind = ?order.kind, "build order cancelled by move");
                }
            }
        }
        Ok(())
    }

    fn command_assign_haul(&mut self, truck: EntityId, pile: EntityId) -> CommandResult {
        if !self.piles.contains(pile) {
            return Err(CommandRejection::InvalidTarget);
        }
        let fallback_anchor = self
            .units
            .get(truck)
            .and_then(|u| nearest_storage(&self.buildings, u.faction, u.position));

        let unit = self
            .units
            .get_mut(truck)
            .filter(|u| u.is_alive() && u.faction == FactionId::Player)
            .ok_or(CommandRejection::InvalidTarget)?;
        let hauler = unit.hauler.as_mut().ok_or(CommandRejection::InvalidTarget)?;

        if hauler.anchor.is_none() {
            hauler.set_storage_anchor(fallback_anchor);
        }
        hauler.assign_pile(Some(pile));
        hauler.steer(&mut unit.movement, &self.piles, &self.buildings);
        Ok(())
    }

    fn command_order_build(&mut self, kind: BuildingKind, point: Vec2Fixed) -> CommandResult {
        // Lowest-id live player constructor without a pending order.
        let mut any_constructor = false;
        let mut chosen = None;
        for (id, unit) in self.units.iter() {
            let Some(constructor) = unit.constructor else {
                continue;
            };
            if !unit.is_alive() || unit.faction != FactionId::Player {
                continue;
            }
            any_constructor = true;
            if !constructor.is_busy() {
                chosen = Some(id);
                break;
            }
        }
        let Some(constructor_id) = chosen else {
            return Err(if any_constructor {
                CommandRejection::AlreadyPending
            } else {
                CommandRejection::InvalidTarget
            });
        };

        let stats = *self.config.buildings.get(kind);
        let footprint = stats.footprint.at(point);
        validate_placement(&footprint, &self.config.map, &self.buildings, &self.piles)?;
        if !self.ledger.can_afford(stats.cost) {
            return Err(CommandRejection::InsufficientFunds {
                required: stats.cost,
                available: self.ledger.balance(),
            });
        }

        let approach = self
            .config
            .map
            .clamp(footprint.approach_point(self.config.construction.approach_gap));
        let unit = self
            .player_unit_mut(constructor_id)
            .ok_or(CommandRejection::InvalidTarget)?;
        let constructor = unit
            .constructor
            .as_mut()
            .ok_or(CommandRejection::InvalidTarget)?;
        constructor.assign(BuildOrder {
            kind,
            target: point,
            approach,
        })?;
        unit.movement.move_to(approach);
        debug!(constructor = constructor_id, ?kind, "build order accepted");
        Ok(())
    }

    fn command_enqueue(&mut self, building: EntityId, kind: UnitKind) -> CommandResult {
        let target = self
            .buildings
            .get_mut(building)
            .filter(|b| b.is_alive() && b.faction == FactionId::Player && b.accepts_order(kind))
            .ok_or(CommandRejection::InvalidTarget)?;
        if let Some(queue) = target.production.as_mut() {
            queue.enqueue(kind);
        }
        Ok(())
    }

    fn command_toggle_disarm(&mut self, sweeper: EntityId) -> CommandResult {
        let gear = self
            .player_unit_mut(sweeper)
            .and_then(|u| u.sweeper.as_mut())
            .ok_or(CommandRejection::InvalidTarget)?;
        gear.auto_disarm = !gear.auto_disarm;
        debug!(sweeper, auto_disarm = gear.auto_disarm, "auto-disarm toggled");
        Ok(())
    }

    fn run_movement(&mut self, dt: Fixed) {
        for (_, unit) in self.units.iter_mut() {
            if !unit.is_alive() || unit.stationary {
                continue;
            }
            if let Some(route) = unit.patrol.as_mut() {
                if let Some(waypoint) = route.current_waypoint(unit.position) {
                    unit.movement.move_to(waypoint);
                }
            }
            unit.movement.step(&mut unit.position, dt);
        }
    }

    fn run_construction_timers(&mut self, dt: Fixed, events: &mut Vec<GameEvent>) {
        for (id, building) in self.buildings.iter_mut() {
            if !building.is_alive() || !building.construction.tick(dt) {
                continue;
            }
            debug!(building = id, kind = ?building.kind, "structure completed");
            self.notifications.push(CompletionNotice {
                building: id,
                kind: building.kind,
                faction: building.faction,
            });
            events.push(GameEvent::StructureCompleted {
                building: id,
                kind: building.kind,
            });
        }
    }

    fn run_constructor_arrivals(&mut self, events: &mut Vec<GameEvent>) {
        let start_radius = self.config.construction.start_radius;

        for constructor_id in self.units.ids() {
            let Some(unit) = self.units.get_mut(constructor_id) else {
                continue;
            };
            if !unit.is_alive() {
                continue;
            }
            let (position, faction) = (unit.position, unit.faction);
            let Some(constructor) = unit.constructor.as_mut() else {
                continue;
            };
            let arrived = constructor
                .order
                .is_some_and(|order| position.within(order.approach, start_radius));
            if !arrived {
                continue;
            }
            let Some(order) = constructor.cancel() else {
                continue;
            };
            unit.movement.stop();

            let stats = *self.config.buildings.get(order.kind);
            let footprint = stats.footprint.at(order.target);
            let placeable =
                validate_placement(&footprint, &self.config.map, &self.buildings, &self.piles).is_ok();
            if !placeable || !self.ledger.try_spend(stats.cost) {
                debug!(constructor = constructor_id, kind = ?order.kind, placeable, "build cancelled on arrival");
                events.push(GameEvent::BuildCancelled {
                    constructor: constructor_id,
                    kind: order.kind,
                });
                continue;
            }

            let building_id = self.spawn_building(order.kind, faction, order.target, false);
            if let Some(building) = self.buildings.get_mut(building_id) {
                if let Err(err) = building.construction.start(stats.build_time) {
                    defect("construction start", &err);
                }
            }
            debug!(constructor = constructor_id, building = building_id, kind = ?order.kind, "build started");
            events.push(GameEvent::BuildStarted {
                constructor: constructor_id,
                building: building_id,
                kind: order.kind,
                cost: stats.cost,
            });
        }
    }

    /// A completed depot becomes the anchor of every friendly truck that
    /// has none, waking the ones stuck in `WaitingStorage`.
    fn drain_notifications(&mut self) {
        let notices: Vec<CompletionNotice> = self.notifications.drain().collect();
        for notice in notices {
            if notice.kind != BuildingKind::Depot {
                continue;
            }
            for (_, unit) in self.units.iter_mut() {
                if !unit.is_alive() || unit.faction != notice.faction {
                    continue;
                }
                let Some(hauler) = unit.hauler.as_mut() else {
                    continue;
                };
                if hauler.anchor.is_none() {
                    hauler.set_storage_anchor(Some(notice.building));
                    hauler.steer(&mut unit.movement, &self.piles, &self.buildings);
                }
            }
        }
    }

    fn run_production(&mut self, dt: Fixed, events: &mut Vec<GameEvent>) {
        let mut finished = Vec::new();

        for (id, building) in self.buildings.iter_mut() {
            if !building.is_alive() || !building.is_complete() {
                continue;
            }
            let Some(queue) = building.production.as_mut() else {
                continue;
            };
            match queue.tick(dt, &mut self.ledger, &self.config.units) {
                ProductionStep::None => {}
                ProductionStep::Promoted { kind, cost } => {
                    debug!(building = id, ?kind, cost, "production started");
                    events.push(GameEvent::ProductionStarted {
                        building: id,
                        kind,
                        cost,
                    });
                }
                ProductionStep::Completed(kind) => {
                    finished.push((id, kind, building.faction, building.position));
                }
            }
        }

        for (building, kind, faction, position) in finished {
            let at = self.config.map.clamp(position + self.config.spawn_offset);
            let unit = self.spawn_unit(kind, faction, at);
            debug!(building, unit, ?kind, "unit produced");
            events.push(GameEvent::UnitProduced {
                building,
                unit,
                kind,
            });
        }
    }

    fn run_depot_income(&mut self, dt: Fixed, events: &mut Vec<GameEvent>) {
        let economy = self.config.economy;
        for (id, building) in self.buildings.iter_mut() {
            if !building.is_alive() || !building.is_complete() {
                continue;
            }
            let Some(timer) = building.income.as_mut() else {
                continue;
            };
            let payouts = timer.accrue(dt, economy.depot_interval);
            let amount = economy.depot_income.saturating_mul(payouts);
            if amount > 0 {
                self.ledger.add(amount);
                events.push(GameEvent::DepotIncome { depot: id, amount });
            }
        }
    }

    /// Remove everything that died or was used up this tick, and drop
    /// handles that now point at nothing.
    fn run_cleanup(&mut self, events: &mut Vec<GameEvent>) {
        for (id, unit) in self.units.iter() {
            if !unit.is_alive() {
                debug!(unit = id, kind = ?unit.kind, faction = ?unit.faction, "unit destroyed");
                events.push(GameEvent::UnitDestroyed {
                    unit: id,
                    kind: unit.kind,
                    faction: unit.faction,
                });
            }
        }
        self.units.retain(|_, u| u.is_alive());

        for (id, building) in self.buildings.iter() {
            if !building.is_alive() {
                debug!(building = id, kind = ?building.kind, faction = ?building.faction, "building destroyed");
                events.push(GameEvent::BuildingDestroyed {
                    building: id,
                    kind: building.kind,
                    faction: building.faction,
                });
            }
        }
        // Production queues go with their building, unrefunded.
        self.buildings.retain(|_, b| b.is_alive());

        self.mines.retain(|_, m| m.state() != MineState::Consumed);
        self.piles.retain(|_, p| !p.is_depleted());

        let (mines, units) = (&self.mines, &self.units);
        self.disarm_jobs.retain(|job| {
            let live = mines.contains(job.mine) && units.contains(job.sweeper);
            if !live {
                events.push(GameEvent::Mine(MineEvent::DisarmCancelled {
                    mine: job.mine,
                    sweeper: job.sweeper,
                }));
            }
            live
        });

        for (_, unit) in self.units.iter_mut() {
            let Some(hauler) = unit.hauler.as_mut() else {
                continue;
            };
            if hauler.pile.is_some_and(|pile| !self.piles.contains(pile)) {
                hauler.assign_pile(None);
            }
            let anchor_alive = hauler
                .anchor
                .is_some_and(|depot| self.buildings.get(depot).is_some_and(|b| b.is_storage_for(unit.faction)));
            if hauler.anchor.is_some() && !anchor_alive {
                hauler.set_storage_anchor(nearest_storage(&self.buildings, unit.faction, unit.position));
            }
            hauler.steer(&mut unit.movement, &self.piles, &self.buildings);
        }
    }

    fn update_status(&mut self, events: &mut Vec<GameEvent>) {
        if self.status.is_over() {
            return;
        }
        let enemy_buildings = self
            .buildings
            .values()
            .any(|b| b.faction == FactionId::Enemy);
        let player_alive = self.units.values().any(|u| u.faction == FactionId::Player)
            || self.buildings.values().any(|b| b.faction == FactionId::Player);

        let status = if !enemy_buildings {
            GameStatus::Victory
        } else if !player_alive {
            GameStatus::Defeat
        } else {
            return;
        };
        info!(tick = self.tick, ?status, "game decided");
        self.status = status;
        events.push(GameEvent::StatusChanged(status));
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two simulations fed the same world and the same commands produce
    /// identical hashes at every tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.elapsed.hash(&mut hasher);
        self.ids.hash(&mut hasher);
        self.ledger.hash(&mut hasher);
        self.units.hash(&mut hasher);
        self.buildings.hash(&mut hasher);
        self.mines.hash(&mut hasher);
        self.piles.hash(&mut hasher);
        self.projectiles.hash(&mut hasher);
        self.disarm_jobs.hash(&mut hasher);
        self.status.hash(&mut hasher);
        hasher.finish()
    }
}
