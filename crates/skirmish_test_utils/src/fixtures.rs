//! Test fixtures and helpers.
//!
//! Pre-built worlds and small constructors for consistent testing.

use fixed::types::I32F32;
use skirmish_core::buildings::BuildingKind;
use skirmish_core::commands::Command;
use skirmish_core::config::SimConfig;
use skirmish_core::events::TickEvents;
use skirmish_core::factions::FactionId;
use skirmish_core::math::{Fixed, Vec2Fixed};
use skirmish_core::scenario::{BuildingSpawn, MineSpawn, PileSpawn, UnitSpawn, WorldSeed};
use skirmish_core::simulation::{self, Simulation};
use skirmish_core::units::UnitKind;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Integer world position.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Seconds per tick at the standard rate.
#[must_use]
pub fn tick_dt() -> Fixed {
    simulation::tick_dt()
}

/// An enemy building far from everything, so the match keeps running.
#[must_use]
pub fn enemy_outpost() -> BuildingSpawn {
    BuildingSpawn {
        kind: BuildingKind::Hq,
        faction: FactionId::Enemy,
        position: pos(5500, 5500),
        complete: true,
    }
}

/// Finished player building.
#[must_use]
pub fn player_building(kind: BuildingKind, at: Vec2Fixed) -> BuildingSpawn {
    BuildingSpawn {
        kind,
        faction: FactionId::Player,
        position: at,
        complete: true,
    }
}

/// Player HQ, garage and depot, plus the far enemy outpost.
#[must_use]
pub fn base_world() -> WorldSeed {
    WorldSeed {
        buildings: vec![
            player_building(BuildingKind::Hq, pos(500, 500)),
            player_building(BuildingKind::Garage, pos(700, 500)),
            player_building(BuildingKind::Depot, pos(500, 800)),
            enemy_outpost(),
        ],
        ..WorldSeed::default()
    }
}

/// A busy mixed world: the base, a squad, trucks on piles, a minefield
/// with a sweeper, and an enemy patrol and fortin facing the squad.
#[must_use]
pub fn skirmish_world() -> WorldSeed {
    let mut world = base_world();

    for i in 0..6 {
        world
            .units
            .push(UnitSpawn::new(UnitKind::Soldier, FactionId::Player, pos(900 + i * 30, 900)));
    }
    world
        .units
        .push(UnitSpawn::new(UnitKind::Truck, FactionId::Player, pos(560, 860)));
    world
        .units
        .push(UnitSpawn::new(UnitKind::Sweeper, FactionId::Player, pos(1300, 1300)));
    world
        .units
        .push(UnitSpawn::new(UnitKind::Bulldozer, FactionId::Player, pos(400, 700)));

    world.piles.push(PileSpawn {
        position: pos(800, 1100),
        stock: 400,
    });
    world.piles.push(PileSpawn {
        position: pos(300, 1000),
        stock: 120,
    });

    for i in 0..5 {
        world.mines.push(MineSpawn {
            position: pos(1320 + i * 40, 1320),
            owner: Some(FactionId::Enemy),
        });
    }

    world.units.push(UnitSpawn {
        route: vec![pos(1200, 1000), pos(1500, 1000)],
        ..UnitSpawn::new(UnitKind::Patrol, FactionId::Enemy, pos(1200, 1000))
    });
    world
        .units
        .push(UnitSpawn::new(UnitKind::Tank, FactionId::Enemy, pos(1400, 800)).stationary());
    world.buildings.push(BuildingSpawn {
        kind: BuildingKind::Fortin,
        faction: FactionId::Enemy,
        position: pos(1500, 900),
        complete: true,
    });
    world
}

/// Simulation with default tuning populated from `world`.
#[must_use]
pub fn sim_with(world: &WorldSeed) -> Simulation {
    Simulation::from_seed(SimConfig::default(), world)
}

/// Run `ticks` ticks at the standard rate with no commands.
pub fn run_ticks(sim: &mut Simulation, ticks: u64) -> Vec<TickEvents> {
    (0..ticks).map(|_| sim.tick(tick_dt(), &[])).collect()
}

/// Issue `commands` on one tick at the standard rate.
pub fn issue(sim: &mut Simulation, commands: &[Command]) -> TickEvents {
    sim.tick(tick_dt(), commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_world_is_running() {
        let mut sim = sim_with(&base_world());
        run_ticks(&mut sim, 5);
        assert!(!sim.status().is_over());
        assert_eq!(sim.buildings().len(), 4);
    }

    #[test]
    fn test_tick_dt_matches_rate() {
        // 1/20 is not exact in binary fixed point; the step rounds up.
        let rate = fixed(simulation::TICK_RATE as i32);
        let second = tick_dt() * rate;
        assert!(second >= fixed(1) && second < fixed_f(1.000_001));
        assert!((tick_dt() * (rate - fixed(1))) < fixed(1));
        assert_eq!(fixed_f(0.5), fixed(1) / fixed(2));
    }

    #[test]
    fn test_skirmish_world_anchors_truck() {
        let sim = sim_with(&skirmish_world());
        let truck = sim
            .units()
            .values()
            .find(|u| u.kind == UnitKind::Truck)
            .and_then(|u| u.hauler);
        assert!(truck.is_some_and(|h| h.anchor.is_some()));
    }
}
