//! End-to-end scenarios driven through `Simulation::tick`.
//!
//! Each test builds a small world, issues commands the way the headless
//! runner would, and checks what the snapshot and event reports show.

use skirmish_core::buildings::BuildingKind;
use skirmish_core::combat::CombatEvent;
use skirmish_core::commands::Command;
use skirmish_core::config::SimConfig;
use skirmish_core::error::CommandRejection;
use skirmish_core::events::{GameEvent, GameStatus, TickEvents};
use skirmish_core::factions::FactionId;
use skirmish_core::hauler::{HaulEvent, HaulerState};
use skirmish_core::mines::MineEvent;
use skirmish_core::scenario::{BuildingSpawn, MineSpawn, PileSpawn, Scenario, UnitSpawn, WorldSeed};
use skirmish_core::simulation::Simulation;
use skirmish_core::units::UnitKind;
use skirmish_test_utils::fixtures::{enemy_outpost, issue, player_building, pos, run_ticks, tick_dt};

fn config_with_funds(funds: u32) -> SimConfig {
    let mut config = SimConfig::default();
    config.economy.starting_funds = funds;
    config
}

/// Tick until `found` matches an event, up to `limit` ticks.
fn tick_until(
    sim: &mut Simulation,
    limit: u64,
    found: impl Fn(&GameEvent) -> bool,
) -> Option<TickEvents> {
    for _ in 0..limit {
        let events = sim.tick(tick_dt(), &[]);
        if events.events.iter().any(&found) {
            return Some(events);
        }
    }
    None
}

// =============================================================================
// Production
// =============================================================================

mod production {
    use super::*;

    fn garage_world() -> WorldSeed {
        WorldSeed {
            buildings: vec![player_building(BuildingKind::Garage, pos(700, 500)), enemy_outpost()],
            ..WorldSeed::default()
        }
    }

    #[test]
    fn test_order_debits_at_promotion_and_spawns_unit() {
        let mut sim = Simulation::from_seed(config_with_funds(100), &garage_world());
        let garage = sim
            .buildings()
            .values()
            .find(|b| b.kind == BuildingKind::Garage)
            .map(|b| b.id)
            .unwrap();

        let events = issue(
            &mut sim,
            &[Command::Enqueue {
                building: garage,
                kind: UnitKind::Truck,
            }],
        );
        assert!(events.events.contains(&GameEvent::ProductionStarted {
            building: garage,
            kind: UnitKind::Truck,
            cost: 50,
        }));
        let view = sim.snapshot();
        assert_eq!(view.balance, 50);
        let garage_view = view.building(garage).unwrap();
        assert_eq!(garage_view.queue_len, 0);
        assert_eq!(garage_view.current.map(|o| o.kind), Some(UnitKind::Truck));

        let done = tick_until(&mut sim, 40, |e| matches!(e, GameEvent::UnitProduced { .. })).unwrap();
        assert_eq!(done.units_produced(), 1);

        let view = sim.snapshot();
        assert_eq!(view.balance, 50);
        assert!(view.building(garage).unwrap().current.is_none());
        let trucks: Vec<_> = view.units.iter().filter(|u| u.kind == UnitKind::Truck).collect();
        assert_eq!(trucks.len(), 1);
        assert_eq!(trucks[0].position, pos(750, 550));
    }

    #[test]
    fn test_enqueue_is_free_until_funds_arrive() {
        let mut sim = Simulation::from_seed(config_with_funds(20), &garage_world());
        let garage = sim.buildings().ids()[0];

        let events = issue(
            &mut sim,
            &[Command::Enqueue {
                building: garage,
                kind: UnitKind::Truck,
            }],
        );
        assert!(events.rejections.is_empty());
        let view = sim.snapshot();
        assert_eq!(view.balance, 20);
        assert_eq!(view.building(garage).unwrap().queue_len, 1);
        assert!(view.building(garage).unwrap().current.is_none());

        // Still short: nothing happens, no matter how long we wait.
        run_ticks(&mut sim, 10);
        assert_eq!(sim.ledger().balance(), 20);

        sim.ledger_mut().add(30);
        run_ticks(&mut sim, 1);
        assert_eq!(sim.ledger().balance(), 0);
        assert!(sim.snapshot().building(garage).unwrap().current.is_some());
    }

    #[test]
    fn test_orders_for_wrong_building_are_rejected() {
        let mut sim = Simulation::from_seed(config_with_funds(100), &garage_world());
        let garage = sim.buildings().ids()[0];
        let events = issue(
            &mut sim,
            &[Command::Enqueue {
                building: garage,
                kind: UnitKind::Soldier,
            }],
        );
        assert_eq!(events.rejections.len(), 1);
        assert_eq!(events.rejections[0].reason, CommandRejection::InvalidTarget);
        assert_eq!(sim.ledger().balance(), 100);
    }
}

// =============================================================================
// Mines
// =============================================================================

mod mines {
    use super::*;

    fn sturdy(kind: UnitKind, at: skirmish_core::math::Vec2Fixed) -> UnitSpawn {
        UnitSpawn {
            hp: Some(1000),
            ..UnitSpawn::new(kind, FactionId::Player, at)
        }
    }

    #[test]
    fn test_unit_entering_activation_radius_detonates() {
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            mines: vec![MineSpawn {
                position: pos(2000, 2000),
                owner: Some(FactionId::Enemy),
            }],
            units: vec![
                sturdy(UnitKind::Soldier, pos(2030, 2000)),
                sturdy(UnitKind::Soldier, pos(2000, 2025)),
                sturdy(UnitKind::Soldier, pos(2000, 1960)),
            ],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(SimConfig::default(), &world);
        let mine = sim.mines().ids()[0];
        let ids = sim.units().ids();
        let (walker, bystander, clear) = (ids[0], ids[1], ids[2]);

        let events = run_ticks(&mut sim, 1);
        assert_eq!(events[0].mine_events().count(), 0);

        sim.place_unit(walker, pos(2020, 2000)).unwrap();
        let events = issue(&mut sim, &[]);
        let detonations: Vec<_> = events.mine_events().collect();
        assert_eq!(
            detonations,
            vec![&MineEvent::Detonated {
                mine,
                triggered_by: walker
            }]
        );

        let hp = |id| sim.unit(id).map(|u| u.health.current);
        assert_eq!(hp(walker), Some(850));
        assert_eq!(hp(bystander), Some(850));
        assert_eq!(hp(clear), Some(1000));
        assert!(sim.mine(mine).is_none());
    }

    #[test]
    fn test_owner_units_walk_over_their_own_mines() {
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            mines: vec![MineSpawn {
                position: pos(2000, 2000),
                owner: Some(FactionId::Player),
            }],
            units: vec![sturdy(UnitKind::Soldier, pos(2000, 2000))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(SimConfig::default(), &world);
        run_ticks(&mut sim, 5);
        assert_eq!(sim.mines().len(), 1);
    }

    #[test]
    fn test_sweeper_disarms_for_reward() {
        let mut config = config_with_funds(0);
        config.mines.sweeper_disarm_radius = skirmish_test_utils::fixtures::fixed(200);
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            mines: vec![MineSpawn {
                position: pos(2000, 2000),
                owner: Some(FactionId::Enemy),
            }],
            units: vec![UnitSpawn::new(UnitKind::Sweeper, FactionId::Player, pos(2150, 2000))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config, &world);
        let mine = sim.mines().ids()[0];

        let first = issue(&mut sim, &[]);
        assert!(matches!(
            first.mine_events().next(),
            Some(MineEvent::DisarmStarted { .. })
        ));
        assert!(sim.snapshot().mines[0].being_disarmed);

        // 2.0 s at 20 ticks per second: done exactly 40 ticks after the start.
        let mut disarmed_at = None;
        for _ in 0..60 {
            let report = sim.tick(tick_dt(), &[]);
            assert!(!report
                .mine_events()
                .any(|e| matches!(e, MineEvent::Detonated { .. })));
            if report
                .mine_events()
                .any(|e| matches!(e, MineEvent::Disarmed { reward: 5, .. }))
            {
                disarmed_at.get_or_insert(report.tick);
            }
        }
        assert_eq!(disarmed_at, Some(first.tick + 40));
        assert!(sim.mine(mine).is_none());
        assert_eq!(sim.ledger().balance(), 5);
    }

    #[test]
    fn test_player_fortin_clears_mines_in_radius() {
        let world = WorldSeed {
            buildings: vec![player_building(BuildingKind::Fortin, pos(1000, 1000)), enemy_outpost()],
            mines: vec![
                MineSpawn {
                    position: pos(1250, 1000),
                    owner: Some(FactionId::Enemy),
                },
                MineSpawn {
                    position: pos(1300, 1000),
                    owner: Some(FactionId::Enemy),
                },
            ],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config_with_funds(0), &world);
        let fortin = sim.buildings().ids()[0];
        let mines = sim.mines().ids();

        let events = issue(&mut sim, &[]);
        let cleared: Vec<_> = events.mine_events().collect();
        assert_eq!(
            cleared,
            vec![&MineEvent::ClearedByDefense {
                mine: mines[0],
                defense: fortin,
                reward: 5
            }]
        );
        assert!(sim.mine(mines[0]).is_none());
        assert!(sim.mine(mines[1]).is_some());
        assert_eq!(sim.ledger().balance(), 5);

        run_ticks(&mut sim, 20);
        assert_eq!(sim.mines().len(), 1);
        assert_eq!(sim.ledger().balance(), 5);
    }

    #[test]
    fn test_enemy_sweeper_leaves_mines_and_ledger_alone() {
        let mut config = config_with_funds(0);
        config.mines.sweeper_disarm_radius = skirmish_test_utils::fixtures::fixed(200);
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            mines: vec![MineSpawn {
                position: pos(2000, 2000),
                owner: None,
            }],
            units: vec![
                UnitSpawn::new(UnitKind::Sweeper, FactionId::Enemy, pos(2150, 2000)).stationary(),
            ],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config, &world);
        let log = run_ticks(&mut sim, 60);
        assert!(log.iter().all(|report| report.mine_events().next().is_none()));
        assert!(sim.disarm_jobs().is_empty());
        assert_eq!(sim.mines().len(), 1);
        assert_eq!(sim.ledger().balance(), 0);
    }

    #[test]
    fn test_toggling_auto_disarm_off_cancels_job() {
        let mut config = config_with_funds(0);
        config.mines.sweeper_disarm_radius = skirmish_test_utils::fixtures::fixed(200);
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            mines: vec![MineSpawn {
                position: pos(2000, 2000),
                owner: Some(FactionId::Enemy),
            }],
            units: vec![UnitSpawn::new(UnitKind::Sweeper, FactionId::Player, pos(2150, 2000))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config, &world);
        let sweeper = sim.units().ids()[0];
        run_ticks(&mut sim, 5);
        assert_eq!(sim.disarm_jobs().len(), 1);

        let events = issue(&mut sim, &[Command::ToggleAutoDisarm { sweeper }]);
        assert!(events
            .mine_events()
            .any(|e| matches!(e, MineEvent::DisarmCancelled { .. })));
        assert!(sim.disarm_jobs().is_empty());

        run_ticks(&mut sim, 60);
        assert_eq!(sim.mines().len(), 1);
        assert_eq!(sim.ledger().balance(), 0);
    }
}

// =============================================================================
// Hauling
// =============================================================================

mod hauling {
    use super::*;

    #[test]
    fn test_exhausted_pile_sends_partial_cargo_home() {
        let world = WorldSeed {
            buildings: vec![player_building(BuildingKind::Depot, pos(500, 800)), enemy_outpost()],
            piles: vec![PileSpawn {
                position: pos(1000, 800),
                stock: 60,
            }],
            units: vec![UnitSpawn::new(UnitKind::Truck, FactionId::Player, pos(1000, 800))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config_with_funds(0), &world);
        let truck = sim.units().ids()[0];
        let pile = sim.piles().ids()[0];

        issue(&mut sim, &[Command::AssignHaul { truck, pile }]);
        let exhausted = tick_until(&mut sim, 60, |e| {
            matches!(e, GameEvent::Haul(HaulEvent::PileExhausted { .. }))
        });
        assert!(exhausted.is_some());

        let hauler = sim.unit(truck).and_then(|u| u.hauler).unwrap();
        assert_eq!(hauler.cargo, 60);
        assert_eq!(hauler.state, HaulerState::ToStorage);
        assert!(hauler.pile.is_none());
        assert!(sim.pile(pile).is_none());

        let delivered = tick_until(&mut sim, 120, |e| {
            matches!(e, GameEvent::Haul(HaulEvent::Delivered { amount: 60, .. }))
        });
        assert!(delivered.is_some());
        let hauler = sim.unit(truck).and_then(|u| u.hauler).unwrap();
        assert_eq!(hauler.cargo, 0);
        assert_eq!(hauler.state, HaulerState::Idle);
    }

    #[test]
    fn test_move_order_releases_truck() {
        let world = WorldSeed {
            buildings: vec![player_building(BuildingKind::Depot, pos(500, 800)), enemy_outpost()],
            piles: vec![PileSpawn {
                position: pos(1000, 800),
                stock: 500,
            }],
            units: vec![UnitSpawn::new(UnitKind::Truck, FactionId::Player, pos(900, 800))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(SimConfig::default(), &world);
        let truck = sim.units().ids()[0];
        let pile = sim.piles().ids()[0];
        issue(&mut sim, &[Command::AssignHaul { truck, pile }]);
        assert_eq!(
            sim.unit(truck).and_then(|u| u.hauler).map(|h| h.state),
            Some(HaulerState::ToPile)
        );

        issue(
            &mut sim,
            &[Command::MoveTo {
                units: vec![truck],
                point: pos(300, 300),
            }],
        );
        let hauler = sim.unit(truck).and_then(|u| u.hauler).unwrap();
        assert_eq!(hauler.state, HaulerState::Idle);
        assert!(hauler.pile.is_none());
    }
}

// =============================================================================
// Construction
// =============================================================================

mod construction {
    use super::*;

    #[test]
    fn test_bulldozer_builds_depot_that_pays_income() {
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            units: vec![UnitSpawn::new(UnitKind::Bulldozer, FactionId::Player, pos(900, 1000))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config_with_funds(200), &world);

        let events = issue(
            &mut sim,
            &[Command::OrderBuild {
                kind: BuildingKind::Depot,
                point: pos(1000, 1000),
            }],
        );
        assert!(events.rejections.is_empty());
        assert_eq!(sim.ledger().balance(), 200);

        let started = tick_until(&mut sim, 40, |e| matches!(e, GameEvent::BuildStarted { .. })).unwrap();
        let depot = started
            .events
            .iter()
            .find_map(|e| match e {
                GameEvent::BuildStarted { building, .. } => Some(*building),
                _ => None,
            })
            .unwrap();
        assert_eq!(sim.ledger().balance(), 150);
        assert!(!sim.snapshot().building(depot).unwrap().complete);

        let completed = tick_until(&mut sim, 80, |e| {
            matches!(e, GameEvent::StructureCompleted { kind: BuildingKind::Depot, .. })
        });
        assert!(completed.is_some());
        assert!(sim.snapshot().building(depot).unwrap().complete);

        run_ticks(&mut sim, 41);
        assert!(sim.ledger().balance() >= 160);
    }

    #[test]
    fn test_blocked_site_cancels_on_arrival() {
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            units: vec![
                UnitSpawn::new(UnitKind::Bulldozer, FactionId::Player, pos(500, 1000)),
                UnitSpawn::new(UnitKind::Bulldozer, FactionId::Player, pos(920, 1500)),
            ],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config_with_funds(200), &world);

        // Both accept: nothing occupies either site yet.
        let events = issue(
            &mut sim,
            &[
                Command::OrderBuild {
                    kind: BuildingKind::Garage,
                    point: pos(1000, 1000),
                },
                Command::OrderBuild {
                    kind: BuildingKind::Garage,
                    point: pos(1010, 1030),
                },
            ],
        );
        assert!(events.rejections.is_empty());

        let mut log = Vec::new();
        for _ in 0..200 {
            log.extend(sim.tick(tick_dt(), &[]).events);
        }
        let started = log
            .iter()
            .filter(|e| matches!(e, GameEvent::BuildStarted { .. }))
            .count();
        let cancelled = log
            .iter()
            .filter(|e| matches!(e, GameEvent::BuildCancelled { .. }))
            .count();
        assert_eq!((started, cancelled), (1, 1));
        assert_eq!(sim.ledger().balance(), 80);
    }

    #[test]
    fn test_unaffordable_order_is_rejected() {
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            units: vec![UnitSpawn::new(UnitKind::Bulldozer, FactionId::Player, pos(900, 1000))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config_with_funds(40), &world);
        let events = issue(
            &mut sim,
            &[Command::OrderBuild {
                kind: BuildingKind::Garage,
                point: pos(1000, 1000),
            }],
        );
        assert_eq!(
            events.rejections[0].reason,
            CommandRejection::InsufficientFunds {
                required: 120,
                available: 40
            }
        );
    }
}

// =============================================================================
// Combat
// =============================================================================

mod combat {
    use super::*;

    #[test]
    fn test_player_kill_pays_bounty() {
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            units: vec![
                UnitSpawn::new(UnitKind::Tank, FactionId::Player, pos(1000, 1000)),
                UnitSpawn {
                    hp: Some(20),
                    ..UnitSpawn::new(UnitKind::Soldier, FactionId::Enemy, pos(1150, 1000)).stationary()
                },
            ],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config_with_funds(0), &world);
        let target = sim.units().ids()[1];

        let died = tick_until(&mut sim, 40, |e| {
            matches!(e, GameEvent::UnitDestroyed { unit, .. } if *unit == target)
        })
        .unwrap();
        assert!(died.combat_events().any(|e| matches!(
            e,
            CombatEvent::Destroyed {
                by: FactionId::Player,
                bounty: 5,
                ..
            }
        )));
        assert!(sim.unit(target).is_none());
        assert_eq!(sim.ledger().balance(), 5);
    }

    #[test]
    fn test_destroying_last_enemy_building_wins() {
        let world = WorldSeed {
            buildings: vec![BuildingSpawn {
                kind: BuildingKind::Depot,
                faction: FactionId::Enemy,
                position: pos(2000, 2000),
                complete: true,
            }],
            units: (0..4)
                .map(|i| UnitSpawn::new(UnitKind::Tank, FactionId::Player, pos(1800, 1940 + i * 40)))
                .collect(),
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(config_with_funds(0), &world);

        let decided = tick_until(&mut sim, 400, |e| {
            matches!(e, GameEvent::StatusChanged(GameStatus::Victory))
        })
        .unwrap();
        assert!(decided.events.iter().any(|e| matches!(
            e,
            GameEvent::BuildingDestroyed {
                kind: BuildingKind::Depot,
                faction: FactionId::Enemy,
                ..
            }
        )));
        assert_eq!(sim.status(), GameStatus::Victory);
        assert_eq!(sim.ledger().balance(), 20);
        assert!(sim.buildings().is_empty());
    }

    #[test]
    fn test_fortin_under_construction_holds_fire() {
        let world = WorldSeed {
            buildings: vec![BuildingSpawn {
                kind: BuildingKind::Fortin,
                faction: FactionId::Enemy,
                position: pos(2000, 2000),
                complete: false,
            }],
            units: vec![UnitSpawn::new(UnitKind::Sweeper, FactionId::Player, pos(2100, 2000))],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(SimConfig::default(), &world);
        let events = run_ticks(&mut sim, 40);
        assert!(events.iter().all(|t| t.combat_events().next().is_none()));
        assert_eq!(sim.units().len(), 1);
    }

    #[test]
    fn test_projectile_fizzles_when_target_dies_elsewhere() {
        // Two tanks fire at one weak enemy the same tick; the second shot
        // has nothing left to hit.
        let world = WorldSeed {
            buildings: vec![enemy_outpost()],
            units: vec![
                UnitSpawn::new(UnitKind::Tank, FactionId::Player, pos(1000, 1000)),
                UnitSpawn::new(UnitKind::Tank, FactionId::Player, pos(1000, 1040)),
                UnitSpawn {
                    hp: Some(10),
                    ..UnitSpawn::new(UnitKind::Sweeper, FactionId::Enemy, pos(1150, 1020)).stationary()
                },
            ],
            ..WorldSeed::default()
        };
        let mut sim = Simulation::from_seed(SimConfig::default(), &world);
        let mut log = Vec::new();
        for _ in 0..20 {
            log.extend(sim.tick(tick_dt(), &[]).events);
        }
        let hits = log
            .iter()
            .filter(|e| matches!(e, GameEvent::Combat(CombatEvent::Hit { .. })))
            .count();
        let fizzles = log
            .iter()
            .filter(|e| matches!(e, GameEvent::Combat(CombatEvent::Fizzled { .. })))
            .count();
        assert_eq!((hits, fizzles), (1, 1));
        assert!(sim.projectiles().is_empty());
    }
}

// =============================================================================
// Scenario files
// =============================================================================

mod scenario_files {
    use super::*;

    #[test]
    fn test_scripted_scenario_runs_to_completion() {
        let text = r#"(
            name: "script",
            ticks: 60,
            world: Some((
                buildings: [
                    (kind: Hq, faction: Player, position: (500.0, 500.0)),
                    (kind: Hq, faction: Enemy, position: (5500.0, 5500.0)),
                ],
            )),
            commands: [
                (tick: 0, command: Enqueue(building: 1, kind: Soldier)),
                (tick: 3, command: Enqueue(building: 1, kind: Tank)),
            ],
        )"#;
        let scenario = Scenario::from_ron_str(text).unwrap();
        let config = SimConfig::default();
        let mut sim = Simulation::from_seed(config, &scenario.world_seed(&config));

        let mut reports = Vec::new();
        for tick in 0..scenario.ticks {
            let due: Vec<_> = scenario.commands_at(tick).cloned().collect();
            reports.push(sim.tick(scenario.dt, &due));
        }

        let rejected: usize = reports.iter().map(|r| r.rejections.len()).sum();
        assert_eq!(rejected, 1);
        let produced: usize = reports.iter().map(TickEvents::units_produced).sum();
        assert_eq!(produced, 1);
        assert_eq!(sim.snapshot().unit_count(FactionId::Player), 1);
        assert_eq!(sim.tick_count(), 60);
    }
}
