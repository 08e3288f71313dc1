//! Seeded world generation.
//!
//! Reproduces the standard skirmish layout:
//! - the player's HQ, bulldozer and infantry squad near the start position
//! - random resource piles and mines scattered over the map, kept out of a
//!   safe radius around the start and spaced on a coarse grid
//! - three starter piles just outside the safe radius
//! - four enemy camps of rising difficulty, some ringed with mines
//!
//! The same seed always yields the same [`WorldSeed`].

use std::collections::BTreeSet;

use crate::buildings::BuildingKind;
use crate::config::SimConfig;
use crate::factions::FactionId;
use crate::math::{cos_degrees, sin_degrees, Fixed, Vec2Fixed};
use crate::scenario::{BuildingSpawn, MineSpawn, PileSpawn, UnitSpawn, WorldSeed};
use crate::units::UnitKind;

/// Centre of the player's starting area.
pub const START_POS: (i32, i32) = (700, 450);
/// Nothing random is placed closer than this to the start.
pub const SAFE_RADIUS: i32 = 500;
/// Random resource piles to place.
pub const RANDOM_PILES: usize = 40;
/// Random mines to place.
pub const RANDOM_MINES: usize = 70;
/// Stock range of random piles, inclusive.
pub const PILE_STOCK: (i32, i32) = (80, 260);
/// Stock range of starter piles, inclusive.
pub const STARTER_PILE_STOCK: (i32, i32) = (120, 220);
/// Starter piles placed just outside the safe radius.
pub const STARTER_PILES: usize = 3;
/// Distance from the map edge kept clear of random placements.
const EDGE_MARGIN: i32 = 80;
/// Coarse spacing grid: at most one random placement per cell.
const CELL: i32 = 64;
/// Attempts allowed per requested placement.
const ATTEMPTS_PER_ITEM: usize = 50;

/// Player soldier positions.
const PLAYER_SQUAD: [(i32, i32); 8] = [
    (400, 300),
    (600, 350),
    (800, 300),
    (1000, 500),
    (1200, 250),
    (1300, 300),
    (1350, 330),
    (1400, 310),
];

/// Hit points of camp tanks, lighter than produced ones.
const CAMP_TANK_HP: u32 = 160;

/// Deterministic linear congruential generator.
struct WorldRng {
    state: u64,
}

impl WorldRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        // The low bits of an LCG cycle quickly; use the high half.
        self.state >> 32
    }

    /// Uniform integer in `[min, max]`.
    fn range_inclusive(&mut self, min: i32, max: i32) -> i32 {
        let span = u64::from(max.abs_diff(min)) + 1;
        let offset = i64::try_from(self.next() % span).unwrap_or(0);
        i32::try_from(i64::from(min) + offset).unwrap_or(max)
    }
}

fn point(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

fn cell_of(p: (i32, i32)) -> (i32, i32) {
    (p.0.div_euclid(CELL), p.1.div_euclid(CELL))
}

struct Builder<'a> {
    config: &'a SimConfig,
    rng: WorldRng,
    world: WorldSeed,
    used_cells: BTreeSet<(i32, i32)>,
}

impl Builder<'_> {
    fn in_bounds(&self, p: Vec2Fixed) -> bool {
        self.config.map.contains(p)
    }

    fn unit(&mut self, spawn: UnitSpawn) {
        if self.in_bounds(spawn.position) {
            self.world.units.push(spawn);
        }
    }

    fn building(&mut self, kind: BuildingKind, faction: FactionId, p: Vec2Fixed) {
        if self.in_bounds(p) {
            self.world.buildings.push(BuildingSpawn {
                kind,
                faction,
                position: p,
                complete: true,
            });
        }
    }

    fn mine(&mut self, p: Vec2Fixed) {
        if self.in_bounds(p) {
            self.world.mines.push(MineSpawn {
                position: p,
                owner: Some(FactionId::Enemy),
            });
        }
    }

    fn pile(&mut self, p: Vec2Fixed, stock: u32) {
        if self.in_bounds(p) {
            self.world.piles.push(PileSpawn { position: p, stock });
        }
    }

    /// A random point away from the edges, the start area and earlier
    /// random placements.
    fn scatter_point(&mut self) -> Option<(i32, i32)> {
        let width: i32 = self.config.map.width.to_num();
        let height: i32 = self.config.map.height.to_num();
        if width <= 2 * EDGE_MARGIN || height <= 2 * EDGE_MARGIN {
            return None;
        }
        let x = self.rng.range_inclusive(EDGE_MARGIN, width - EDGE_MARGIN);
        let y = self.rng.range_inclusive(EDGE_MARGIN, height - EDGE_MARGIN);

        let (dx, dy) = (i64::from(x - START_POS.0), i64::from(y - START_POS.1));
        let safe = i64::from(SAFE_RADIUS);
        if dx * dx + dy * dy < safe * safe {
            return None;
        }
        if !self.used_cells.insert(cell_of((x, y))) {
            return None;
        }
        Some((x, y))
    }

    fn scatter_piles(&mut self) {
        let mut placed = 0;
        for _ in 0..RANDOM_PILES * ATTEMPTS_PER_ITEM {
            if placed == RANDOM_PILES {
                break;
            }
            if let Some((x, y)) = self.scatter_point() {
                let stock = self.rng.range_inclusive(PILE_STOCK.0, PILE_STOCK.1);
                self.pile(point(x, y), stock.unsigned_abs());
                placed += 1;
            }
        }
    }

    fn scatter_mines(&mut self) {
        let mut placed = 0;
        for _ in 0..RANDOM_MINES * ATTEMPTS_PER_ITEM {
            if placed == RANDOM_MINES {
                break;
            }
            if let Some((x, y)) = self.scatter_point() {
                self.mine(point(x, y));
                placed += 1;
            }
        }
    }

    fn starter_piles(&mut self) {
        let start = point(START_POS.0, START_POS.1);
        for _ in 0..STARTER_PILES {
            let angle = Fixed::from_num(self.rng.range_inclusive(0, 359));
            let distance = Fixed::from_num(SAFE_RADIUS + self.rng.range_inclusive(70, 200));
            let offset = Vec2Fixed::new(cos_degrees(angle), sin_degrees(angle)).scale(distance);
            let stock = self
                .rng
                .range_inclusive(STARTER_PILE_STOCK.0, STARTER_PILE_STOCK.1);
            // Near a map edge, mirror through the start instead.
            let p = if self.in_bounds(start + offset) {
                start + offset
            } else {
                start - offset
            };
            self.pile(p, stock.unsigned_abs());
        }
    }

    fn player_start(&mut self) {
        self.building(BuildingKind::Hq, FactionId::Player, point(700, 400));
        self.unit(UnitSpawn::new(
            UnitKind::Bulldozer,
            FactionId::Player,
            point(500, 500),
        ));
        for (x, y) in PLAYER_SQUAD {
            self.unit(UnitSpawn::new(UnitKind::Soldier, FactionId::Player, point(x, y)));
        }
    }

    /// Stationary soldiers in rows of four around `center`.
    fn soldier_group(&mut self, center: (i32, i32), count: i32) {
        const COLS: i32 = 4;
        const SPACING: i32 = 40;
        for i in 0..count {
            let (row, col) = (i / COLS, i % COLS);
            let p = point(
                center.0 + (col - COLS / 2) * SPACING,
                center.1 + (row - 1) * SPACING,
            );
            self.unit(UnitSpawn::new(UnitKind::Soldier, FactionId::Enemy, p).stationary());
        }
    }

    fn camp_tank(&mut self, at: (i32, i32)) {
        let mut tank = UnitSpawn::new(UnitKind::Tank, FactionId::Enemy, point(at.0, at.1)).stationary();
        tank.hp = Some(CAMP_TANK_HP);
        self.unit(tank);
    }

    /// `count` mines evenly spaced on a circle.
    fn mine_ring(&mut self, center: (i32, i32), radius: i32, count: i32) {
        let center = point(center.0, center.1);
        let radius = Fixed::from_num(radius);
        for i in 0..count {
            let angle = Fixed::from_num(360 * i) / Fixed::from_num(count);
            let offset = Vec2Fixed::new(cos_degrees(angle), sin_degrees(angle)).scale(radius);
            self.mine(center + offset);
        }
    }

    fn enemy_camps(&mut self) {
        // Outpost: infantry only.
        self.soldier_group((2200, 5200), 6);

        // Infantry, a fortin and a mine ring.
        self.soldier_group((4800, 4600), 8);
        self.building(BuildingKind::Fortin, FactionId::Enemy, point(4800, 4600));
        self.mine_ring((4800, 4600), 220, 8);

        // Infantry, a fortin and armour.
        self.soldier_group((5200, 2200), 10);
        self.camp_tank((5260, 2200));
        self.camp_tank((5140, 2240));
        self.building(BuildingKind::Fortin, FactionId::Enemy, point(5200, 2200));

        // Main base.
        let base = (3400, 3400);
        self.soldier_group((base.0, base.1 + 160), 10);
        self.camp_tank((base.0 + 120, base.1 - 40));
        self.camp_tank((base.0 - 120, base.1 - 40));
        self.building(BuildingKind::Hq, FactionId::Enemy, point(base.0, base.1));
        self.building(BuildingKind::Depot, FactionId::Enemy, point(base.0 + 160, base.1));
        self.building(BuildingKind::Garage, FactionId::Enemy, point(base.0 - 160, base.1));
        self.mine_ring(base, 260, 10);
    }
}

/// Generate the standard skirmish world for `seed`.
#[must_use]
pub fn generate(seed: u64, config: &SimConfig) -> WorldSeed {
    let mut builder = Builder {
        config,
        rng: WorldRng::new(seed),
        world: WorldSeed::default(),
        used_cells: BTreeSet::new(),
    };

    builder.player_start();
    builder.scatter_piles();
    builder.scatter_mines();
    builder.starter_piles();
    builder.enemy_camps();

    tracing::debug!(
        seed,
        units = builder.world.units.len(),
        buildings = builder.world.buildings.len(),
        mines = builder.world.mines.len(),
        piles = builder.world.piles.len(),
        "world generated"
    );
    builder.world
}
