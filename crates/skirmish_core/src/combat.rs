//! Target selection, firing and projectile flight.
//!
//! Shooters are live units with a [`Combatant`] block and complete fixed
//! defenses. A ready shooter picks the nearest hostile unit in range, or
//! failing that the nearest hostile building, and launches a [`Projectile`]
//! at the target's current position. Projectiles are bound to their target
//! by handle: if it vanishes before impact the shot is discarded harmlessly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buildings::Building;
use crate::components::{Arena, Combatant, EntityId, IdAllocator};
use crate::config::{DefenseProfile, EconomyConfig, ProjectileConfig};
use crate::factions::FactionId;
use crate::geometry::point_segment_distance_squared;
use crate::ledger::Ledger;
use crate::math::{cos_degrees, fixed_serde, Fixed, Vec2Fixed};
use crate::units::Unit;

/// Weapon and facing of a fixed defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedDefense {
    /// The gun.
    pub weapon: Combatant,
    /// Unit vector the defense is facing.
    pub facing: Vec2Fixed,
    /// Width of the firing arc in degrees.
    #[serde(with = "fixed_serde")]
    pub fov_degrees: Fixed,
}

impl FixedDefense {
    /// Defense facing +X with the given profile.
    #[must_use]
    pub fn from_profile(profile: DefenseProfile) -> Self {
        Self {
            weapon: Combatant::new(profile.damage, profile.range, profile.cooldown),
            facing: Vec2Fixed::new(Fixed::ONE, Fixed::ZERO),
            fov_degrees: profile.fov_degrees,
        }
    }

    /// Turn to face `target` as seen from `from`.
    pub fn aim_at(&mut self, from: Vec2Fixed, target: Vec2Fixed) {
        let dir = (target - from).normalize();
        if !dir.is_zero() {
            self.facing = dir;
        }
    }

    /// Whether `target` lies inside the firing arc.
    ///
    /// Compares the cosine of the angle to the target against
    /// `cos(fov / 2)`, so no inverse trigonometry is needed.
    #[must_use]
    pub fn in_arc(&self, from: Vec2Fixed, target: Vec2Fixed) -> bool {
        let dir = (target - from).normalize();
        if dir.is_zero() {
            return true;
        }
        let half = self.fov_degrees / Fixed::from_num(2);
        self.facing.dot(dir) >= cos_degrees(half)
    }
}

/// What a projectile is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileTarget {
    /// A unit, hit by passing close to it.
    Unit(EntityId),
    /// A building, hit by touching its footprint.
    Building(EntityId),
}

/// A shot in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    /// Stable handle.
    pub id: EntityId,
    /// Who fired it.
    pub source: EntityId,
    /// Side that fired it.
    pub faction: FactionId,
    /// Current position.
    pub position: Vec2Fixed,
    /// Displacement per second.
    pub velocity: Vec2Fixed,
    /// Damage on impact.
    pub damage: u32,
    /// Bound target.
    pub target: ProjectileTarget,
    /// Projectile radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Seconds left before it is discarded.
    #[serde(with = "fixed_serde")]
    pub ttl: Fixed,
}

/// Something that happened in combat this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A shooter launched a projectile.
    Fired {
        /// The shooter.
        shooter: EntityId,
        /// The new projectile.
        projectile: EntityId,
        /// Its target.
        target: ProjectileTarget,
    },
    /// A projectile struck its target.
    Hit {
        /// The projectile.
        projectile: EntityId,
        /// The target.
        target: ProjectileTarget,
        /// Damage dealt.
        damage: u32,
    },
    /// A target was reduced to zero hit points.
    Destroyed {
        /// The target.
        target: ProjectileTarget,
        /// Side whose shot finished it.
        by: FactionId,
        /// Bounty credited to the ledger.
        bounty: u32,
    },
    /// A projectile's target vanished before impact.
    Fizzled {
        /// The projectile.
        projectile: EntityId,
    },
    /// A projectile ran out of time without hitting.
    Expired {
        /// The projectile.
        projectile: EntityId,
    },
}

/// Nearest hostile target in range, preferring units over buildings.
///
/// Ties go to the lowest id. Buildings are measured to their centre.
#[must_use]
pub fn find_target(
    from: Vec2Fixed,
    range: Fixed,
    faction: FactionId,
    units: &Arena<Unit>,
    buildings: &Arena<Building>,
) -> Option<(ProjectileTarget, Vec2Fixed)> {
    let range_sq = range * range;

    let nearest = |candidates: &mut dyn Iterator<Item = (EntityId, Vec2Fixed)>| {
        let mut best: Option<(EntityId, Vec2Fixed, Fixed)> = None;
        for (id, position) in candidates {
            let d2 = from.distance_squared(position);
            if d2 > range_sq {
                continue;
            }
            if best.map_or(true, |(_, _, best_d2)| d2 < best_d2) {
                best = Some((id, position, d2));
            }
        }
        best.map(|(id, position, _)| (id, position))
    };

    let mut hostile_units = units
        .iter()
        .filter(|(_, u)| u.is_alive() && faction.is_hostile_to(u.faction))
        .map(|(id, u)| (id, u.position));
    if let Some((id, position)) = nearest(&mut hostile_units) {
        return Some((ProjectileTarget::Unit(id), position));
    }

    let mut hostile_buildings = buildings
        .iter()
        .filter(|(_, b)| b.is_alive() && faction.is_hostile_to(b.faction))
        .map(|(id, b)| (id, b.position));
    nearest(&mut hostile_buildings).map(|(id, position)| (ProjectileTarget::Building(id), position))
}

fn launch(
    ids: &mut IdAllocator,
    config: &ProjectileConfig,
    source: EntityId,
    faction: FactionId,
    from: Vec2Fixed,
    damage: u32,
    target: ProjectileTarget,
    aim: Vec2Fixed,
) -> Projectile {
    let speed = match target {
        ProjectileTarget::Unit(_) => config.speed_vs_units,
        ProjectileTarget::Building(_) => config.speed_vs_buildings,
    };
    Projectile {
        id: ids.allocate(),
        source,
        faction,
        position: from,
        velocity: (aim - from).normalize().scale(speed),
        damage,
        target,
        radius: config.radius,
        ttl: config.ttl,
    }
}

/// Cool weapons down and fire every ready shooter that has a target.
pub fn combat_system(
    units: &mut Arena<Unit>,
    buildings: &mut Arena<Building>,
    projectiles: &mut Arena<Projectile>,
    ids: &mut IdAllocator,
    config: &ProjectileConfig,
    dt: Fixed,
) -> Vec<CombatEvent> {
    let mut events = Vec::new();

    // Mobile units.
    for id in units.ids() {
        let Some(unit) = units.get_mut(id) else {
            continue;
        };
        if !unit.is_alive() {
            continue;
        }
        let Some(weapon) = unit.combatant.as_mut() else {
            continue;
        };
        weapon.tick_cooldown(dt);
        if !weapon.is_ready() {
            continue;
        }
        let (from, faction, range, damage) = (unit.position, unit.faction, weapon.range, weapon.damage);

        let Some((target, aim)) = find_target(from, range, faction, units, buildings) else {
            continue;
        };
        let projectile = launch(ids, config, id, faction, from, damage, target, aim);
        events.push(CombatEvent::Fired {
            shooter: id,
            projectile: projectile.id,
            target,
        });
        projectiles.insert(projectile.id, projectile);

        if let Some(weapon) = units.get_mut(id).and_then(|u| u.combatant.as_mut()) {
            weapon.reset_cooldown();
        }
    }

    // Fixed defenses. The cooldown runs even while under construction.
    for id in buildings.ids() {
        let Some(building) = buildings.get_mut(id) else {
            continue;
        };
        let operational = building.is_alive() && building.is_complete();
        let (from, faction) = (building.position, building.faction);
        let Some(defense) = building.defense.as_mut() else {
            continue;
        };
        defense.weapon.tick_cooldown(dt);
        if !operational {
            continue;
        }
        let (range, damage) = (defense.weapon.range, defense.weapon.damage);

        let Some((target, aim)) = find_target(from, range, faction, units, buildings) else {
            continue;
        };
        let Some(defense) = buildings.get_mut(id).and_then(|b| b.defense.as_mut()) else {
            continue;
        };
        defense.aim_at(from, aim);
        if !defense.weapon.is_ready() || !defense.in_arc(from, aim) {
            continue;
        }
        defense.weapon.reset_cooldown();

        let projectile = launch(ids, config, id, faction, from, damage, target, aim);
        events.push(CombatEvent::Fired {
            shooter: id,
            projectile: projectile.id,
            target,
        });
        projectiles.insert(projectile.id, projectile);
    }

    events
}

/// Move projectiles, resolve impacts and pay kill bounties.
///
/// Unit targets are hit when the segment travelled this tick passes within
/// the hit threshold of the target; building targets when the swept
/// projectile touches the footprint.
pub fn projectile_system(
    projectiles: &mut Arena<Projectile>,
    units: &mut Arena<Unit>,
    buildings: &mut Arena<Building>,
    ledger: &mut Ledger,
    config: &ProjectileConfig,
    economy: &EconomyConfig,
    dt: Fixed,
) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let threshold = config.hit_threshold();
    let mut spent = Vec::new();

    for (id, projectile) in projectiles.iter_mut() {
        let target_alive = match projectile.target {
            ProjectileTarget::Unit(t) => units.get(t).is_some_and(Unit::is_alive),
            ProjectileTarget::Building(t) => buildings.get(t).is_some_and(Building::is_alive),
        };
        if !target_alive {
            events.push(CombatEvent::Fizzled { projectile: id });
            spent.push(id);
            continue;
        }

        let start = projectile.position;
        projectile.position += projectile.velocity.scale(dt);
        projectile.ttl -= dt;
        let end = projectile.position;

        let (hit, bounty, health) = match projectile.target {
            ProjectileTarget::Unit(t) => {
                let Some(unit) = units.get_mut(t) else {
                    continue;
                };
                let hit = point_segment_distance_squared(unit.position, start, end) <= threshold * threshold;
                (hit, economy.unit_bounty, &mut unit.health)
            }
            ProjectileTarget::Building(t) => {
                let Some(building) = buildings.get_mut(t) else {
                    continue;
                };
                let hit = building.footprint.segment_within(start, end, projectile.radius);
                (hit, economy.building_bounty, &mut building.health)
            }
        };

        if hit {
            let dealt = health.apply_damage(projectile.damage);
            events.push(CombatEvent::Hit {
                projectile: id,
                target: projectile.target,
                damage: dealt,
            });
            if health.is_dead() {
                let bounty = if projectile.faction == FactionId::Player {
                    ledger.add(bounty);
                    bounty
                } else {
                    0
                };
                debug!(target = ?projectile.target, by = ?projectile.faction, bounty, "target destroyed");
                events.push(CombatEvent::Destroyed {
                    target: projectile.target,
                    by: projectile.faction,
                    bounty,
                });
            }
            spent.push(id);
        } else if projectile.ttl <= Fixed::ZERO {
            events.push(CombatEvent::Expired { projectile: id });
            spent.push(id);
        }
    }

    for id in spent {
        projectiles.remove(id);
    }

    events
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

    fn soldier(id: EntityId, faction: FactionId, at: Vec2Fixed) -> Unit {
        Unit::new(id, UnitKind::Soldier, faction, at, &SimConfig::default())
    }

    #[test]
    fn test_arc_test_uses_half_fov() {
        let profile = SimConfig::default().buildings.fortin.defense.unwrap();
        let defense = FixedDefense::from_profile(profile);
        let from = pos(0, 0);

        // Facing +X with 180 degrees: everything with x > 0 is in arc.
        assert!(defense.in_arc(from, pos(100, 0)));
        assert!(defense.in_arc(from, pos(1, 100)));
        assert!(defense.in_arc(from, pos(1, -100)));
        assert!(!defense.in_arc(from, pos(-10, 100)));
        assert!(!defense.in_arc(from, pos(-100, 0)));
    }

    #[test]
    fn test_narrow_arc() {
        let mut defense = FixedDefense::from_profile(DefenseProfile {
            damage: 1,
            range: Fixed::from_num(100),
            cooldown: Fixed::ONE,
            fov_degrees: Fixed::from_num(90),
        });
        let from = pos(0, 0);
        assert!(defense.in_arc(from, pos(100, 90)));
        assert!(!defense.in_arc(from, pos(100, 110)));

        defense.aim_at(from, pos(0, 50));
        assert!(defense.in_arc(from, pos(0, 100)));
        assert!(!defense.in_arc(from, pos(100, 0)));
    }

    #[test]
    fn test_target_prefers_units_and_lowest_id() {
        let config = SimConfig::default();
        let mut units = Arena::new();
        units.insert(5, soldier(5, FactionId::Enemy, pos(100, 0)));
        units.insert(3, soldier(3, FactionId::Enemy, pos(0, 100)));
        units.insert(2, soldier(2, FactionId::Player, pos(10, 0)));
        let mut buildings = Arena::new();
        buildings.insert(
            9,
            Building::complete(9, BuildingKind::Hq, FactionId::Enemy, pos(50, 0), &config),
        );

        let found = find_target(pos(0, 0), Fixed::from_num(200), FactionId::Player, &units, &buildings);
        assert_eq!(found, Some((ProjectileTarget::Unit(3), pos(0, 100))));

        units.remove(3);
        units.remove(5);
        let found = find_target(pos(0, 0), Fixed::from_num(200), FactionId::Player, &units, &buildings);
        assert_eq!(found, Some((ProjectileTarget::Building(9), pos(50, 0))));

        let found = find_target(pos(0, 0), Fixed::from_num(40), FactionId::Player, &units, &buildings);
        assert_eq!(found, None);
    }

    #[test]
    fn test_fire_resets_cooldown_and_spawns_projectile() {
        let config = SimConfig::default();
        let mut units = Arena::new();
        units.insert(1, soldier(1, FactionId::Player, pos(0, 0)));
        units.insert(2, soldier(2, FactionId::Enemy, pos(150, 0)));
        let mut buildings = Arena::new();
        let mut projectiles = Arena::new();
        let mut ids = IdAllocator::default();
        ids.allocate();
        ids.allocate();

        let events = combat_system(
            &mut units,
            &mut buildings,
            &mut projectiles,
            &mut ids,
            &config.projectiles,
            Fixed::from_num(0.1),
        );
        assert_eq!(events.len(), 2);
        assert_eq!(projectiles.len(), 2);
        let shot = projectiles.get(3).unwrap();
        assert_eq!(shot.source, 1);
        assert_eq!(shot.target, ProjectileTarget::Unit(2));
        assert_eq!(shot.velocity.y, Fixed::ZERO);
        assert!((shot.velocity.x - Fixed::from_num(560)).abs() < Fixed::from_num(0.01));
        assert_eq!(
            units.get(1).and_then(|u| u.combatant).map(|w| w.cooldown_left),
            Some(Fixed::from_num(0.6))
        );
    }

    #[test]
    fn test_projectile_hits_and_pays_bounty() {
        let config = SimConfig::default();
        let mut units = Arena::new();
        units.insert(2, soldier(2, FactionId::Enemy, pos(100, 0)).with_hp(10));
        let mut buildings = Arena::new();
        let mut projectiles = Arena::new();
        projectiles.insert(
            7,
            Projectile {
                id: 7,
                source: 1,
                faction: FactionId::Player,
                position: pos(0, 0),
                velocity: pos(560, 0),
                damage: 10,
                target: ProjectileTarget::Unit(2),
                radius: Fixed::from_num(4),
                ttl: Fixed::from_num(3),
            },
        );
        let mut ledger = Ledger::new(0);

        let events = projectile_system(
            &mut projectiles,
            &mut units,
            &mut buildings,
            &mut ledger,
            &config.projectiles,
            &config.economy,
            Fixed::from_num(0.25),
        );
        assert!(events.contains(&CombatEvent::Hit {
            projectile: 7,
            target: ProjectileTarget::Unit(2),
            damage: 10
        }));
        assert!(projectiles.is_empty());
        assert!(units.get(2).is_some_and(|u| !u.is_alive()));
        assert_eq!(ledger.balance(), config.economy.unit_bounty);
    }

    #[test]
    fn test_projectile_with_vanished_target_fizzles() {
        let config = SimConfig::default();
        let mut units: Arena<Unit> = Arena::new();
        let mut projectiles = Arena::new();
        projectiles.insert(
            7,
            Projectile {
                id: 7,
                source: 1,
                faction: FactionId::Enemy,
                position: pos(0, 0),
                velocity: pos(560, 0),
                damage: 10,
                target: ProjectileTarget::Unit(2),
                radius: Fixed::from_num(4),
                ttl: Fixed::from_num(3),
            },
        );
        let mut ledger = Ledger::new(0);

        let events = projectile_system(
            &mut projectiles,
            &mut units,
            &mut Arena::new(),
            &mut ledger,
            &config.projectiles,
            &config.economy,
            Fixed::from_num(0.25),
        );
        assert_eq!(events, vec![CombatEvent::Fizzled { projectile: 7 }]);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn test_projectile_expires() {
        let config = SimConfig::default();
        let mut units = Arena::new();
        // Target far off the flight line.
        units.insert(2, soldier(2, FactionId::Player, pos(0, 500)));
        let mut projectiles = Arena::new();
        projectiles.insert(
            7,
            Projectile {
                id: 7,
                source: 1,
                faction: FactionId::Enemy,
                position: pos(0, 0),
                velocity: pos(560, 0),
                damage: 10,
                target: ProjectileTarget::Unit(2),
                radius: Fixed::from_num(4),
                ttl: Fixed::from_num(1),
            },
        );
        let mut ledger = Ledger::new(0);
        let mut buildings = Arena::new();

        let mut expired = false;
        for _ in 0..4 {
            let events = projectile_system(
                &mut projectiles,
                &mut units,
                &mut buildings,
                &mut ledger,
                &config.projectiles,
                &config.economy,
                Fixed::from_num(0.25),
            );
            expired |= events.contains(&CombatEvent::Expired { projectile: 7 });
        }
        assert!(expired);
        assert!(projectiles.is_empty());
        assert_eq!(units.get(2).map(|u| u.health.current), Some(100));
    }

    #[test]
    fn test_fast_shot_cannot_tunnel_through_building() {
        let config = SimConfig::default();
        let mut buildings = Arena::new();
        buildings.insert(
            2,
            Building::complete(2, BuildingKind::Depot, FactionId::Enemy, pos(300, 0), &config),
        );
        let mut projectiles = Arena::new();
        projectiles.insert(
            7,
            Projectile {
                id: 7,
                source: 1,
                faction: FactionId::Player,
                // Starts short of the rect and ends beyond it in one tick.
                position: pos(200, 0),
                velocity: pos(540, 0),
                damage: 30,
                target: ProjectileTarget::Building(2),
                radius: Fixed::from_num(4),
                ttl: Fixed::from_num(3),
            },
        );
        let mut ledger = Ledger::new(0);

        projectile_system(
            &mut projectiles,
            &mut Arena::new(),
            &mut buildings,
            &mut ledger,
            &config.projectiles,
            &config.economy,
            Fixed::from_num(0.5),
        );
        assert_eq!(buildings.get(2).map(|b| b.health.current), Some(270));
        assert!(projectiles.is_empty());
    }
}
