//! Shared component types.
//!
//! Components are plain data. Units and buildings are records that carry a
//! handful of these, and the systems in the other modules operate on them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for entities.
///
/// Ids come from one counter shared by every arena, so a handle never
/// refers to two things and is never reused within a match.
pub type EntityId = u64;

/// Hands out entity ids, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdAllocator {
    next_id: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl IdAllocator {
    /// Reserve the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub const fn peek(&self) -> EntityId {
        self.next_id
    }
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if entity is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }
}

/// Straight-line movement toward an optional target point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movement {
    /// Distance covered per second.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Where the entity is heading, if anywhere.
    pub target: Option<Vec2Fixed>,
}

impl Movement {
    /// Stopped movement with the given speed.
    #[must_use]
    pub const fn new(speed: Fixed) -> Self {
        Self {
            speed,
            target: None,
        }
    }

    /// Head toward `point`.
    pub fn move_to(&mut self, point: Vec2Fixed) {
        self.target = Some(point);
    }

    /// Drop the current target.
    pub fn stop(&mut self) {
        self.target = None;
    }

    /// Advance `position` toward the target by `speed * dt`.
    ///
    /// Snaps onto the target once it is within one step and clears it.
    /// Returns true if the target was reached this call.
    pub fn step(&mut self, position: &mut Vec2Fixed, dt: Fixed) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let step = self.speed * dt;
        let offset = target - *position;
        if offset.dot(offset) <= step * step {
            *position = target;
            self.target = None;
            return true;
        }

        *position += offset.normalize().scale(step);
        false
    }
}

/// Weapon block shared by mobile combatants and fixed defenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combatant {
    /// Damage per projectile.
    pub damage: u32,
    /// Maximum engagement distance.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Seconds between shots.
    #[serde(with = "fixed_serde")]
    pub cooldown: Fixed,
    /// Seconds until the next shot is allowed.
    #[serde(with = "fixed_serde")]
    pub cooldown_left: Fixed,
}

impl Combatant {
    /// Ready-to-fire weapon.
    #[must_use]
    pub const fn new(damage: u32, range: Fixed, cooldown: Fixed) -> Self {
        Self {
            damage,
            range,
            cooldown,
            cooldown_left: Fixed::ZERO,
        }
    }

    /// Count the cooldown down, floored at zero.
    pub fn tick_cooldown(&mut self, dt: Fixed) {
        self.cooldown_left = (self.cooldown_left - dt).max(Fixed::ZERO);
    }

    /// Whether the weapon may fire this tick.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown_left <= Fixed::ZERO
    }

    /// Restart the cooldown after a shot.
    pub fn reset_cooldown(&mut self) {
        self.cooldown_left = self.cooldown;
    }
}

/// Looping waypoint route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatrolRoute {
    /// Waypoints visited in order, wrapping around.
    pub waypoints: Vec<Vec2Fixed>,
    /// Index of the waypoint currently headed for.
    pub next: usize,
}

impl PatrolRoute {
    /// Distance at which a waypoint counts as reached.
    pub const ARRIVE_THRESHOLD: i32 = 10;

    /// Route starting at the first waypoint.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2Fixed>) -> Self {
        Self { waypoints, next: 0 }
    }

    /// Current waypoint, advancing past it if `position` has arrived.
    pub fn current_waypoint(&mut self, position: Vec2Fixed) -> Option<Vec2Fixed> {
        let len = self.waypoints.len();
        if len == 0 {
            return None;
        }
        // A loaded route may carry a stale index.
        self.next %= len;
        let threshold = Fixed::from_num(Self::ARRIVE_THRESHOLD);
        if position.within(self.waypoints[self.next], threshold) {
            self.next = (self.next + 1) % len;
        }
        self.waypoints.get(self.next).copied()
    }
}

/// Storage for one kind of entity.
///
/// Backed by a `BTreeMap` so iteration is always in ascending id order,
/// which keeps every system deterministic without re-sorting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arena<T> {
    items: BTreeMap<EntityId, T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T> Arena<T> {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `item` under `id`, replacing anything already there.
    pub fn insert(&mut self, id: EntityId, item: T) {
        self.items.insert(id, item);
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.items.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains_key(&id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entity IDs in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.keys().copied().collect()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    /// Mutable iteration in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.items.iter_mut().map(|(id, item)| (*id, item))
    }

    /// Iterate over values in ascending id order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Drop every entity for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId, &T) -> bool) {
        self.items.retain(|id, item| keep(*id, item));
    }
}
