//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Scenario replays and batch balancing only mean something if a run is
//! reproducible bit for bit. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`skirmish_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Arenas always iterate in ascending entity id order.
//!
//! - **System randomness**: World generation takes an explicit seed.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual system determinism (movement, combat, etc.)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full scenarios are reproducible
//! 4. **Parallel tests**: Running N simulations in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skirmish_core::commands::ScheduledCommand;
use skirmish_core::simulation::Simulation;

use crate::fixtures::tick_dt;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Advance `sim` one standard tick, issuing whatever `script` schedules for it.
pub fn step_scripted(sim: &mut Simulation, script: &[ScheduledCommand]) {
    let due: Vec<_> = script
        .iter()
        .filter(|c| c.tick == sim.tick_count())
        .map(|c| c.command.clone())
        .collect();
    sim.tick(tick_dt(), &due);
}

/// Run the same setup and command script twice and compare final hashes.
///
/// # Example
///
/// ```
/// use skirmish_core::config::SimConfig;
/// use skirmish_core::simulation::Simulation;
/// use skirmish_test_utils::determinism::verify_simulation_determinism;
/// use skirmish_test_utils::fixtures::skirmish_world;
///
/// let world = skirmish_world();
/// let ok = verify_simulation_determinism(
///     || Simulation::from_seed(SimConfig::default(), &world),
///     &[],
///     50,
/// );
/// assert!(ok);
/// ```
pub fn verify_simulation_determinism<F>(
    setup_fn: F,
    script: &[ScheduledCommand],
    num_ticks: u64,
) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| step_scripted(sim, script),
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick(tick_dt(), &[]);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two runs tick by tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(tick)` for the first tick
/// whose hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, script: &[ScheduledCommand], num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        step_scripted(&mut sim1, script);
        step_scripted(&mut sim2, script);

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of simulation determinism.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::buildings::BuildingKind;
    use skirmish_core::commands::{Command, ScheduledCommand};
    use skirmish_core::components::EntityId;
    use skirmish_core::factions::FactionId;
    use skirmish_core::math::{Fixed, Vec2Fixed};
    use skirmish_core::scenario::UnitSpawn;
    use skirmish_core::units::UnitKind;

    /// Generate an on-map coordinate.
    ///
    /// Range: 0 to 6000 (default map size)
    pub fn arb_coordinate() -> impl Strategy<Value = Fixed> {
        (0i32..6000i32).prop_map(Fixed::from_num)
    }

    /// Generate an on-map position.
    pub fn arb_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Generate any unit kind.
    pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
        prop_oneof![
            Just(UnitKind::Soldier),
            Just(UnitKind::Tank),
            Just(UnitKind::Truck),
            Just(UnitKind::Sweeper),
            Just(UnitKind::Bulldozer),
            Just(UnitKind::Patrol),
        ]
    }

    /// Generate any building kind.
    pub fn arb_building_kind() -> impl Strategy<Value = BuildingKind> {
        prop_oneof![
            Just(BuildingKind::Hq),
            Just(BuildingKind::Depot),
            Just(BuildingKind::Garage),
            Just(BuildingKind::Fortin),
        ]
    }

    /// Generate either side.
    pub fn arb_faction() -> impl Strategy<Value = FactionId> {
        prop_oneof![Just(FactionId::Player), Just(FactionId::Enemy)]
    }

    /// Generate a unit spawn entry.
    pub fn arb_unit_spawn() -> impl Strategy<Value = UnitSpawn> {
        (arb_unit_kind(), arb_faction(), arb_position(), any::<bool>()).prop_map(
            |(kind, faction, position, stationary)| UnitSpawn {
                stationary,
                ..UnitSpawn::new(kind, faction, position)
            },
        )
    }

    /// Generate a command whose entity references fall in `1..max_id`.
    ///
    /// Many will be rejected, which is itself worth exercising.
    pub fn arb_command(max_id: EntityId) -> impl Strategy<Value = Command> {
        let id = 1..max_id.max(2);
        prop_oneof![
            (proptest::collection::vec(id.clone(), 1..4), arb_position())
                .prop_map(|(units, point)| Command::MoveTo { units, point }),
            (id.clone(), id.clone()).prop_map(|(truck, pile)| Command::AssignHaul { truck, pile }),
            (arb_building_kind(), arb_position())
                .prop_map(|(kind, point)| Command::OrderBuild { kind, point }),
            (id.clone(), arb_unit_kind()).prop_map(|(building, kind)| Command::Enqueue { building, kind }),
            id.prop_map(|sweeper| Command::ToggleAutoDisarm { sweeper }),
        ]
    }

    /// Generate a command schedule over the first `ticks` ticks.
    pub fn arb_script(
        max_id: EntityId,
        ticks: u64,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<ScheduledCommand>> {
        proptest::collection::vec(
            (0..ticks.max(1), arb_command(max_id))
                .prop_map(|(tick, command)| ScheduledCommand { tick, command }),
            0..max_len,
        )
    }
}
