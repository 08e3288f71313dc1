//! Simulation benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use skirmish_core::config::SimConfig;
use skirmish_core::math::Fixed;
use skirmish_core::simulation::{tick_dt, Simulation, TICK_RATE};
use skirmish_core::world_gen;

fn dt() -> Fixed {
    tick_dt()
}

/// Tick cost on a freshly generated world, and world generation itself.
pub fn simulation_benchmark(c: &mut Criterion) {
    let config = SimConfig::default();
    let world = world_gen::generate(42, &config);

    c.bench_function("world_gen", |b| {
        b.iter(|| world_gen::generate(black_box(42), &config));
    });

    c.bench_function("tick_generated_world", |b| {
        b.iter_batched(
            || Simulation::from_seed(config, &world),
            |mut sim| {
                sim.tick(dt(), &[]);
                sim
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("run_10s_generated_world", |b| {
        b.iter_batched(
            || Simulation::from_seed(config, &world),
            |mut sim| {
                for _ in 0..(TICK_RATE * 10) {
                    sim.tick(dt(), &[]);
                }
                sim.state_hash()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
