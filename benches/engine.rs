//! Benchmarks for the rollback engine: the per-frame tick with confirmed and
//! predicted inputs, and the rewind + re-simulate path at various depths.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rampart_rollback::{Frame, Input, PlayerSide, RollbackEngine, SimState};

fn fresh_engine() -> RollbackEngine {
    RollbackEngine::new(
        SimState::new(1).expect("non-zero seed"),
        128,
        PlayerSide::P1,
    )
    .expect("valid capacity")
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("engine/tick_confirmed", |b| {
        b.iter_batched(
            fresh_engine,
            |mut engine| {
                for f in 0..60u32 {
                    engine
                        .set_remote_input(Frame::new(f), Input::LEFT)
                        .expect("in-window delivery");
                    engine.tick(black_box(Input::RIGHT));
                }
                engine
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("engine/tick_predicted", |b| {
        b.iter_batched(
            fresh_engine,
            |mut engine| {
                for _ in 0..60 {
                    engine.tick(black_box(Input::RIGHT));
                }
                engine
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_rollback_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/rollback");
    for depth in [2u32, 8, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter_batched(
                || {
                    let mut engine = fresh_engine();
                    for _ in 0..depth {
                        engine.tick(Input::RIGHT);
                    }
                    engine
                },
                |mut engine| {
                    // The contradiction at frame 0 forces a full-depth
                    // rewind and re-simulation.
                    engine
                        .set_remote_input(Frame::ZERO, Input::LEFT)
                        .expect("in-window delivery");
                    engine
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick, bench_rollback_depth);
criterion_main!(benches);
