use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kinetic_movers::*;
use std::hint::black_box;

const FRAME: f64 = 16.6667;

fn prepare_world(entity_count: usize) -> MoverWorld {
    let mut world = MoverWorld::new();
    for i in 0..entity_count {
        let entity = world.spawn();
        let offset = i as f64 * 0.1;
        world
            .add_mover(entity, MoverSpec::scalar("opacity", MoverInitialState::at(0.0)))
            .unwrap();
        world
            .add_mover(
                entity,
                MoverSpec::planar("position", MoverInitialState::at(DVec2::ZERO)),
            )
            .unwrap();
        world
            .add_mover(
                entity,
                MoverSpec::spatial("rotation", MoverInitialState::at(DVec3::ZERO)),
            )
            .unwrap();
        world.set_goal(entity, "opacity", 1.0 + offset).unwrap();
        world
            .set_goal(entity, "position", DVec2::new(100.0 + offset, 40.0))
            .unwrap();
        world
            .set_goal(entity, "rotation", DVec3::new(0.0, offset, 3.0))
            .unwrap();
    }
    world
}

fn bench_world_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");
    for &count in &[128usize, 512, 2048] {
        group.bench_with_input(
            BenchmarkId::new("sequential", count),
            &count,
            |b, &count| {
                b.iter(|| {
                    let mut world = prepare_world(count);
                    world.set_parallel_enabled(false);
                    black_box(world.tick(black_box(FRAME)));
                })
            },
        );
        group.bench_with_input(BenchmarkId::new("parallel", count), &count, |b, &count| {
            b.iter(|| {
                let mut world = prepare_world(count);
                world.set_parallel_enabled(true);
                black_box(world.tick(black_box(FRAME)));
            })
        });
    }
    group.finish();
}

fn bench_substeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("substeps");
    let params = PhysicsParameters::defaults(MoverKind::ThreeD);
    for &frame in &[8.0f64, 16.6667, 250.0] {
        group.bench_with_input(BenchmarkId::new("spring_3d", frame), &frame, |b, &frame| {
            b.iter(|| {
                let mut state = StepState {
                    position: DVec3::ZERO,
                    velocity: DVec3::ZERO,
                };
                black_box(run_substeps(
                    &mut state,
                    DVec3::splat(100.0),
                    MoveMode::Spring,
                    &params,
                    black_box(frame),
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_world_tick, bench_substeps);
criterion_main!(benches);
