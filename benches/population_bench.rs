//! Spawner update throughput for growing wanderer and pursuer populations

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use voxel_agents::core::config::SimulationConfig;
use voxel_agents::entity::{Archetype, PopulationCap};
use voxel_agents::simulation::{PlayerState, Spawner, TickContext};
use voxel_agents::world::VoxelMap;

fn make_world() -> VoxelMap {
    VoxelMap::from_fn((-64, -64), (128, 128), 4, -1, |x, z| {
        4 + ((x as f32 * 0.1).sin() * 2.0 + (z as f32 * 0.08).cos() * 2.0) as i32
    })
}

fn make_spawner(mut archetype: Archetype, n: usize, world: &VoxelMap, anchor: Vec3) -> Spawner {
    archetype.spawn.cap = PopulationCap::Fixed { max: n };
    archetype.spawn.despawn_radius = 1000.0;
    archetype.spawn.engaged_despawn_radius = 1000.0;
    let mut spawner = Spawner::new(archetype, 7);
    while spawner.count() < n {
        spawner.try_spawn(anchor, world);
    }
    spawner
}

fn bench_wanderers(c: &mut Criterion) {
    let world = make_world();
    let config = SimulationConfig::default();
    let ctx = TickContext::new(&world, &config);
    let hazards = [Vec3::new(10.0, 6.0, 10.0)];
    let ctx = ctx.with_hazards(&hazards);

    let mut group = c.benchmark_group("wanderer_update");
    for &n in &[10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let anchor = Vec3::new(0.5, 8.0, 0.5);
            let mut spawner = make_spawner(Archetype::passive_wanderer(), n, &world, anchor);
            let mut player = PlayerState::new(anchor);
            b.iter(|| {
                spawner.update(0.016, Some(&mut player), &ctx);
            });
        });
    }
    group.finish();
}

fn bench_pursuers(c: &mut Criterion) {
    let world = make_world();
    let config = SimulationConfig::default();
    let ctx = TickContext::new(&world, &config).with_escalation(5);

    let mut group = c.benchmark_group("pursuer_chase");
    for &n in &[10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let anchor = Vec3::new(0.5, 8.0, 0.5);
            let mut spawner = make_spawner(Archetype::pursuer(), n, &world, anchor);
            spawner.add_wanted(5);
            let mut player = PlayerState::new(anchor);
            b.iter(|| {
                spawner.update(0.016, Some(&mut player), &ctx);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_wanderers, bench_pursuers);
criterion_main!(benches);
