// Search benchmarks: a walker and a flyer crossing a field with a wall.

use std::collections::BTreeSet;

use blockpath::{AgentProfile, BlockPos, BlockState, Locomotion, Pathfinder, PathfindingConfig, VoxelWorld};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// 64×64 stone field, top at y=3, with a wall at x=32 open only near z=56.
fn terrain() -> VoxelWorld {
    let mut world = VoxelWorld::new(BlockPos::new(0, 0, 0), 64, 16, 64);
    world.fill(BlockPos::new(0, 0, 0), BlockPos::new(63, 3, 63), BlockState::SOLID);
    world.fill(BlockPos::new(32, 4, 0), BlockPos::new(32, 5, 54), BlockState::SOLID);
    world
}

fn find_path_benchmarks(c: &mut Criterion) {
    let world = terrain();
    let config = PathfindingConfig {
        max_visited_nodes: 4000,
        ..PathfindingConfig::default()
    };
    let targets = BTreeSet::from([BlockPos::new(48, 4, 16)]);

    let walker = AgentProfile::walker();
    let mut ground = Pathfinder::from_config(&config, Locomotion::Ground);
    c.bench_function("ground_around_wall", |b| {
        b.iter(|| {
            let mut agent = walker.spawn(8.5, 4.0, 16.5);
            ground.find_path(black_box(&world), &mut agent, &targets, 64.0, 1, 1.0)
        })
    });

    let flyer = AgentProfile::flyer();
    let mut flying = Pathfinder::from_config(&config, Locomotion::Flying);
    c.bench_function("flying_over_wall", |b| {
        b.iter(|| {
            let mut agent = flyer.spawn(8.5, 4.0, 16.5);
            flying.find_path(black_box(&world), &mut agent, &targets, 64.0, 1, 1.0)
        })
    });
}

criterion_group!(benches, find_path_benchmarks);
criterion_main!(benches);
