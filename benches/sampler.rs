//! Micro-benchmarks of the hot path of the collision loop: the rejection
//! sampler pair and the free-path draw.

use criterion::{Criterion, criterion_group, criterion_main};
use kinetic_lib::collision::CollisionSampler;
use kinetic_lib::collision::proposal::ProposalTable;
use kinetic_lib::particle::physics::sample_free_path;
use kinetic_lib::vector::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

fn sampler_benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let table = ProposalTable::build((4.0, 300.0), 400.0, 4.0, &mut rng);
    let sampler = CollisionSampler::new(191.0, 4.0, &table);

    c.bench_function("collision_pair_sample", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| sampler.sample(black_box(120.0), black_box(4.0), &mut rng))
    });

    c.bench_function("collision_scatter", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        let velocity = Vec3::new(30.0, -12.0, 140.0);
        let bulk = Vec3::new(0.0, 0.0, 60.0);
        b.iter(|| {
            sampler.scatter(
                black_box(&velocity),
                black_box(&bulk),
                black_box(160.0),
                black_box(0.8),
                &mut rng,
            )
        })
    });

    c.bench_function("free_path_draw", |b| {
        let mut rng = StdRng::seed_from_u64(4);
        b.iter(|| sample_free_path(&mut rng, black_box(0.002)))
    });
}

criterion_group!(benches, sampler_benchmarks);
criterion_main!(benches);
