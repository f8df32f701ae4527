//! Determinization benchmarks.
//!
//! Safra's construction dominates the cost of every complement, so these
//! benchmarks track it over seeded random automata of growing size.
//!
//! Run with:
//! ```bash
//! cargo bench --bench determinize
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use buchi_rs::determinize::Safra;
use buchi_rs::nbw::Nbw;

fn bench_random_determinization(c: &mut Criterion) {
    let mut group = c.benchmark_group("determinize_random");
    for &size in &[3usize, 4, 5, 6] {
        let mut rng = ChaCha8Rng::seed_from_u64(0xca5e);
        let nbw = Nbw::random(size, 2, 0.4, 0.3, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(size), &nbw, |b, nbw| {
            b.iter(|| {
                Safra::new(nbw)
                    .save_trees(false)
                    .run()
                    .expect("uncapped run")
                    .size()
            })
        });
    }
    group.finish();
}

fn bench_complement_pipeline(c: &mut Criterion) {
    c.bench_function("complement_4_states", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(0xbeef);
            let mut nbw = Nbw::random(4, 2, 0.4, 0.3, &mut rng);
            nbw.complement().size()
        })
    });
}

criterion_group!(benches, bench_random_determinization, bench_complement_pipeline);
criterion_main!(benches);
