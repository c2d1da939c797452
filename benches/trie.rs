//! Criterion benchmarks for trie build, point lookup, and range scans.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fstrie::Fst;

/// Sorted unique u64 keys with pseudo-random gaps.
fn generate_keys(count: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut keys = Vec::with_capacity(count);
    let mut current = 0u64;
    for _ in 0..count {
        current += rng.gen_range(1..64);
        keys.push(current);
    }
    keys
}

fn build_fst(keys: &[u64]) -> Fst<'static> {
    let values: Vec<u64> = (0..keys.len() as u64).collect();
    Fst::from_u64_keys(keys, &values).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [10_000, 100_000] {
        let keys = generate_keys(size, 42);
        let values: Vec<u64> = (0..size as u64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &keys, |b, keys| {
            b.iter(|| Fst::from_u64_keys(black_box(keys), black_box(&values)).unwrap());
        });
    }
    group.finish();
}

fn bench_point_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    for size in [10_000, 100_000] {
        let keys = generate_keys(size, 42);
        let fst = build_fst(&keys);

        let mut hits = keys.clone();
        hits.shuffle(&mut ChaCha8Rng::seed_from_u64(7));
        hits.truncate(1000);
        group.bench_with_input(BenchmarkId::new("hit", size), &hits, |b, hits| {
            b.iter(|| {
                let mut found = 0u64;
                for &k in hits {
                    if fst.lookup_u64(black_box(k)).is_some() {
                        found += 1;
                    }
                }
                found
            });
        });

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let misses: Vec<u64> = (0..1000)
            .map(|_| rng.gen_range(0..keys[keys.len() - 1]) | (1 << 63))
            .collect();
        group.bench_with_input(BenchmarkId::new("miss", size), &misses, |b, misses| {
            b.iter(|| {
                let mut found = 0u64;
                for &k in misses {
                    if fst.lookup_u64(black_box(k)).is_some() {
                        found += 1;
                    }
                }
                found
            });
        });
    }
    group.finish();
}

fn bench_greater_than(c: &mut Criterion) {
    let keys = generate_keys(100_000, 42);
    let fst = build_fst(&keys);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let probes: Vec<u64> = (0..1000).map(|_| rng.gen_range(0..keys[keys.len() - 1])).collect();

    c.bench_function("greater_than", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &p in &probes {
                let iter = fst.move_to_key_greater_than(&p.to_be_bytes(), true);
                if iter.is_valid() {
                    sum += iter.value();
                }
            }
            sum
        });
    });
}

fn bench_range_scan(c: &mut Criterion) {
    let keys = generate_keys(100_000, 42);
    let fst = build_fst(&keys);
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let starts: Vec<usize> = (0..100).map(|_| rng.gen_range(0..keys.len() - 200)).collect();

    c.bench_function("range_scan_100", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &s in &starts {
                let (mut begin, end) = fst.lookup_range(
                    &keys[s].to_be_bytes(),
                    true,
                    &keys[s + 100].to_be_bytes(),
                    false,
                );
                while begin != end {
                    sum += begin.value();
                    begin.next();
                }
            }
            sum
        });
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_point_lookup,
    bench_greater_than,
    bench_range_scan
);
criterion_main!(benches);
