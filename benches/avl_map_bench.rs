//! Benchmark for AvlMap vs standard BTreeMap.
//!
//! Compares insertion, lookup, erasure and iteration.

use avlmap::ordered::AvlMap;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

/// Spreads `0..size` over the key space so inserts do not arrive sorted.
fn scattered_keys(size: u64) -> Vec<u64> {
    (0..size)
        .map(|index| index.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 16)
        .collect()
}

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [100, 1000, 10000] {
        let keys = scattered_keys(size);

        group.bench_with_input(BenchmarkId::new("AvlMap", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut map = AvlMap::new();
                for key in keys {
                    map.insert(black_box(*key), black_box(*key));
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut map = BTreeMap::new();
                for key in keys {
                    map.entry(black_box(*key)).or_insert(black_box(*key));
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

// =============================================================================
// find Benchmark
// =============================================================================

fn benchmark_find(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("find");

    for size in [100, 1000, 10000] {
        let keys = scattered_keys(size);
        let avl_map: AvlMap<u64, u64> = keys.iter().map(|key| (*key, *key)).collect();
        let btree_map: BTreeMap<u64, u64> = keys.iter().map(|key| (*key, *key)).collect();

        group.bench_with_input(BenchmarkId::new("AvlMap", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut sum = 0_u64;
                for key in keys {
                    if let Ok(value) = avl_map.at(black_box(key)) {
                        sum = sum.wrapping_add(*value);
                    }
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut sum = 0_u64;
                for key in keys {
                    if let Some(value) = btree_map.get(black_box(key)) {
                        sum = sum.wrapping_add(*value);
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// erase Benchmark
// =============================================================================

fn benchmark_erase(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("erase");

    for size in [100, 1000, 10000] {
        let keys = scattered_keys(size);
        let avl_map: AvlMap<u64, u64> = keys.iter().map(|key| (*key, *key)).collect();
        let btree_map: BTreeMap<u64, u64> = keys.iter().map(|key| (*key, *key)).collect();

        group.bench_with_input(BenchmarkId::new("AvlMap", size), &keys, |bencher, keys| {
            bencher.iter_batched(
                || avl_map.clone(),
                |mut map| {
                    for key in keys {
                        let cursor = map.find(key);
                        black_box(map.erase(cursor).ok());
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &keys, |bencher, keys| {
            bencher.iter_batched(
                || btree_map.clone(),
                |mut map| {
                    for key in keys {
                        black_box(map.remove(key));
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in [100, 1000, 10000] {
        let keys = scattered_keys(size);
        let avl_map: AvlMap<u64, u64> = keys.iter().map(|key| (*key, *key)).collect();
        let btree_map: BTreeMap<u64, u64> = keys.iter().map(|key| (*key, *key)).collect();

        group.bench_with_input(BenchmarkId::new("AvlMap/iter", size), &size, |bencher, _| {
            bencher.iter(|| {
                let sum: u64 = avl_map.values().fold(0, |sum, value| sum.wrapping_add(*value));
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("AvlMap/cursor", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut sum = 0_u64;
                let mut cursor = avl_map.begin();
                while let Ok((_, value)) = avl_map.entry_at(cursor) {
                    sum = sum.wrapping_add(*value);
                    cursor = match avl_map.next_cursor(cursor) {
                        Ok(next) => next,
                        Err(_) => break,
                    };
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, _| {
            bencher.iter(|| {
                let sum: u64 = btree_map.values().fold(0, |sum, value| sum.wrapping_add(*value));
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_find,
    benchmark_erase,
    benchmark_iteration
);

criterion_main!(benches);
