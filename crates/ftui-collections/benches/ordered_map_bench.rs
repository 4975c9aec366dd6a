//! Benchmarks for OrderedMap operations.
//!
//! Run with: cargo bench -p ftui-collections --bench ordered_map_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ftui_collections::OrderedMap;
use std::hint::black_box;

fn filled(n: u32) -> OrderedMap<u32, u32> {
    let mut map = OrderedMap::with_capacity(n as usize);
    for i in 0..n {
        let _ = map.push(i, i);
    }
    map
}

// =============================================================================
// Append / front insert
// =============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_map/insert");

    for n in [100u32, 1_000, 10_000] {
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::new("push", n), &n, |b, &n| {
            b.iter(|| black_box(filled(n)))
        });
        group.bench_with_input(BenchmarkId::new("front", n), &n, |b, &n| {
            b.iter(|| {
                let mut map = OrderedMap::with_capacity(n as usize);
                for i in 0..n {
                    let _ = map.insert(0, i, i);
                }
                black_box(map)
            })
        });
    }

    group.finish();
}

// =============================================================================
// Lookup: by key vs by index vs reverse index
// =============================================================================

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_map/lookup");

    for n in [100u32, 1_000, 10_000] {
        let map = filled(n);
        let mid = n / 2;
        group.bench_with_input(BenchmarkId::new("value_for", n), &map, |b, map| {
            b.iter(|| black_box(map.get(&mid)))
        });
        group.bench_with_input(BenchmarkId::new("value_at", n), &map, |b, map| {
            b.iter(|| black_box(map.value_at(mid as usize).ok()))
        });
        group.bench_with_input(BenchmarkId::new("index_of_key", n), &map, |b, map| {
            b.iter(|| black_box(map.index_of_key(&mid)))
        });
    }

    group.finish();
}

// =============================================================================
// Removal from the middle
// =============================================================================

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_map/remove");

    for n in [100u32, 1_000, 10_000] {
        let map = filled(n);
        group.bench_with_input(BenchmarkId::new("by_key_middle", n), &map, |b, map| {
            b.iter_batched(
                || map.clone(),
                |mut m| black_box(m.remove(&(n / 2))),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_remove);
criterion_main!(benches);
