// Benchmarks against the raw table engine, bypassing the facades.
// Requires the `bench_internal` feature.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use openhash::{InsertOrder, RawTable, Unordered};
use std::collections::hash_map::RandomState;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_probe_find(c: &mut Criterion) {
    // Index-returning find: the cost of probing alone, no value access.
    c.bench_function("raw_table_find", |b| {
        let mut t: RawTable<u64, u64, RandomState, Unordered> = RawTable::new();
        let keys: Vec<u64> = lcg(21).take(50_000).collect();
        for &k in &keys {
            t.insert(k, k);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.find(k));
        })
    });
}

fn bench_backward_shift(c: &mut Criterion) {
    // Remove half the keys from a well-loaded table: the shift path.
    c.bench_function("raw_table_remove_half", |b| {
        b.iter_batched(
            || {
                let mut t: RawTable<u64, u64, RandomState, Unordered> = RawTable::new();
                let keys: Vec<u64> = lcg(33).take(20_000).collect();
                for &k in &keys {
                    t.insert(k, k);
                }
                (t, keys)
            },
            |(mut t, keys)| {
                for k in keys.iter().step_by(2) {
                    t.remove(k);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_cursor_sweep(c: &mut Criterion) {
    c.bench_function("raw_table_cursor_sweep", |b| {
        let mut t: RawTable<u64, u64, RandomState, Unordered> = RawTable::new();
        for x in lcg(55).take(20_000) {
            t.insert(x, x);
        }
        b.iter(|| {
            let mut cur = t.cursor();
            let mut acc = 0u64;
            while let Some(i) = cur.advance(&t).unwrap() {
                acc = acc.wrapping_add(*t.value_at(i));
            }
            black_box(acc)
        })
    });
}

fn bench_ordered_overhead(c: &mut Criterion) {
    // Same insert workload with and without the order chain, to track the
    // cost of the linkage policy.
    let mut group = c.benchmark_group("raw_table_insert_10k");
    group.bench_function("unordered", |b| {
        b.iter_batched(
            || RawTable::<u64, u64, RandomState, Unordered>::new(),
            |mut t| {
                for x in lcg(77).take(10_000) {
                    t.insert(x, x);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("insert_order", |b| {
        b.iter_batched(
            || RawTable::<u64, u64, RandomState, InsertOrder>::new(),
            |mut t| {
                for x in lcg(77).take(10_000) {
                    t.insert(x, x);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_probe_find, bench_backward_shift, bench_cursor_sweep,
        bench_ordered_overhead
}
criterion_main!(benches);
