//! ORDER BY benchmark: full sort vs. top-k, then gather.
//!
//! Simulates `SELECT ... ORDER BY key [DESC] LIMIT k` over one column:
//!   1. derive the permutation (`get_permutation`)
//!   2. materialize the result (`permute`)
//!
//! Also measures `replicate`, which a join uses to repeat build-side rows once
//! per match.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use numcol::{ColumnVector, Permutation};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

struct SortWorkload {
    column: ColumnVector<f64>,
    /// Human-readable label
    label: String,
}

impl SortWorkload {
    /// - `rows`: column length
    /// - `distinct`: number of distinct keys (low values stress equal keys)
    fn generate(rows: usize, distinct: u32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let column = (0..rows)
            .map(|_| rng.random_range(0..distinct) as f64)
            .collect();
        Self {
            column,
            label: format!("rows={}/distinct={}", rows, distinct),
        }
    }
}

fn benchmark_sort(c: &mut Criterion) {
    let workloads = [
        SortWorkload::generate(100_000, u32::MAX, 1),
        SortWorkload::generate(100_000, 16, 2),
        SortWorkload::generate(1_000_000, u32::MAX, 3),
    ];

    for w in &workloads {
        let rows = w.column.len();
        let mut group = c.benchmark_group(format!("order_by/{}", w.label));
        group.throughput(Throughput::Elements(rows as u64));

        for limit in [0usize, 10, 1000] {
            group.bench_with_input(BenchmarkId::new("get_permutation", limit), &limit, |b, &limit| {
                let mut perm = Permutation::with_capacity(rows);
                b.iter(|| {
                    w.column.get_permutation(false, limit, &mut perm);
                    black_box(&perm);
                });
            });
        }

        let mut perm = Permutation::new();
        w.column.get_permutation(true, 0, &mut perm);
        group.bench_function("permute", |b| {
            b.iter(|| black_box(w.column.permute(&perm, 0).unwrap()));
        });

        group.finish();
    }
}

fn benchmark_replicate(c: &mut Criterion) {
    let rows = 100_000;
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let column: ColumnVector<u32> = (0..rows as u32).collect();

    let mut group = c.benchmark_group("replicate");
    for multiplicity in [1u64, 4, 16] {
        let mut total = 0u64;
        let offsets: Vec<u64> = (0..rows)
            .map(|_| {
                total += rng.random_range(0..=multiplicity * 2);
                total
            })
            .collect();

        group.throughput(Throughput::Elements(total));
        group.bench_with_input(BenchmarkId::from_parameter(multiplicity), &offsets, |b, offsets| {
            b.iter(|| black_box(column.replicate(offsets).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_sort, benchmark_replicate);
criterion_main!(benches);
