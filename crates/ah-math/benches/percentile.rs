//! Criterion benchmarks for `ah-math`.
//!
//! Threshold estimation runs once per heatmap render over every cell value.

use ah_math::percentile_threshold;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_percentile(c: &mut Criterion) {
    let mut group = c.benchmark_group("percentile");

    for n in [100usize, 1_000, 10_000] {
        let values: Vec<f64> = (0..n).map(|i| ((i * 7919) % 1000) as f64).collect();
        group.bench_with_input(BenchmarkId::new("threshold", n), &values, |b, values| {
            b.iter(|| black_box(percentile_threshold(black_box(values), black_box(0.85))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_percentile);
criterion_main!(benches);
