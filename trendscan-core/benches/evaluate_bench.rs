//! Criterion benchmarks for the screening hot path.
//!
//! Benchmarks:
//! 1. Indicator snapshot (SMA 50/150/200, rolling high/low)
//! 2. Full single-symbol evaluation at several history lengths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use trendscan_core::indicators::{Indicator, Sma};
use trendscan_core::{evaluate, IndicatorSet, PriceSeries, TemplateConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.05).sin() * 10.0 + i as f64 * 0.1)
        .collect()
}

fn make_series(n: usize) -> PriceSeries {
    let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    PriceSeries::from_closes("BENCH", start, &make_closes(n)).unwrap()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let closes = make_closes(500);
    let config = TemplateConfig::default();

    c.bench_function("sma_200_500_bars", |b| {
        let sma = Sma::new(200);
        b.iter(|| black_box(sma.compute(black_box(&closes))))
    });

    c.bench_function("indicator_set_500_bars", |b| {
        b.iter(|| black_box(IndicatorSet::compute(black_box(&closes), &config)))
    });
}

// ── 2. Evaluation ────────────────────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let config = TemplateConfig::default();
    let mut group = c.benchmark_group("evaluate");
    for n in [252usize, 500, 1260] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, s| {
            b.iter(|| black_box(evaluate("BENCH", black_box(s), &config)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_indicators, bench_evaluate);
criterion_main!(benches);
