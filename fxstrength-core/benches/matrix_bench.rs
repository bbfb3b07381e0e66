//! Criterion benchmarks for matrix hot paths.
//!
//! Benchmarks:
//! 1. Indicator derivation (SAR + ADX over a bar series)
//! 2. Full matrix assembly over frozen readings, per classifier
//! 3. Full matrix assembly over synthetic bars

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fxstrength_core::classifier::ClassifierKind;
use fxstrength_core::config::MatrixConfig;
use fxstrength_core::data::{
    BarBackedProvider, BarSource, MarketDataProvider, ReplayProvider, SyntheticBars,
};
use fxstrength_core::domain::Interval;
use fxstrength_core::indicators::{Adx, Indicator, ParabolicSar};
use fxstrength_core::matrix::MatrixAssembler;

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for n in [100usize, 500, 2000] {
        let bars = SyntheticBars::new(1).bars("EURUSD", Interval::H1, n).unwrap();
        group.bench_with_input(BenchmarkId::new("sar", n), &bars, |b, bars| {
            let sar = ParabolicSar::default_params();
            b.iter(|| sar.compute(black_box(bars)))
        });
        group.bench_with_input(BenchmarkId::new("adx", n), &bars, |b, bars| {
            let adx = Adx::default_params();
            b.iter(|| adx.compute(black_box(bars)))
        });
    }
    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");

    // Freeze synthetic readings once so the loop measures classification only.
    let base = MatrixConfig::default();
    let live = BarBackedProvider::new(SyntheticBars::new(9), 200);
    let frozen = ReplayProvider::capture(&live, &base.pairs, &base.intervals());
    assert!(frozen.supplies_bars());

    for kind in [
        ClassifierKind::SarAdx,
        ClassifierKind::Breakout,
        ClassifierKind::FractalSwing,
        ClassifierKind::PctChange,
    ] {
        let config = MatrixConfig {
            classifier: kind,
            ..base.clone()
        };
        let asm = MatrixAssembler::new(config, frozen.clone()).unwrap();
        group.bench_function(BenchmarkId::new("frozen", format!("{kind:?}")), |b| {
            b.iter(|| black_box(asm.run().unwrap()))
        });
    }

    let asm = MatrixAssembler::new(base, BarBackedProvider::new(SyntheticBars::new(9), 200)).unwrap();
    group.bench_function("synthetic_sar_adx", |b| b.iter(|| black_box(asm.run().unwrap())));
    group.finish();
}

criterion_group!(benches, bench_indicators, bench_assembly);
criterion_main!(benches);
