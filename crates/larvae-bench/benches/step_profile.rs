//! Criterion benchmarks for the standard larvae pipeline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use larvae_bench::{profile_simulation, reference_profile, stress_profile};
use larvae_core::DevStage;
use larvae_propagators::RateLaw;

fn bench_step_10k(c: &mut Criterion) {
    let mut sim = profile_simulation(reference_profile(42)).unwrap();

    // Warm up: run one step so the environment columns are populated.
    sim.step().unwrap();

    c.bench_function("step_10k", |b| {
        b.iter(|| {
            let report = sim.step().unwrap();
            black_box(&report);
        });
    });
}

fn bench_step_100k(c: &mut Criterion) {
    let mut sim = profile_simulation(stress_profile(42)).unwrap();
    sim.step().unwrap();

    c.bench_function("step_100k", |b| {
        b.iter(|| {
            let report = sim.step().unwrap();
            black_box(&report);
        });
    });
}

fn bench_720_steps_10k(c: &mut Criterion) {
    c.bench_function("720_steps_10k", |b| {
        b.iter(|| {
            let mut sim = profile_simulation(reference_profile(42)).unwrap();
            let reports = sim.run_for(720).unwrap();
            black_box(&reports);
        });
    });
}

fn bench_rate_laws(c: &mut Criterion) {
    let laws = [RateLaw::simple_exponential(), RateLaw::log_quadratic()];
    for law in laws {
        c.bench_function(&format!("development_rate_{}", law.form()), |b| {
            b.iter(|| {
                let mut sum = 0.0;
                for k in 0..1000 {
                    let t = 0.02 * k as f64;
                    sum += law.development_rate(DevStage::Ciliated, black_box(t));
                }
                black_box(sum)
            });
        });
    }
}

criterion_group!(
    benches,
    bench_step_10k,
    bench_step_100k,
    bench_720_steps_10k,
    bench_rate_laws
);
criterion_main!(benches);
