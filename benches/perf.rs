use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchday_edge::config::ModelConfig;
use matchday_edge::distribution::distribute;
use matchday_edge::fusion::fuse;
use matchday_edge::pipeline::Pipeline;
use matchday_edge::power::compute_base;
use matchday_edge::standings::TeamStanding;
use matchday_edge::synthetic;

fn bench_base_prediction(c: &mut Criterion) {
    let cfg = ModelConfig::default();
    let home = TeamStanding::new(1, 50, 30, 20);
    let away = TeamStanding::new(15, 25, -5, 20);

    c.bench_function("base_prediction", |b| {
        b.iter(|| {
            let base =
                compute_base(black_box(&home), black_box(&away), black_box(1.0), &cfg.power)
                    .unwrap();
            black_box(base.confidence);
        })
    });
}

fn bench_distribution(c: &mut Criterion) {
    let cfg = ModelConfig::default();
    let data = synthetic::fixture(17);

    c.bench_function("score_distribution", |b| {
        b.iter(|| {
            let d = distribute(black_box(35), black_box(&data.factors), &cfg.distribution);
            black_box(d.total_mass());
        })
    });
}

fn bench_fusion(c: &mut Criterion) {
    let cfg = ModelConfig::default();
    let home = TeamStanding::new(2, 45, 22, 20);
    let away = TeamStanding::new(11, 28, -2, 20);
    let base = compute_base(&home, &away, 1.0, &cfg.power).unwrap();
    let data = synthetic::fixture(23);
    let sim = data.simulation.unwrap();

    c.bench_function("fusion", |b| {
        b.iter(|| {
            let fused = fuse(black_box(&base), Some(black_box(&sim)), None, &cfg.fusion);
            black_box(fused.confidence);
        })
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let pipeline = Pipeline::default();
    let data = synthetic::fixture(31);

    c.bench_function("full_pipeline", |b| {
        b.iter(|| {
            let report = pipeline.run(black_box(&data), None).unwrap();
            black_box(report.fused.confidence);
        })
    });
}

fn bench_batch_pipeline(c: &mut Criterion) {
    let pipeline = Pipeline::default();
    let fixtures: Vec<_> = (0..64).map(|i| (synthetic::fixture(i), None)).collect();

    c.bench_function("batch_pipeline_64", |b| {
        b.iter(|| {
            let reports = pipeline.run_batch(black_box(&fixtures));
            black_box(reports.len());
        })
    });
}

criterion_group!(
    perf,
    bench_base_prediction,
    bench_distribution,
    bench_fusion,
    bench_full_pipeline,
    bench_batch_pipeline
);
criterion_main!(perf);
