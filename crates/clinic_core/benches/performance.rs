//! Performance benchmarks for clinic_core using Criterion.rs.

use clinic_core::distributions::ServiceTimeDistribution;
use clinic_core::replication::run_replication;
use clinic_core::scenario::{ClinicParams, StaffingPlan};
use clinic_core::streams::{RandomStreams, StreamRole};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_replication(c: &mut Criterion) {
    let scenarios = vec![
        ("light", 75, [2, 2, 3, 2, 3]),
        ("medium", 150, [3, 4, 6, 3, 5]),
        ("heavy", 225, [4, 6, 9, 4, 8]),
    ];

    let mut group = c.benchmark_group("replication");
    for (name, load, staffing) in scenarios {
        let params = ClinicParams::default()
            .with_daily_load(load)
            .with_staffing(StaffingPlan::new(staffing))
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(name), &params, |b, params| {
            let mut replication = 0;
            b.iter(|| {
                replication += 1;
                black_box(run_replication(params, replication).expect("replication"));
            });
        });
    }
    group.finish();
}

fn bench_service_draws(c: &mut Criterion) {
    let mut group = c.benchmark_group("service_draws");
    let distributions = [
        ("exponential", ServiceTimeDistribution::exponential(3.0)),
        ("lognormal", ServiceTimeDistribution::lognormal(5.0, 2.0)),
        ("normal", ServiceTimeDistribution::normal(16.0, 3.0)),
    ];
    for (name, distribution) in distributions {
        let mut streams = RandomStreams::for_replication(42, 0);
        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(
                    streams
                        .draw(StreamRole::ExaminationService, &distribution)
                        .expect("draw"),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_replication, bench_service_draws);
criterion_main!(benches);
