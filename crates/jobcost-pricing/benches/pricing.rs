//! Pricing benchmarks
//!
//! - Formula evaluation
//! - Cached catalog lookups
//! - End-to-end estimates for both job environments

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jobcost_common::{BatchWorkerUsage, ClusterUsage, JobDuration, UsageRecord};
use jobcost_pricing::{batch_worker_cost, cluster_cost, ClusterLine, CostEstimator, PriceCatalog};

fn bench_formulas(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula");
    let duration = JobDuration::from_seconds(5400.0).unwrap();

    group.bench_function("batch_worker", |b| {
        b.iter(|| batch_worker_cost(black_box(20), black_box(2.0), duration, black_box(0.44)))
    });

    for size in [1usize, 4, 16].iter() {
        let lines: Vec<ClusterLine> = (0..*size)
            .map(|i| ClusterLine {
                count: i as u32 + 1,
                price_per_hour: 0.192,
                fee_per_hour: 0.022,
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("cluster", size), &lines, |b, lines| {
            b.iter(|| cluster_cost(black_box(lines.iter().copied()), duration))
        });
    }

    group.finish();
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");
    let catalog = PriceCatalog::default();

    // Warm the caches
    catalog.worker_price("us-east-1", "G.1X");
    catalog.instance_price("us-east-1", "m5.xlarge");

    group.bench_function("worker_price_cached", |b| {
        b.iter(|| catalog.worker_price(black_box("us-east-1"), black_box("G.1X")))
    });

    group.bench_function("instance_price_cached", |b| {
        b.iter(|| catalog.instance_price(black_box("us-east-1"), black_box("m5.xlarge")))
    });

    group.finish();
}

fn bench_estimates(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    let estimator = CostEstimator::default();
    let duration = JobDuration::from_seconds(3600.0).unwrap();

    let glue = UsageRecord::from(BatchWorkerUsage::new("us-east-1", "G.2X", 10));
    let emr = UsageRecord::from(
        ClusterUsage::new("us-east-1")
            .with_instances("m5.xlarge", 3)
            .with_instances("m5.2xlarge", 1),
    );

    group.bench_function("glue", |b| b.iter(|| estimator.estimate(black_box(&glue), duration)));
    group.bench_function("emr", |b| b.iter(|| estimator.estimate(black_box(&emr), duration)));

    group.finish();
}

criterion_group!(benches, bench_formulas, bench_catalog, bench_estimates);
criterion_main!(benches);
