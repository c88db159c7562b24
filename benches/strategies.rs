//! Leibniz strategy benchmarks
//!
//! Every strategy at both precisions over a few term counts. The full-size
//! tiers (`N8`..`N10`) belong to the CLI; these sizes keep a criterion run short.

use std::hint::black_box;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use leibniz::{approximate_pi, Precision, SeriesConfig, Strategy};

const TERM_COUNTS: &[u64] = &[100_000, 1_000_000, 10_000_000];

fn benchmark_strategies(c: &mut Criterion, precision: Precision) {
    for &n in TERM_COUNTS {
        let mut group = c.benchmark_group(format!("Leibniz {precision} {}", format_terms(n)));
        group.throughput(Throughput::Elements(n + 1));
        group.sample_size(20);

        for strategy in Strategy::ALL {
            let config = SeriesConfig::new(n)
                .with_strategy(strategy)
                .with_precision(precision);

            group.bench_with_input(
                BenchmarkId::new(strategy.name(), n),
                &config,
                |b, config| b.iter(|| black_box(approximate_pi(black_box(config)))),
            );
        }

        group.finish();
    }
}

fn format_terms(n: u64) -> String {
    let terms = n + 1;
    if terms >= 1_000_000 {
        format!("{:.1}M terms", terms as f64 / 1_000_000.0)
    } else if terms >= 1_000 {
        format!("{:.1}K terms", terms as f64 / 1_000.0)
    } else {
        format!("{terms} terms")
    }
}

fn all_benchmarks(c: &mut Criterion) {
    println!("Starting Leibniz strategy benchmarks");
    let start_time = Instant::now();
    benchmark_strategies(c, Precision::Double);
    benchmark_strategies(c, Precision::Single);
    let elapsed = start_time.elapsed();
    println!(
        "Benchmark suite completed in {:.2} seconds",
        elapsed.as_secs_f64()
    );
}

criterion_group!(benches, all_benchmarks);
criterion_main!(benches);
