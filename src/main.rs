//! Leibniz benchmark CLI
//!
//! Runs one strategy and prints the approximation of π and the wall-clock time.

use std::num::NonZeroU64;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use leibniz::{approximate_pi, Precision, SeriesConfig, Strategy, N9};

#[derive(Parser, Debug)]
#[command(name = "leibniz")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Approximate pi with the Leibniz series, one optimization at a time", long_about = None)]
struct Cli {
    /// Inclusive upper bound of the term index
    #[arg(long = "n", default_value_t = N9)]
    n: u64,

    /// Strategy used to sum the series
    #[arg(short, long, value_enum, default_value_t = Strategy::ParallelSimdChunked)]
    strategy: Strategy,

    /// Accumulator width in bits (32 or 64)
    #[arg(short, long, default_value_t = 64)]
    precision: u32,

    /// Worker threads for the parallel strategies (defaults to all logical CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Terms per static chunk for the chunked strategies (defaults to (n + 1) / 1000)
    #[arg(long)]
    chunk_size: Option<NonZeroU64>,

    /// List the available strategies and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leibniz=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list {
        for strategy in Strategy::ALL {
            println!("{:<22} {}", strategy.name(), strategy.description());
        }
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> leibniz::Result<()> {
    let precision = Precision::try_from(cli.precision)?;

    let mut config = SeriesConfig::new(cli.n)
        .with_strategy(cli.strategy)
        .with_precision(precision);
    if let Some(threads) = cli.threads {
        config = config.with_threads(threads);
    }
    if let Some(chunk_size) = cli.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }

    debug!(?config, "starting run");

    let start = Instant::now();
    let pi = approximate_pi(&config)?;
    let duration = start.elapsed();

    print!("{}", report(pi.value, duration));

    Ok(())
}

/// The two stdout lines of a successful run.
fn report(value: f64, duration: Duration) -> String {
    format!(
        "Result: {:.20}\nDuration: {:.6} seconds\n",
        value,
        duration.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_has_two_lines() {
        let output = report(4.0, Duration::from_millis(1_500));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec!["Result: 4.00000000000000000000", "Duration: 1.500000 seconds"]
        );
    }

    #[test]
    fn test_report_precision() {
        let output = report(std::f64::consts::PI, Duration::from_nanos(1_234));
        assert!(output.starts_with("Result: 3.14159265358979311600\n"));
        assert!(output.ends_with("Duration: 0.000001 seconds\n"));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["leibniz"]);
        assert_eq!(cli.n, N9);
        assert_eq!(cli.strategy, Strategy::ParallelSimdChunked);
        assert_eq!(cli.precision, 64);
        assert!(cli.threads.is_none() && cli.chunk_size.is_none() && !cli.list);
    }

    #[test]
    fn test_cli_parses_every_flag() {
        let cli = Cli::parse_from([
            "leibniz",
            "--n",
            "1000",
            "--strategy",
            "parallel-unroll16",
            "--precision",
            "32",
            "--threads",
            "3",
            "--chunk-size",
            "64",
        ]);
        assert_eq!(cli.n, 1_000);
        assert_eq!(cli.strategy, Strategy::ParallelUnroll16);
        assert_eq!(cli.precision, 32);
        assert_eq!(cli.threads, Some(3));
        assert_eq!(cli.chunk_size, NonZeroU64::new(64));
    }

    #[test]
    fn test_cli_rejects_zero_chunk_size() {
        assert!(Cli::try_parse_from(["leibniz", "--chunk-size", "0"]).is_err());
    }
}
