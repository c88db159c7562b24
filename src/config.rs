//! Run configuration: term count, strategy, precision, workers and schedule.

use std::fmt;
use std::num::NonZeroU64;

use clap::ValueEnum;

use crate::{
    error::{precision_error, range_error, thread_count_error, Result},
    DEFAULT_CHUNK_DIVISOR, MAX_THREADS, N9,
};

/// Floating-point width of the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// 32-bit `f32`.
    Single,
    /// 64-bit `f64`.
    #[default]
    Double,
}

impl Precision {
    pub fn bits(self) -> u32 {
        match self {
            Precision::Single => 32,
            Precision::Double => 64,
        }
    }
}

impl TryFrom<u32> for Precision {
    type Error = crate::error::LeibnizError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Precision::Single),
            64 => Ok(Precision::Double),
            _ => Err(precision_error(bits)),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.bits())
    }
}

/// How the series is computed.
///
/// Every strategy sums the same terms; they differ in sign generation, loop
/// shape, vectorization and threading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    /// Sign from a general power function.
    #[value(name = "naive")]
    Naive,
    /// Boolean flag toggled each term, branched on.
    #[value(name = "flag")]
    Flag,
    /// Sign variable negated each term.
    #[value(name = "sign")]
    Sign,
    /// Two terms per iteration.
    #[value(name = "unroll2")]
    Unroll2,
    /// Four terms per iteration.
    #[value(name = "unroll4")]
    Unroll4,
    /// Sixteen terms per iteration.
    #[value(name = "unroll16")]
    Unroll16,
    /// Worker threads over contiguous blocks, two terms per iteration.
    #[value(name = "parallel")]
    Parallel,
    /// Worker threads over contiguous blocks, sixteen terms per iteration.
    #[value(name = "parallel-unroll16")]
    ParallelUnroll16,
    /// Worker threads over round-robin chunks, two terms per iteration.
    #[value(name = "parallel-chunked")]
    ParallelChunked,
    /// SIMD lanes on one thread.
    #[value(name = "simd")]
    Simd,
    /// Worker threads with private SIMD accumulators over contiguous blocks.
    #[value(name = "parallel-simd")]
    ParallelSimd,
    /// Worker threads with private SIMD accumulators over round-robin chunks.
    #[value(name = "parallel-simd-chunked")]
    ParallelSimdChunked,
}

impl Strategy {
    pub const ALL: [Strategy; 12] = [
        Strategy::Naive,
        Strategy::Flag,
        Strategy::Sign,
        Strategy::Unroll2,
        Strategy::Unroll4,
        Strategy::Unroll16,
        Strategy::Parallel,
        Strategy::ParallelUnroll16,
        Strategy::ParallelChunked,
        Strategy::Simd,
        Strategy::ParallelSimd,
        Strategy::ParallelSimdChunked,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::Flag => "flag",
            Strategy::Sign => "sign",
            Strategy::Unroll2 => "unroll2",
            Strategy::Unroll4 => "unroll4",
            Strategy::Unroll16 => "unroll16",
            Strategy::Parallel => "parallel",
            Strategy::ParallelUnroll16 => "parallel-unroll16",
            Strategy::ParallelChunked => "parallel-chunked",
            Strategy::Simd => "simd",
            Strategy::ParallelSimd => "parallel-simd",
            Strategy::ParallelSimdChunked => "parallel-simd-chunked",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::Naive => "sign from pow(-1, i)",
            Strategy::Flag => "branch on a toggled flag",
            Strategy::Sign => "sign variable negated every term",
            Strategy::Unroll2 => "2 terms per iteration, fixed signs",
            Strategy::Unroll4 => "4 terms per iteration, fixed signs",
            Strategy::Unroll16 => "16 terms per iteration, fixed signs",
            Strategy::Parallel => "threads over contiguous blocks, 2-way unrolled",
            Strategy::ParallelUnroll16 => "threads over contiguous blocks, 16-way unrolled",
            Strategy::ParallelChunked => "threads over round-robin static chunks, 2-way unrolled",
            Strategy::Simd => "vector lanes, single thread",
            Strategy::ParallelSimd => "threads over contiguous blocks, vector lanes, atomic merge",
            Strategy::ParallelSimdChunked => {
                "threads over round-robin static chunks, vector lanes, atomic merge"
            }
        }
    }

    pub fn is_parallel(self) -> bool {
        matches!(
            self,
            Strategy::Parallel
                | Strategy::ParallelUnroll16
                | Strategy::ParallelChunked
                | Strategy::ParallelSimd
                | Strategy::ParallelSimdChunked
        )
    }

    pub fn is_chunked(self) -> bool {
        matches!(
            self,
            Strategy::ParallelChunked | Strategy::ParallelSimdChunked
        )
    }

    /// Terms one loop iteration consumes, or `None` for the SIMD strategies
    /// whose width depends on the backend and precision.
    pub fn unroll_width(self) -> Option<u64> {
        match self {
            Strategy::Naive | Strategy::Flag | Strategy::Sign => Some(1),
            Strategy::Unroll2 | Strategy::Parallel | Strategy::ParallelChunked => Some(2),
            Strategy::Unroll4 => Some(4),
            Strategy::Unroll16 | Strategy::ParallelUnroll16 => Some(16),
            Strategy::Simd | Strategy::ParallelSimd | Strategy::ParallelSimdChunked => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Assignment of index ranges to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// One contiguous block per worker.
    Blocked,
    /// Chunks of `chunk` terms dealt round-robin; chunk `k` goes to worker
    /// `k mod threads`.
    Static { chunk: NonZeroU64 },
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesConfig {
    /// Inclusive upper bound: terms `0..=n` are summed.
    pub n: u64,
    pub strategy: Strategy,
    pub precision: Precision,
    /// Worker count for the parallel strategies.
    pub threads: usize,
    /// Chunk size for the chunked strategies; derived from `n` when `None`.
    pub chunk_size: Option<NonZeroU64>,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            n: N9,
            strategy: Strategy::ParallelSimdChunked,
            precision: Precision::Double,
            threads: rayon::current_num_threads().min(MAX_THREADS),
            chunk_size: None,
        }
    }
}

impl SeriesConfig {
    pub fn new(n: u64) -> Self {
        Self {
            n,
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: NonZeroU64) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Checks the configuration before any term is computed.
    ///
    /// # Errors
    ///
    /// - [`InvalidRange`](crate::error::LeibnizError::InvalidRange) if `n + 1`
    ///   overflows `u64`.
    /// - [`InvalidThreadCount`](crate::error::LeibnizError::InvalidThreadCount)
    ///   if `threads` is zero or above [`MAX_THREADS`].
    pub fn validate(&self) -> Result<()> {
        if self.n == u64::MAX {
            return Err(range_error(
                self.n,
                "the term count n + 1 does not fit in u64",
            ));
        }

        if self.threads == 0 {
            return Err(thread_count_error(
                self.threads,
                "at least one worker thread is required",
            ));
        }

        if self.threads > MAX_THREADS {
            return Err(thread_count_error(
                self.threads,
                format!("at most {MAX_THREADS} worker threads are supported"),
            ));
        }

        Ok(())
    }

    /// Number of terms summed, `n + 1`.
    pub fn terms(&self) -> u64 {
        self.n.saturating_add(1)
    }

    /// Schedule for a kernel consuming `width` terms per iteration.
    ///
    /// The default chunk is `ceil(terms / DEFAULT_CHUNK_DIVISOR)`; either way the
    /// chunk is rounded up to a whole number of iterations.
    pub fn schedule(&self, width: u64) -> Schedule {
        if !self.strategy.is_chunked() {
            return Schedule::Blocked;
        }

        let requested = match self.chunk_size {
            Some(chunk) => chunk.get(),
            None => self.terms().div_ceil(DEFAULT_CHUNK_DIVISOR),
        };

        let width = width.max(1);
        let rounded = requested.div_ceil(width).max(1).saturating_mul(width);

        Schedule::Static {
            chunk: NonZeroU64::new(rounded).unwrap_or(NonZeroU64::MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeibnizError;

    #[test]
    fn test_precision_from_bits() {
        assert_eq!(Precision::try_from(32), Ok(Precision::Single));
        assert_eq!(Precision::try_from(64), Ok(Precision::Double));
        assert_eq!(
            Precision::try_from(16),
            Err(LeibnizError::InvalidPrecision { bits: 16 })
        );
    }

    #[test]
    fn test_strategy_names_round_trip_through_clap() {
        for strategy in Strategy::ALL {
            let parsed = Strategy::from_str(strategy.name(), false).unwrap();
            assert_eq!(parsed, strategy);
        }
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            SeriesConfig::new(u64::MAX).validate(),
            Err(LeibnizError::InvalidRange { .. })
        ));
        assert!(matches!(
            SeriesConfig::new(10).with_threads(0).validate(),
            Err(LeibnizError::InvalidThreadCount { threads: 0, .. })
        ));
        assert!(SeriesConfig::new(0).with_threads(1).validate().is_ok());
    }

    #[test]
    fn test_validate_caps_thread_count() {
        assert!(SeriesConfig::new(10).with_threads(MAX_THREADS).validate().is_ok());
        for threads in [MAX_THREADS + 1, 100_000_000, usize::MAX] {
            assert!(matches!(
                SeriesConfig::new(10).with_threads(threads).validate(),
                Err(LeibnizError::InvalidThreadCount { threads: t, .. }) if t == threads
            ));
        }
    }

    #[test]
    fn test_default_threads_within_cap() {
        let config = SeriesConfig::default();
        assert!(config.threads >= 1 && config.threads <= MAX_THREADS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_chunk_is_a_thousandth_rounded_to_width() {
        let config = SeriesConfig::new(999_999).with_strategy(Strategy::ParallelChunked);
        assert_eq!(
            config.schedule(2),
            Schedule::Static {
                chunk: NonZeroU64::new(1_000).unwrap()
            }
        );

        let config = SeriesConfig::new(1_000_000).with_strategy(Strategy::ParallelSimdChunked);
        // ceil(1_000_001 / 1000) = 1001, rounded up to a multiple of 4.
        assert_eq!(
            config.schedule(4),
            Schedule::Static {
                chunk: NonZeroU64::new(1_004).unwrap()
            }
        );
    }

    #[test]
    fn test_small_runs_get_one_width_chunks() {
        let config = SeriesConfig::new(3).with_strategy(Strategy::ParallelChunked);
        assert_eq!(
            config.schedule(16),
            Schedule::Static {
                chunk: NonZeroU64::new(16).unwrap()
            }
        );
    }

    #[test]
    fn test_explicit_chunk_size_is_rounded_up() {
        let config = SeriesConfig::new(100)
            .with_strategy(Strategy::ParallelChunked)
            .with_chunk_size(NonZeroU64::new(7).unwrap());
        assert_eq!(
            config.schedule(2),
            Schedule::Static {
                chunk: NonZeroU64::new(8).unwrap()
            }
        );
    }

    #[test]
    fn test_unchunked_strategies_use_blocks() {
        let config = SeriesConfig::new(100)
            .with_strategy(Strategy::Parallel)
            .with_chunk_size(NonZeroU64::new(7).unwrap());
        assert_eq!(config.schedule(2), Schedule::Blocked);
    }
}
