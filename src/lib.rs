//! Successive optimizations of the Leibniz series for π.
//!
//! ```text
//! π = 4 · Σ_{i=0}^{n} (-1)^i / (2i + 1)
//! ```
//!
//! Every [`Strategy`] computes the same sum with a different instruction-level
//! approach: a power function for the sign, a branch, a sign variable, manual
//! unrolling, SIMD lanes, Rayon worker threads, and combinations. The precision
//! of the accumulator is a run-time choice so the accuracy of `f32` and `f64`
//! can be compared on identical code.
//!
//! ```rust
//! use leibniz::{approximate_pi, Precision, SeriesConfig, Strategy};
//!
//! let config = SeriesConfig::new(10_000)
//!     .with_strategy(Strategy::Simd)
//!     .with_precision(Precision::Double);
//! let pi = approximate_pi(&config).unwrap();
//! assert!((pi.value - std::f64::consts::PI).abs() <= leibniz::truncation_bound(10_000));
//! ```

use tracing::info;

pub mod config;
pub mod error;
pub mod float;
pub mod parallel;
pub mod series;
pub mod simd;

pub use config::{Precision, Schedule, SeriesConfig, Strategy};
pub use error::{LeibnizError, Result};

use crate::{
    float::SeriesFloat,
    parallel::{fork_join, fork_join_shared, Plan},
    series::{flag_sum, power_sum, sign_sum, unroll16_sum, unroll2_sum, unroll4_sum},
    simd::{Backend, SimdSum},
};

/// 10^8 terms.
pub const N8: u64 = 100_000_000;

/// 10^9 terms.
pub const N9: u64 = 1_000_000_000;

/// 10^10 terms.
pub const N10: u64 = 10_000_000_000;

/// The default static chunk is `terms / DEFAULT_CHUNK_DIVISOR`, rounded up.
pub const DEFAULT_CHUNK_DIVISOR: u64 = 1000;

/// Largest worker count a run accepts.
pub const MAX_THREADS: usize = 1024;

/// Result of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approximation {
    /// `4 · Σ`, widened to `f64` for single-precision runs.
    pub value: f64,
    pub strategy: Strategy,
    pub precision: Precision,
    /// Number of terms summed, `n + 1`.
    pub terms: u64,
}

impl Approximation {
    /// Absolute distance from `std::f64::consts::PI`.
    pub fn error(&self) -> f64 {
        (self.value - std::f64::consts::PI).abs()
    }
}

/// Upper bound on `|4 · Σ_{i=0}^{n} - π|`: four times the first omitted term.
pub fn truncation_bound(n: u64) -> f64 {
    4.0 / (2.0 * n as f64 + 3.0)
}

/// Approximates π as configured.
///
/// # Errors
///
/// Fails only on invalid configuration, before any term is computed:
/// [`LeibnizError::InvalidRange`] or [`LeibnizError::InvalidThreadCount`].
pub fn approximate_pi(config: &SeriesConfig) -> Result<Approximation> {
    config.validate()?;

    let value = match config.precision {
        Precision::Single => sum_series::<f32>(config)?.widen(),
        Precision::Double => sum_series::<f64>(config)?,
    };

    info!(
        strategy = config.strategy.name(),
        precision = %config.precision,
        n = config.n,
        value,
        "series summed"
    );

    Ok(Approximation {
        value,
        strategy: config.strategy,
        precision: config.precision,
        terms: config.terms(),
    })
}

/// Computes `4 · Σ` at precision `T`.
fn sum_series<T: SimdSum>(config: &SeriesConfig) -> Result<T> {
    let terms = config.terms();
    let range = 0..terms;
    let zero = T::zero();

    let sum = match config.strategy {
        Strategy::Naive => power_sum(zero, range),
        Strategy::Flag => flag_sum(zero, range),
        Strategy::Sign => sign_sum(zero, range),
        Strategy::Unroll2 => unroll2_sum(zero, range),
        Strategy::Unroll4 => unroll4_sum(zero, range),
        Strategy::Unroll16 => unroll16_sum(zero, range),
        Strategy::Parallel | Strategy::ParallelChunked => {
            let plan = Plan::new(terms, config.threads, 2, config.schedule(2));
            fork_join(&plan, |ranges| ranges.fold(T::zero(), unroll2_sum))?
        }
        Strategy::ParallelUnroll16 => {
            let plan = Plan::new(terms, config.threads, 16, config.schedule(16));
            fork_join(&plan, |ranges| ranges.fold(T::zero(), unroll16_sum))?
        }
        Strategy::Simd => {
            let backend = Backend::detect();
            T::simd_sum(backend, std::iter::once(range))
        }
        Strategy::ParallelSimd | Strategy::ParallelSimdChunked => {
            let backend = Backend::detect();
            let width = T::lanes(backend) as u64;
            let plan = Plan::new(terms, config.threads, width, config.schedule(width));
            fork_join_shared(&plan, |ranges| T::simd_sum(backend, ranges))?
        }
    };

    Ok(sum * T::FOUR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_bound() {
        assert_eq!(truncation_bound(0), 4.0 / 3.0);
        assert!((truncation_bound(10_000) - 4.0 / 20_003.0).abs() < 1e-18);
    }

    #[test]
    fn test_tiers() {
        assert_eq!(N8 * 10, N9);
        assert_eq!(N9 * 10, N10);
    }

    #[test]
    fn test_single_term_is_four() {
        for strategy in Strategy::ALL {
            let config = SeriesConfig::new(0).with_strategy(strategy).with_threads(2);
            let pi = approximate_pi(&config).unwrap();
            assert_eq!(pi.value, 4.0, "{strategy}");
            assert_eq!(pi.terms, 1);
        }
    }
}
