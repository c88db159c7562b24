//! Fixed-width lane accumulation.
//!
//! The accumulation loop is written once in [`accumulate`] against the
//! [`SeriesLanes`] trait. Each backend supplies lane types for both
//! precisions:
//!
//! | Backend    | f64 lanes | f32 lanes | Selected when                          |
//! |------------|-----------|-----------|----------------------------------------|
//! | `avx2`     | 4         | 8         | `cfg(avx2)` and AVX2 + FMA at runtime  |
//! | `neon`     | 2         | 4         | `cfg(neon)` on AArch64                 |
//! | `portable` | 4         | 8         | otherwise                              |

use std::fmt;
use std::ops::Range;

use tracing::debug;

use crate::{float::SeriesFloat, series::sign_sum};

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx2;

#[cfg(all(neon, target_arch = "aarch64"))]
pub mod neon;

pub mod scalar;

pub mod traits;

pub use traits::SeriesLanes;

/// Sums the terms of every range in `ranges` with lanes of type `V`.
///
/// One vector accumulator is carried across all ranges. Each range contributes
/// its full `V::LANES`-wide blocks in increasing index order; the remaining
/// `len mod V::LANES` indices of each range are summed with a scalar loop after
/// the lanes are reduced, so `ranges` is walked twice.
///
/// # Safety
///
/// The CPU must support the instruction set `V` is built on.
#[inline(always)]
pub unsafe fn accumulate<V, I>(ranges: I) -> V::Scalar
where
    V: SeriesLanes,
    I: Iterator<Item = Range<u64>> + Clone,
{
    let width = V::LANES as u64;

    let two = V::splat(<V::Scalar as SeriesFloat>::TWO);
    let one = V::splat(num::one());
    let even_sign = V::alternating();
    let odd_sign = even_sign.neg();

    let mut acc = V::zero();

    for range in ranges.clone() {
        let blocks_end = blocks_end(&range, width);
        // Blocks keep the parity of the range start because the lane count is even.
        let sign = if range.start % 2 == 0 {
            even_sign
        } else {
            odd_sign
        };

        let mut i = range.start;
        while i < blocks_end {
            let denominator = two.mul_add(V::indices(i), one);
            acc = acc + sign / denominator;
            i += width;
        }
    }

    let mut total = acc.horizontal_sum();

    for range in ranges {
        total = sign_sum(total, blocks_end(&range, width)..range.end);
    }

    total
}

#[inline(always)]
fn blocks_end(range: &Range<u64>, width: u64) -> u64 {
    let len = range.end.saturating_sub(range.start);
    range.start + (len / width) * width
}

/// Instruction set the lane loop runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Avx2,
    Neon,
    Portable,
}

impl Backend {
    /// Picks the widest backend this build and CPU support.
    pub fn detect() -> Self {
        #[allow(unused_mut)]
        let mut backend = Backend::Portable;

        #[cfg(all(neon, target_arch = "aarch64"))]
        {
            backend = Backend::Neon;
        }

        #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
        {
            if avx2::is_available() {
                backend = Backend::Avx2;
            }
        }

        debug!(backend = backend.name(), "selected simd backend");
        backend
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Avx2 => "avx2",
            Backend::Neon => "neon",
            Backend::Portable => "portable",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Precision-specific entry into the lane loop.
///
/// A backend that is not compiled in, or not supported by the running CPU,
/// falls back to the portable lanes, which have the same width as AVX2.
pub trait SimdSum: SeriesFloat {
    /// Lanes per vector on `backend`, after any fallback.
    fn lanes(backend: Backend) -> usize;

    /// Sums the terms of `ranges` on `backend`.
    fn simd_sum<I>(backend: Backend, ranges: I) -> Self
    where
        I: Iterator<Item = Range<u64>> + Clone;
}

impl SimdSum for f64 {
    fn lanes(backend: Backend) -> usize {
        match backend {
            Backend::Neon if cfg!(all(neon, target_arch = "aarch64")) => 2,
            _ => scalar::F64_LANE_COUNT,
        }
    }

    fn simd_sum<I>(backend: Backend, ranges: I) -> Self
    where
        I: Iterator<Item = Range<u64>> + Clone,
    {
        match backend {
            #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
            Backend::Avx2 if avx2::is_available() => unsafe { avx2::sum_f64x4(ranges) },
            #[cfg(all(neon, target_arch = "aarch64"))]
            Backend::Neon => unsafe { neon::sum_f64x2(ranges) },
            _ => unsafe { accumulate::<scalar::Lanes<f64, { scalar::F64_LANE_COUNT }>, I>(ranges) },
        }
    }
}

impl SimdSum for f32 {
    fn lanes(backend: Backend) -> usize {
        match backend {
            Backend::Neon if cfg!(all(neon, target_arch = "aarch64")) => 4,
            _ => scalar::F32_LANE_COUNT,
        }
    }

    fn simd_sum<I>(backend: Backend, ranges: I) -> Self
    where
        I: Iterator<Item = Range<u64>> + Clone,
    {
        match backend {
            #[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
            Backend::Avx2 if avx2::is_available() => unsafe { avx2::sum_f32x8(ranges) },
            #[cfg(all(neon, target_arch = "aarch64"))]
            Backend::Neon => unsafe { neon::sum_f32x4(ranges) },
            _ => unsafe { accumulate::<scalar::Lanes<f32, { scalar::F32_LANE_COUNT }>, I>(ranges) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Portable64 = scalar::Lanes<f64, 4>;

    #[test]
    fn test_single_range_with_tail() {
        for end in [0u64, 1, 2, 3, 4, 5, 9, 103] {
            let lanes = unsafe { accumulate::<Portable64, _>(std::iter::once(0..end)) };
            let reference = sign_sum(0.0f64, 0..end);
            assert!(
                (lanes - reference).abs() < 1e-15,
                "end={end}: {lanes} vs {reference}"
            );
        }
    }

    #[test]
    fn test_odd_start_flips_sign_pattern() {
        let lanes = unsafe { accumulate::<Portable64, _>(std::iter::once(3..11)) };
        let reference = sign_sum(0.0f64, 3..11);
        assert!((lanes - reference).abs() < 1e-15);
    }

    #[test]
    fn test_many_ranges_match_whole_range() {
        let ranges = [0..40u64, 80..120, 40..80, 120..130];
        let split = unsafe { accumulate::<Portable64, _>(ranges.iter().cloned()) };
        let whole = sign_sum(0.0f64, 0..130);
        assert!((split - whole).abs() < 1e-14);
    }

    #[test]
    fn test_detected_backend_matches_portable() {
        let backend = Backend::detect();
        let ranges = std::iter::once(0..10_001u64);

        let native = f64::simd_sum(backend, ranges.clone());
        let portable = f64::simd_sum(Backend::Portable, ranges.clone());
        assert!((native - portable).abs() < 1e-12, "{backend}: {native} vs {portable}");

        let native = f32::simd_sum(backend, ranges.clone());
        let portable = f32::simd_sum(Backend::Portable, ranges);
        assert!((native - portable).abs() < 1e-4, "{backend}: {native} vs {portable}");
    }

    #[test]
    fn test_lane_counts_are_even() {
        for backend in [Backend::Avx2, Backend::Neon, Backend::Portable] {
            assert_eq!(f64::lanes(backend) % 2, 0);
            assert_eq!(f32::lanes(backend) % 2, 0);
        }
    }
}
