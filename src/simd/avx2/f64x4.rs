//! AVX2 4-lane f64 SIMD vector.
//!
//! `F64x4` wraps an `__m256d` holding four consecutive terms of the series in
//! double precision. Denominators are formed with `_mm256_fmadd_pd` and terms
//! with `_mm256_div_pd`.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: AVX, AVX2 and FMA (Haswell and later)
//! - **Target Architecture**: x86 or x86_64

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div};

use crate::{float::SeriesFloat, simd::traits::SeriesLanes};

/// Number of f64 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 4;

/// AVX2 SIMD vector containing 4 packed f64 values.
#[derive(Copy, Clone, Debug)]
pub struct F64x4 {
    /// AVX2 256-bit vector register containing 4 packed f64 values
    pub elements: __m256d,
}

impl Add for F64x4 {
    type Output = Self;

    /// Element-wise addition with `_mm256_add_pd`.
    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_add_pd(self.elements, rhs.elements) },
        }
    }
}

impl Div for F64x4 {
    type Output = Self;

    /// Element-wise division with `_mm256_div_pd`.
    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_div_pd(self.elements, rhs.elements) },
        }
    }
}

impl SeriesLanes for F64x4 {
    type Scalar = f64;

    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self {
            elements: _mm256_setzero_pd(),
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f64) -> Self {
        Self {
            elements: _mm256_set1_pd(value),
        }
    }

    #[inline(always)]
    unsafe fn indices(start: u64) -> Self {
        // _mm256_set_pd takes lanes from high to low.
        Self {
            elements: _mm256_set_pd(
                f64::from_index(start + 3),
                f64::from_index(start + 2),
                f64::from_index(start + 1),
                f64::from_index(start),
            ),
        }
    }

    #[inline(always)]
    unsafe fn alternating() -> Self {
        Self {
            elements: _mm256_set_pd(-1.0, 1.0, -1.0, 1.0),
        }
    }

    /// Flips the sign bit of every lane.
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            elements: unsafe { _mm256_xor_pd(self.elements, _mm256_set1_pd(-0.0)) },
        }
    }

    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { _mm256_fmadd_pd(self.elements, a.elements, b.elements) },
        }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> f64 {
        let mut lanes = [0.0f64; LANE_COUNT];
        unsafe { _mm256_storeu_pd(lanes.as_mut_ptr(), self.elements) };

        lanes[0] + lanes[1] + lanes[2] + lanes[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::avx2;

    fn to_array(v: F64x4) -> [f64; LANE_COUNT] {
        let mut out = [0.0f64; LANE_COUNT];
        unsafe { _mm256_storeu_pd(out.as_mut_ptr(), v.elements) };
        out
    }

    #[test]
    fn test_lane_order() {
        if !avx2::is_available() {
            return;
        }

        unsafe {
            assert_eq!(to_array(F64x4::indices(8)), [8.0, 9.0, 10.0, 11.0]);
            assert_eq!(to_array(F64x4::alternating()), [1.0, -1.0, 1.0, -1.0]);
            assert_eq!(to_array(F64x4::alternating().neg()), [-1.0, 1.0, -1.0, 1.0]);
        }
    }

    #[test]
    fn test_term_block() {
        if !avx2::is_available() {
            return;
        }

        unsafe {
            let denom = F64x4::splat(2.0).mul_add(F64x4::indices(0), F64x4::splat(1.0));
            let terms = F64x4::alternating() / denom;
            assert_eq!(to_array(terms), [1.0, -1.0 / 3.0, 1.0 / 5.0, -1.0 / 7.0]);
            assert_eq!(
                terms.horizontal_sum(),
                1.0 + -1.0 / 3.0 + 1.0 / 5.0 + -1.0 / 7.0
            );
        }
    }
}
