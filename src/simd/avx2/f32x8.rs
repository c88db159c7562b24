//! AVX2 8-lane f32 SIMD vector.
//!
//! `F32x8` wraps an `__m256` holding eight consecutive terms of the series in
//! single precision. It is the wide, less accurate counterpart of
//! [`F64x4`](super::f64x4::F64x4).
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

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX2 256-bit vector register containing 8 packed f32 values
    pub elements: __m256,
}

impl Add for F32x8 {
    type Output = Self;

    /// Element-wise addition with `_mm256_add_ps`.
    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_add_ps(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x8 {
    type Output = Self;

    /// Element-wise division with `_mm256_div_ps`.
    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_div_ps(self.elements, rhs.elements) },
        }
    }
}

impl SeriesLanes for F32x8 {
    type Scalar = f32;

    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self {
            elements: _mm256_setzero_ps(),
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: _mm256_set1_ps(value),
        }
    }

    #[inline(always)]
    unsafe fn indices(start: u64) -> Self {
        // Add in u64 first: start + 7 may not be representable once start is converted.
        Self {
            elements: _mm256_setr_ps(
                f32::from_index(start),
                f32::from_index(start + 1),
                f32::from_index(start + 2),
                f32::from_index(start + 3),
                f32::from_index(start + 4),
                f32::from_index(start + 5),
                f32::from_index(start + 6),
                f32::from_index(start + 7),
            ),
        }
    }

    #[inline(always)]
    unsafe fn alternating() -> Self {
        Self {
            elements: _mm256_setr_ps(1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0),
        }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            elements: unsafe { _mm256_xor_ps(self.elements, _mm256_set1_ps(-0.0)) },
        }
    }

    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { _mm256_fmadd_ps(self.elements, a.elements, b.elements) },
        }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> f32 {
        let mut lanes = [0.0f32; LANE_COUNT];
        unsafe { _mm256_storeu_ps(lanes.as_mut_ptr(), self.elements) };

        lanes.iter().fold(0.0, |acc, &x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::avx2;

    fn to_array(v: F32x8) -> [f32; LANE_COUNT] {
        let mut out = [0.0f32; LANE_COUNT];
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), v.elements) };
        out
    }

    #[test]
    fn test_lane_order() {
        if !avx2::is_available() {
            return;
        }

        unsafe {
            assert_eq!(
                to_array(F32x8::indices(16)),
                [16.0, 17.0, 18.0, 19.0, 20.0, 21.0, 22.0, 23.0]
            );
            assert_eq!(
                to_array(F32x8::alternating().neg()),
                [-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]
            );
        }
    }

    #[test]
    fn test_indices_are_added_before_conversion() {
        if !avx2::is_available() {
            return;
        }

        let start = (1u64 << 25) + 1;
        let lanes = unsafe { to_array(F32x8::indices(start)) };
        for (k, lane) in lanes.iter().enumerate() {
            assert_eq!(*lane, (start + k as u64) as f32);
        }
    }
}
