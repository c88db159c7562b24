//! NEON 4-lane f32 SIMD vector.
//!
//! `F32x4` wraps a `float32x4_t` holding four consecutive terms of the series
//! in single precision. It is the wide, less accurate counterpart of
//! [`F64x2`](super::f64x2::F64x2).
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: any AArch64 processor (NEON is part of the base ISA)
//! - **Target Architecture**: AArch64 only

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use std::ops::{Add, Div};

use crate::{float::SeriesFloat, simd::traits::SeriesLanes};

/// Number of f32 elements that fit in a NEON 128-bit vector.
pub(crate) const LANE_COUNT: usize = 4;

/// NEON SIMD vector containing 4 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x4 {
    /// NEON 128-bit vector register containing 4 packed f32 values
    pub elements: float32x4_t,
}

impl Add for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vaddq_f32(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vdivq_f32(self.elements, rhs.elements) },
        }
    }
}

impl SeriesLanes for F32x4 {
    type Scalar = f32;

    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self {
            elements: vdupq_n_f32(0.0),
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: vdupq_n_f32(value),
        }
    }

    #[inline(always)]
    unsafe fn indices(start: u64) -> Self {
        let lanes: [f32; LANE_COUNT] = std::array::from_fn(|k| f32::from_index(start + k as u64));

        Self {
            elements: vld1q_f32(lanes.as_ptr()),
        }
    }

    #[inline(always)]
    unsafe fn alternating() -> Self {
        let lanes = [1.0f32, -1.0, 1.0, -1.0];

        Self {
            elements: vld1q_f32(lanes.as_ptr()),
        }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            elements: unsafe { vnegq_f32(self.elements) },
        }
    }

    /// `vfmaq_f32(b, self, a)` computes `b + self * a` in one rounding.
    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { vfmaq_f32(b.elements, self.elements, a.elements) },
        }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> f32 {
        let mut lanes = [0.0f32; LANE_COUNT];
        unsafe { vst1q_f32(lanes.as_mut_ptr(), self.elements) };

        lanes[0] + lanes[1] + lanes[2] + lanes[3]
    }
}
