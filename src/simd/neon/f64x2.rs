//! NEON 2-lane f64 SIMD vector.
//!
//! `F64x2` wraps a `float64x2_t` holding two consecutive terms of the series
//! in double precision. Denominators are formed with `vfmaq_f64` and terms
//! with `vdivq_f64`.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: any AArch64 processor (NEON is part of the base ISA)
//! - **Target Architecture**: AArch64 only

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use std::ops::{Add, Div};

use crate::{float::SeriesFloat, simd::traits::SeriesLanes};

/// Number of f64 elements that fit in a NEON 128-bit vector.
pub(crate) const LANE_COUNT: usize = 2;

/// NEON SIMD vector containing 2 packed f64 values.
#[derive(Copy, Clone, Debug)]
pub struct F64x2 {
    /// NEON 128-bit vector register containing 2 packed f64 values
    pub elements: float64x2_t,
}

impl Add for F64x2 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vaddq_f64(self.elements, rhs.elements) },
        }
    }
}

impl Div for F64x2 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vdivq_f64(self.elements, rhs.elements) },
        }
    }
}

impl SeriesLanes for F64x2 {
    type Scalar = f64;

    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self {
            elements: vdupq_n_f64(0.0),
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f64) -> Self {
        Self {
            elements: vdupq_n_f64(value),
        }
    }

    #[inline(always)]
    unsafe fn indices(start: u64) -> Self {
        let lanes = [f64::from_index(start), f64::from_index(start + 1)];

        Self {
            elements: vld1q_f64(lanes.as_ptr()),
        }
    }

    #[inline(always)]
    unsafe fn alternating() -> Self {
        let lanes = [1.0f64, -1.0];

        Self {
            elements: vld1q_f64(lanes.as_ptr()),
        }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            elements: unsafe { vnegq_f64(self.elements) },
        }
    }

    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { vfmaq_f64(b.elements, self.elements, a.elements) },
        }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> f64 {
        let mut lanes = [0.0f64; LANE_COUNT];
        unsafe { vst1q_f64(lanes.as_mut_ptr(), self.elements) };

        lanes[0] + lanes[1]
    }
}
