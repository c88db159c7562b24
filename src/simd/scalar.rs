//! Portable lanes for targets without a native vector backend.
//!
//! [`Lanes`] keeps the same lane counts as the AVX2 backend (4 × f64,
//! 8 × f32), so partition plans and summation order do not change when the
//! build falls back to it.

use std::ops::{Add, Div};

use crate::{float::SeriesFloat, simd::traits::SeriesLanes};

pub const F64_LANE_COUNT: usize = 4;

pub const F32_LANE_COUNT: usize = 8;

/// `N` scalars processed as one vector.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lanes<T, const N: usize> {
    pub elements: [T; N],
}

impl<T: SeriesFloat, const N: usize> Add for Lanes<T, N> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: std::array::from_fn(|k| self.elements[k] + rhs.elements[k]),
        }
    }
}

impl<T: SeriesFloat, const N: usize> Div for Lanes<T, N> {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: std::array::from_fn(|k| self.elements[k] / rhs.elements[k]),
        }
    }
}

impl<T: SeriesFloat, const N: usize> SeriesLanes for Lanes<T, N> {
    type Scalar = T;

    const LANES: usize = N;

    #[inline(always)]
    unsafe fn zero() -> Self {
        Self {
            elements: [T::zero(); N],
        }
    }

    #[inline(always)]
    unsafe fn splat(value: T) -> Self {
        Self {
            elements: [value; N],
        }
    }

    #[inline(always)]
    unsafe fn indices(start: u64) -> Self {
        Self {
            elements: std::array::from_fn(|k| T::from_index(start + k as u64)),
        }
    }

    #[inline(always)]
    unsafe fn alternating() -> Self {
        Self {
            elements: std::array::from_fn(|k| if k % 2 == 0 { T::one() } else { -T::one() }),
        }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            elements: self.elements.map(|x| -x),
        }
    }

    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        // 2 * i is exact, so the fused and unfused forms round 2i + 1 once and agree.
        Self {
            elements: std::array::from_fn(|k| self.elements[k] * a.elements[k] + b.elements[k]),
        }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> T {
        self.elements.iter().fold(T::zero(), |acc, &x| acc + x)
    }
}
