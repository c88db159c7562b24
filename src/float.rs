//! Precision-generic floating-point support.
//!
//! Every strategy is written once against [`SeriesFloat`] and instantiated for
//! `f32` and `f64`, so the accuracy gap between the two widths can be observed
//! by running the same code at both precisions.

use std::fmt;
use std::iter::Sum;

use num::Float;

/// Floating-point scalar an accumulator can be built on.
pub trait SeriesFloat:
    Float + Default + Send + Sync + Sum + fmt::Debug + fmt::Display + 'static
{
    /// Width of the type in bits.
    const BITS: u32;

    const TWO: Self;

    const FOUR: Self;

    /// Converts a term index to a float, rounding like an `as` cast.
    fn from_index(i: u64) -> Self;

    /// Lossless widening used for reporting.
    fn widen(self) -> f64;

    /// Raw bit pattern stored in the low bits of a `u64`.
    fn to_bits_u64(self) -> u64;

    /// Inverse of [`SeriesFloat::to_bits_u64`].
    fn from_bits_u64(bits: u64) -> Self;

    /// Denominator `2i + 1` of term `i`.
    #[inline(always)]
    fn denominator(i: u64) -> Self {
        Self::TWO * Self::from_index(i) + Self::one()
    }
}

impl SeriesFloat for f32 {
    const BITS: u32 = 32;
    const TWO: f32 = 2.0;
    const FOUR: f32 = 4.0;

    #[inline(always)]
    fn from_index(i: u64) -> Self {
        i as f32
    }

    #[inline(always)]
    fn widen(self) -> f64 {
        f64::from(self)
    }

    #[inline(always)]
    fn to_bits_u64(self) -> u64 {
        u64::from(self.to_bits())
    }

    #[inline(always)]
    fn from_bits_u64(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl SeriesFloat for f64 {
    const BITS: u32 = 64;
    const TWO: f64 = 2.0;
    const FOUR: f64 = 4.0;

    #[inline(always)]
    fn from_index(i: u64) -> Self {
        i as f64
    }

    #[inline(always)]
    fn widen(self) -> f64 {
        self
    }

    #[inline(always)]
    fn to_bits_u64(self) -> u64 {
        self.to_bits()
    }

    #[inline(always)]
    fn from_bits_u64(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}
