use std::ops::{Add, Div};

use crate::float::SeriesFloat;

/// A fixed-width group of lanes the accumulation loop runs on.
///
/// Backends wrap a native vector register (AVX2, NEON) or a plain array. The
/// constructors are `unsafe` because native backends may only be built on a
/// CPU that supports their instruction set; once a value exists, arithmetic on
/// it is safe.
pub trait SeriesLanes: Copy + Add<Output = Self> + Div<Output = Self> {
    type Scalar: SeriesFloat;

    /// Number of lanes. Always even.
    const LANES: usize;

    /// All lanes zero.
    ///
    /// # Safety
    ///
    /// The CPU must support the backend's instruction set.
    unsafe fn zero() -> Self;

    /// Broadcasts `value` to every lane.
    ///
    /// # Safety
    ///
    /// The CPU must support the backend's instruction set.
    unsafe fn splat(value: Self::Scalar) -> Self;

    /// Lane `k` holds the index `start + k`, converted after the integer add.
    ///
    /// # Safety
    ///
    /// The CPU must support the backend's instruction set.
    unsafe fn indices(start: u64) -> Self;

    /// The pattern `+1, -1, +1, -1, ...` starting at lane 0.
    ///
    /// # Safety
    ///
    /// The CPU must support the backend's instruction set.
    unsafe fn alternating() -> Self;

    /// Negates every lane.
    fn neg(self) -> Self;

    /// `self * a + b`, fused where the backend has an FMA instruction.
    fn mul_add(self, a: Self, b: Self) -> Self;

    /// Adds the lanes from lane 0 upwards.
    fn horizontal_sum(self) -> Self::Scalar;
}
