//! AVX2 backend: 256-bit lanes for the series accumulation loop.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: Intel Haswell (2013+) or AMD Excavator (2015+)
//! - **Instruction Sets**: AVX, AVX2 and FMA
//! - **Compilation**: the build script emits `cfg(avx2)` when the host CPU has AVX2;
//!   the kernels enable the target features themselves
//! - **Runtime Detection**: [`is_available`] guards every entry point
//!
//! # Available Types
//!
//! - [`f64x4::F64x4`]: 4 packed double-precision values
//! - [`f32x8::F32x8`]: 8 packed single-precision values

use std::ops::Range;

use crate::simd::accumulate;

pub mod f32x8;

pub mod f64x4;

/// Returns `true` when the running CPU supports every instruction the kernels use.
#[inline]
pub fn is_available() -> bool {
    is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
}

/// Sums `ranges` with 4 × f64 lanes.
///
/// # Safety
///
/// [`is_available`] must return `true`.
#[target_feature(enable = "avx,avx2,fma")]
pub unsafe fn sum_f64x4<I>(ranges: I) -> f64
where
    I: Iterator<Item = Range<u64>> + Clone,
{
    accumulate::<f64x4::F64x4, I>(ranges)
}

/// Sums `ranges` with 8 × f32 lanes.
///
/// # Safety
///
/// [`is_available`] must return `true`.
#[target_feature(enable = "avx,avx2,fma")]
pub unsafe fn sum_f32x8<I>(ranges: I) -> f32
where
    I: Iterator<Item = Range<u64>> + Clone,
{
    accumulate::<f32x8::F32x8, I>(ranges)
}
