//! ARM NEON backend: 128-bit lanes for the series accumulation loop.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: any AArch64 processor (NEON is part of the base ISA)
//! - **Target Architecture**: AArch64; `vdivq_*` has no ARMv7 equivalent
//! - **Runtime Detection**: none needed
//!
//! # Platform Support
//!
//! - **Apple Silicon**: M1, M2, M3 processors (macOS, iOS)
//! - **AWS Graviton**: Graviton2, Graviton3 processors

use std::ops::Range;

use crate::simd::accumulate;

pub mod f32x4;

pub mod f64x2;

/// Sums `ranges` with 2 × f64 lanes.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn sum_f64x2<I>(ranges: I) -> f64
where
    I: Iterator<Item = Range<u64>> + Clone,
{
    accumulate::<f64x2::F64x2, I>(ranges)
}

/// Sums `ranges` with 4 × f32 lanes.
///
/// # Safety
///
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn sum_f32x4<I>(ranges: I) -> f32
where
    I: Iterator<Item = Range<u64>> + Clone,
{
    accumulate::<f32x4::F32x4, I>(ranges)
}
