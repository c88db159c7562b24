//! Scalar summation kernels.
//!
//! Each kernel adds the terms `(-1)^i / (2i + 1)` for `i` in a half-open index
//! range to an existing accumulator, strictly in increasing index order. The
//! kernels differ only in how they produce the sign:
//!
//! | Kernel            | Sign source                          |
//! |-------------------|--------------------------------------|
//! | [`power_sum`]     | `num::pow::pow(-1, i)`               |
//! | [`flag_sum`]      | boolean toggled every term, branched |
//! | [`sign_sum`]      | sign variable negated every term     |
//! | [`unrolled_sum`]  | fixed `+,-,+,-` pattern per block    |
//!
//! Because the terms and their order are identical, every kernel returns the
//! same bits for the same accumulator, range and precision.

use std::ops::Range;

use crate::float::SeriesFloat;

/// Reference kernel: the sign of each term comes from a general
/// exponentiation routine.
pub fn power_sum<T: SeriesFloat>(acc: T, range: Range<u64>) -> T {
    let minus_one = -T::one();

    range.fold(acc, |acc, i| {
        // Only the parity of the exponent matters, so truncation to usize is harmless.
        let sign = num::pow::pow(minus_one, i as usize);
        acc + sign / T::denominator(i)
    })
}

/// Branches on a flag that flips after every term.
pub fn flag_sum<T: SeriesFloat>(acc: T, range: Range<u64>) -> T {
    let mut positive = range.start % 2 == 0;
    let mut acc = acc;

    for i in range {
        if positive {
            acc = acc + T::one() / T::denominator(i);
        } else {
            acc = acc - T::one() / T::denominator(i);
        }
        positive = !positive;
    }

    acc
}

/// Multiplies each term by a sign variable negated after every term.
#[inline(always)]
pub fn sign_sum<T: SeriesFloat>(acc: T, range: Range<u64>) -> T {
    let mut sign = if range.start % 2 == 0 {
        T::one()
    } else {
        -T::one()
    };
    let mut acc = acc;

    for i in range {
        acc = acc + sign / T::denominator(i);
        sign = -sign;
    }

    acc
}

/// Processes `W` terms per iteration with statically known signs.
///
/// An odd range start is handled by summing the first term on its own so that
/// every block starts at an even index. The last `(len mod W)` terms are
/// summed by [`sign_sum`].
///
/// # Panics
///
/// Panics in debug builds if `W` is zero or odd.
#[inline(always)]
pub fn unrolled_sum<T: SeriesFloat, const W: usize>(acc: T, range: Range<u64>) -> T {
    debug_assert!(W > 0 && W % 2 == 0, "Unroll width must be even and non-zero");

    if range.is_empty() {
        return acc;
    }

    let mut acc = acc;
    let mut start = range.start;

    if start % 2 == 1 {
        acc = acc - T::one() / T::denominator(start);
        start += 1;
    }

    let width = W as u64;
    let blocks_end = start + (range.end.saturating_sub(start) / width) * width;

    let mut i = start;
    while i < blocks_end {
        for k in (0..width).step_by(2) {
            acc = acc + T::one() / T::denominator(i + k);
            acc = acc - T::one() / T::denominator(i + k + 1);
        }
        i += width;
    }

    sign_sum(acc, blocks_end..range.end)
}

#[inline(always)]
pub fn unroll2_sum<T: SeriesFloat>(acc: T, range: Range<u64>) -> T {
    unrolled_sum::<T, 2>(acc, range)
}

#[inline(always)]
pub fn unroll4_sum<T: SeriesFloat>(acc: T, range: Range<u64>) -> T {
    unrolled_sum::<T, 4>(acc, range)
}

#[inline(always)]
pub fn unroll16_sum<T: SeriesFloat>(acc: T, range: Range<u64>) -> T {
    unrolled_sum::<T, 16>(acc, range)
}

#[cfg(test)]
mod tests {
    use super::*;

    type Kernel = fn(f64, Range<u64>) -> f64;

    const KERNELS: &[(&str, Kernel)] = &[
        ("power", power_sum::<f64>),
        ("flag", flag_sum::<f64>),
        ("sign", sign_sum::<f64>),
        ("unroll2", unroll2_sum::<f64>),
        ("unroll4", unroll4_sum::<f64>),
        ("unroll16", unroll16_sum::<f64>),
    ];

    #[test]
    fn test_single_term() {
        for (name, kernel) in KERNELS {
            assert_eq!(kernel(0.0, 0..1), 1.0, "{name}");
        }
    }

    #[test]
    fn test_empty_range_returns_accumulator() {
        for (name, kernel) in KERNELS {
            assert_eq!(kernel(0.25, 5..5), 0.25, "{name}");
        }
    }

    #[test]
    fn test_odd_start_uses_negative_sign() {
        for (name, kernel) in KERNELS {
            assert_eq!(kernel(0.0, 1..2), -1.0 / 3.0, "{name}");
        }
    }

    #[test]
    fn test_kernels_agree_bit_for_bit() {
        for range in [0..1_000u64, 3..1_003, 0..17, 1..18, 7..40] {
            let reference = sign_sum(0.0f64, range.clone());
            for (name, kernel) in KERNELS {
                assert_eq!(
                    kernel(0.0, range.clone()).to_bits(),
                    reference.to_bits(),
                    "{name} diverges on {range:?}"
                );
            }
        }
    }

    #[test]
    fn test_split_range_continues_accumulator() {
        let whole = unroll16_sum(0.0f64, 0..333);
        let split = unroll16_sum(unroll16_sum(0.0f64, 0..160), 160..333);
        assert_eq!(whole.to_bits(), split.to_bits());
    }
}
