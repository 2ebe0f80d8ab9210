//! Exact rational arithmetic on stream time bases.
//!
//! Time bases are seconds-per-tick rationals ([`Rational`]). The comparisons
//! here cross-multiply in 128-bit integers instead of going through `f64`,
//! so `1/90000 × 2` versus `1/45000` compares equal rather than depending on
//! rounding. A time base with a non-positive denominator is treated as
//! unknown: every comparison involving it is `false`.

use std::time::Duration;

use ffmpeg_next::Rational;

/// Whether `time_base × ticks_per_frame` is strictly greater than `other`.
pub fn scaled_exceeds(time_base: Rational, ticks_per_frame: i32, other: Rational) -> bool {
    if time_base.denominator() <= 0 || other.denominator() <= 0 {
        return false;
    }

    let left = i128::from(time_base.numerator())
        * i128::from(ticks_per_frame)
        * i128::from(other.denominator());
    let right = i128::from(other.numerator()) * i128::from(time_base.denominator());
    left > right
}

/// Whether one tick of `time_base` is shorter than one millisecond.
pub fn is_sub_millisecond(time_base: Rational) -> bool {
    if time_base.denominator() <= 0 {
        return false;
    }
    i128::from(time_base.numerator()) * 1000 < i128::from(time_base.denominator())
}

/// `time_base` with its numerator multiplied by `ticks_per_frame`.
///
/// The denominator is left untouched and the result is not reduced.
pub fn scale_numerator(time_base: Rational, ticks_per_frame: i32) -> Rational {
    Rational::new(
        time_base.numerator().saturating_mul(ticks_per_frame),
        time_base.denominator(),
    )
}

/// Convert a timestamp in `time_base` ticks to seconds.
///
/// Evaluated as `pts × num / den` in `f64`. Returns `0.0` when the
/// denominator is zero.
pub fn seconds(pts: i64, time_base: Rational) -> f64 {
    if time_base.denominator() == 0 {
        return 0.0;
    }
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Convert seconds to a [`Duration`], clamping negatives to zero.
pub fn to_duration(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
