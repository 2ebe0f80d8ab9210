//! Rational time base arithmetic tests.

use std::time::Duration;

use ffmpeg_next::Rational;
use tsremux::time_base::{is_sub_millisecond, scale_numerator, scaled_exceeds, seconds, to_duration};

#[test]
fn scaled_comparison_is_exact() {
    let field = Rational::new(1, 90_000);
    assert!(!scaled_exceeds(field, 2, Rational::new(1, 45_000)));
    assert!(scaled_exceeds(field, 3, Rational::new(1, 45_000)));
    assert!(!scaled_exceeds(field, 1, Rational::new(1, 45_000)));
}

#[test]
fn scaled_comparison_handles_large_terms() {
    let tiny = Rational::new(i32::MAX, i32::MAX - 1);
    assert!(scaled_exceeds(tiny, i32::MAX, Rational::new(i32::MAX - 1, 1)));
}

#[test]
fn invalid_denominators_never_exceed() {
    assert!(!scaled_exceeds(Rational::new(1, 0), 2, Rational::new(1, 90_000)));
    assert!(!scaled_exceeds(Rational::new(1, 25), 2, Rational::new(1, 0)));
    assert!(!scaled_exceeds(Rational::new(1, -25), 2, Rational::new(1, 90_000)));
}

#[test]
fn millisecond_boundary() {
    assert!(!is_sub_millisecond(Rational::new(1, 1000)));
    assert!(is_sub_millisecond(Rational::new(1, 1001)));
    assert!(is_sub_millisecond(Rational::new(1, 90_000)));
    assert!(!is_sub_millisecond(Rational::new(1, 25)));
    assert!(!is_sub_millisecond(Rational::new(1, 0)));
}

#[test]
fn scale_numerator_keeps_denominator() {
    assert_eq!(scale_numerator(Rational::new(1, 50), 2), Rational::new(2, 50));
    assert_eq!(scale_numerator(Rational::new(i32::MAX, 1), 2), Rational::new(i32::MAX, 1));
}

#[test]
fn seconds_from_pts() {
    assert_eq!(seconds(90_000, Rational::new(1, 90_000)), 1.0);
    assert_eq!(seconds(45_000, Rational::new(1, 90_000)), 0.5);
    assert_eq!(seconds(3, Rational::new(2, 50)), 0.12);
    assert_eq!(seconds(-90_000, Rational::new(1, 90_000)), -1.0);
    assert_eq!(seconds(12, Rational::new(1, 0)), 0.0);
}

#[test]
fn duration_conversion_clamps() {
    assert_eq!(to_duration(1.5), Duration::from_millis(1500));
    assert_eq!(to_duration(-2.0), Duration::ZERO);
    assert_eq!(to_duration(f64::NAN), Duration::ZERO);
    assert_eq!(to_duration(f64::INFINITY), Duration::ZERO);
}
