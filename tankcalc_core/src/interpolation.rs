//! # Numeric Helpers
//!
//! Shared interpolate-or-clamp routine used by every reference table, the
//! nearest-bucket search used for secondary table keys, and rounding up to a
//! standard plate thickness.
//!
//! ## Example
//!
//! ```rust
//! use tankcalc_core::interpolation::{interpolate, lookup_clamped};
//!
//! assert_eq!(interpolate(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
//!
//! let rows = [(10.0, 1.0), (20.0, 3.0)];
//! assert_eq!(lookup_clamped(15.0, &rows, |r| r.0, |r| r.1), 2.0);
//! assert_eq!(lookup_clamped(99.0, &rows, |r| r.0, |r| r.1), 3.0);
//! ```

use crate::tables::{STANDARD_PLATES_MM, STANDARD_PLATES_IN};
use crate::units::UnitSystem;

/// Linear interpolation of `y` at `x` between `(x1, y1)` and `(x2, y2)`.
///
/// Returns `y1` when both abscissae coincide.
pub fn interpolate(x: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> f64 {
    if x1 == x2 {
        return y1;
    }
    y1 + (x - x1) * (y2 - y1) / (x2 - x1)
}

/// Look up a value in rows sorted ascending by `key`.
///
/// Below the first row the first row's value is returned, above the last row
/// the last row's value; in between the two bracketing rows are linearly
/// interpolated. A NaN `x` yields NaN, and an empty table yields NaN.
pub fn lookup_clamped<T>(x: f64, rows: &[T], key: impl Fn(&T) -> f64, value: impl Fn(&T) -> f64) -> f64 {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return f64::NAN;
    };
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= key(first) {
        return value(first);
    }
    if x >= key(last) {
        return value(last);
    }

    for pair in rows.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        if x >= key(lower) && x <= key(upper) {
            return interpolate(x, key(lower), key(upper), value(lower), value(upper));
        }
    }

    // Rows out of order: interpolate across the end rows.
    interpolate(x, key(first), key(last), value(first), value(last))
}

/// Index of the bucket closest to `target`. The earliest bucket wins a tie.
///
/// Returns 0 for an empty slice or a NaN target.
pub fn nearest_bucket(buckets: &[f64], target: f64) -> usize {
    let mut best = 0;
    for (i, bucket) in buckets.iter().enumerate().skip(1) {
        if (bucket - target).abs() < (buckets[best] - target).abs() {
            best = i;
        }
    }
    best
}

/// Round a thickness up to the next standard plate for the unit system.
///
/// Returns `thickness` unchanged when it exceeds the largest standard plate
/// or is not finite.
pub fn round_up_to_standard(thickness: f64, units: UnitSystem) -> f64 {
    let standards: &[f64] = match units {
        UnitSystem::SI => &STANDARD_PLATES_MM,
        UnitSystem::US => &STANDARD_PLATES_IN,
    };
    standards
        .iter()
        .copied()
        .find(|s| *s >= thickness)
        .unwrap_or(thickness)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_degenerate_abscissa() {
        assert_eq!(interpolate(3.0, 2.0, 2.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn test_lookup_clamps_and_interpolates() {
        let rows = [(10.0, 0.8), (100.0, 0.08), (1000.0, 0.008)];
        let key = |r: &(f64, f64)| r.0;
        let val = |r: &(f64, f64)| r.1;

        assert_eq!(lookup_clamped(1.0, &rows, key, val), 0.8);
        assert_eq!(lookup_clamped(10.0, &rows, key, val), 0.8);
        assert_eq!(lookup_clamped(5000.0, &rows, key, val), 0.008);
        // Midway between 100 and 1000
        let mid = lookup_clamped(550.0, &rows, key, val);
        assert!((mid - 0.044).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_nan_and_empty() {
        let rows = [(10.0, 1.0), (20.0, 2.0)];
        assert!(lookup_clamped(f64::NAN, &rows, |r| r.0, |r| r.1).is_nan());
        let empty: [(f64, f64); 0] = [];
        assert!(lookup_clamped(5.0, &empty, |r| r.0, |r| r.1).is_nan());
    }

    #[test]
    fn test_nearest_bucket_first_wins_tie() {
        let buckets = [24.0, 48.0, 120.0, 240.0, 500.0];
        assert_eq!(nearest_bucket(&buckets, 36.0), 0);
        assert_eq!(nearest_bucket(&buckets, 37.0), 1);
        assert_eq!(nearest_bucket(&buckets, 1_000.0), 4);
        assert_eq!(nearest_bucket(&buckets, f64::NAN), 0);
    }

    #[test]
    fn test_round_up_to_standard() {
        assert_eq!(round_up_to_standard(7.2, UnitSystem::SI), 8.0);
        assert_eq!(round_up_to_standard(8.0, UnitSystem::SI), 8.0);
        assert_eq!(round_up_to_standard(40.0, UnitSystem::SI), 40.0);
        assert_eq!(round_up_to_standard(0.26, UnitSystem::US), 0.3125);
        assert!(round_up_to_standard(f64::INFINITY, UnitSystem::SI).is_infinite());
    }
}
