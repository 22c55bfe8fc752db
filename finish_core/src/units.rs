//! # Unit Types
//!
//! Thin newtype wrappers for the metric quantities the calculator works in,
//! plus the two rounding rules the rest of the crate relies on.
//!
//! ## Units
//!
//! - Length: metres (m)
//! - Area: square metres (m²)
//!
//! Money is kept as a plain `f64` in the currency of the price list; the
//! currency symbol is display-only.
//!
//! ## Example
//!
//! ```rust
//! use finish_core::units::{Meters, SquareMeters};
//!
//! let width = Meters(0.53);
//! let length = Meters(10.05);
//! let roll: SquareMeters = width * length;
//! assert_eq!(roll.normalized().0, 5.3265);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Significant digits kept in derived coverages.
pub const COVERAGE_SIGNIFICANT_DIGITS: usize = 12;

/// Highest number of decimal digits money can be rounded to.
pub const MAX_PRECISION: u32 = 10;

// ============================================================================
// Length / Area
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Area in square metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

impl Mul<Meters> for Meters {
    type Output = SquareMeters;
    fn mul(self, rhs: Meters) -> SquareMeters {
        SquareMeters(self.0 * rhs.0)
    }
}

impl SquareMeters {
    /// Round to [`COVERAGE_SIGNIFICANT_DIGITS`] significant digits.
    ///
    /// Products such as `0.3 * 0.3 * 10` land one ulp below the intended
    /// 0.9 m², which would make `ceil(9 / coverage)` buy an eleventh box.
    /// The rounding is relative, so tiny areas keep their magnitude.
    pub fn normalized(self) -> Self {
        if self.0 == 0.0 || !self.0.is_finite() {
            return self;
        }
        let text = format!("{:.*e}", COVERAGE_SIGNIFICANT_DIGITS - 1, self.0);
        SquareMeters(text.parse().unwrap_or(self.0))
    }
}

// ============================================================================
// Rounding
// ============================================================================

/// Round a money amount to `precision` decimal digits, half away from zero.
///
/// Values too large to scale without overflow are returned unchanged (they
/// already carry fewer fractional digits than requested).
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(SquareMeters);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_product_is_area() {
        let area = Meters(4.0) * Meters(3.0);
        assert_eq!(area, SquareMeters(12.0));
    }

    #[test]
    fn test_normalized_removes_product_noise() {
        let raw = Meters(0.3) * Meters(0.3) * 10.0;
        assert!(raw.0 < 0.9);
        assert_eq!(raw.normalized().0, 0.9);
    }

    #[test]
    fn test_normalized_keeps_exact_values() {
        assert_eq!(SquareMeters(5.3265).normalized().0, 5.3265);
        assert_eq!(SquareMeters(2.13072).normalized().0, 2.13072);
        assert_eq!((Meters(0.53) * Meters(10.05)).normalized().0, 5.3265);
        assert_eq!(SquareMeters(1.0 + 1e-14).normalized().0, 1.0);
    }

    #[test]
    fn test_normalized_keeps_small_areas() {
        let raw = Meters(0.0015) * Meters(0.0015);
        assert_eq!(raw.normalized().0, 2.25e-6);

        let tiny = Meters(0.0005) * Meters(0.0005);
        assert!(tiny.normalized().0 > 0.0);
        assert_eq!(tiny.normalized().0, 2.5e-7);
        assert_eq!(SquareMeters(0.0).normalized().0, 0.0);
    }

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(7200.0, 2), 7200.0);
        assert_eq!(round_to_precision(1234.5678, 2), 1234.57);
        assert_eq!(round_to_precision(1234.5678, 0), 1235.0);
        assert_eq!(round_to_precision(2.5, 0), 3.0);
    }

    #[test]
    fn test_round_huge_value_is_untouched() {
        let huge = 1e300;
        assert_eq!(round_to_precision(huge, 10), huge);
    }

    #[test]
    fn test_arithmetic() {
        let a = SquareMeters(35.0);
        let b = SquareMeters(3.5);
        assert_eq!((a - b).0, 31.5);
        assert_eq!((a + b).0, 38.5);
        assert_eq!((Meters(7.0) * 2.0).0, 14.0);
        assert_eq!((a / 2.0).value(), 17.5);
    }

    #[test]
    fn test_serialization() {
        let m = Meters(2.5);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "2.5");

        let roundtrip: Meters = serde_json::from_str(&json).unwrap();
        assert_eq!(m, roundtrip);
    }
}
