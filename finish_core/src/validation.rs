//! # Input Validation
//!
//! Parsing helpers for values typed by the user, and the bound checks shared
//! by every validated setter in the crate.
//!
//! Both `.` and `,` are accepted as decimal separator so that `2,5` and
//! `2.5` mean the same length.
//!
//! ```rust
//! use finish_core::validation::validate_positive_number;
//!
//! assert_eq!(validate_positive_number("2,5", "Height").unwrap(), 2.5);
//! assert!(validate_positive_number("abc", "Height").is_err());
//! assert!(validate_positive_number("0", "Height").is_err());
//! ```

use crate::errors::{CalcError, CalcResult};

/// Parse user text as a strictly positive number.
///
/// Fails with an error naming `name` when the text is not a finite number or
/// is zero/negative.
pub fn validate_positive_number(value: &str, name: &str) -> CalcResult<f64> {
    let number = parse_number(value, name)?;
    if number <= 0.0 {
        return Err(CalcError::invalid_input(
            name,
            value.trim(),
            format!("{name} must be a positive number"),
        ));
    }
    Ok(number)
}

/// Parse user text as a number that may be zero (door/window areas, reserve).
pub fn validate_non_negative_number(value: &str, name: &str) -> CalcResult<f64> {
    let number = parse_number(value, name)?;
    if number < 0.0 {
        return Err(CalcError::invalid_input(
            name,
            value.trim(),
            format!("{name} cannot be negative"),
        ));
    }
    Ok(number)
}

fn parse_number(value: &str, name: &str) -> CalcResult<f64> {
    let normalized = value.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(CalcError::invalid_input(
            name,
            value.trim(),
            format!("{name} must be a number"),
        )),
    }
}

// ============================================================================
// Bound checks used by constructors and setters
// ============================================================================

/// Require `0 < value <= max`.
pub(crate) fn check_dimension(field: &str, value: f64, max: f64, label: &str) -> CalcResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("{label} must be positive"),
        ));
    }
    if value > max {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("{label} cannot exceed {max} m"),
        ));
    }
    Ok(value)
}

/// Require a derived coverage that is finite and above zero.
pub(crate) fn check_coverage(coverage: f64) -> CalcResult<f64> {
    if !coverage.is_finite() || coverage <= 0.0 {
        return Err(CalcError::invalid_input(
            "unit_coverage",
            coverage.to_string(),
            "Dimensions give no usable coverage",
        ));
    }
    Ok(coverage)
}

/// Require `0 < count <= max`.
pub(crate) fn check_count(field: &str, count: u32, max: u32, label: &str) -> CalcResult<u32> {
    if count == 0 {
        return Err(CalcError::invalid_input(
            field,
            count.to_string(),
            format!("{label} must be positive"),
        ));
    }
    if count > max {
        return Err(CalcError::invalid_input(
            field,
            count.to_string(),
            format!("{label} cannot exceed {max}"),
        ));
    }
    Ok(count)
}

/// Require a finite, strictly positive value.
pub(crate) fn check_positive(field: &str, value: f64, label: &str) -> CalcResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("{label} must be positive"),
        ));
    }
    Ok(value)
}

/// Require a finite value that is not negative.
pub(crate) fn check_non_negative(field: &str, value: f64, label: &str) -> CalcResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("{label} cannot be negative"),
        ));
    }
    Ok(value)
}

/// Require a percentage in `[0, 100]`.
pub(crate) fn check_percent(field: &str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            "Percentage must be between 0 and 100",
        ));
    }
    Ok(value)
}

/// Require non-blank text, returned trimmed.
pub(crate) fn check_text(field: &str, value: &str, label: &str) -> CalcResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CalcError::invalid_input(
            field,
            value,
            format!("{label} cannot be empty"),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_number_parses() {
        assert_eq!(validate_positive_number("25", "Area").unwrap(), 25.0);
        assert_eq!(validate_positive_number(" 0.53 ", "Width").unwrap(), 0.53);
        assert_eq!(validate_positive_number("10,05", "Length").unwrap(), 10.05);
    }

    #[test]
    fn test_positive_number_rejects_zero_and_negative() {
        let err = validate_positive_number("0", "Area").unwrap_err();
        assert!(err.to_string().contains("Area must be a positive number"));
        assert!(validate_positive_number("-3", "Area").is_err());
    }

    #[test]
    fn test_positive_number_rejects_text() {
        let err = validate_positive_number("ten", "Price").unwrap_err();
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "Price"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(validate_positive_number("", "Price").is_err());
        assert!(validate_positive_number("inf", "Price").is_err());
        assert!(validate_positive_number("NaN", "Price").is_err());
    }

    #[test]
    fn test_non_negative_number() {
        assert_eq!(validate_non_negative_number("0", "Door area").unwrap(), 0.0);
        assert_eq!(validate_non_negative_number("1,5", "Window area").unwrap(), 1.5);
        assert!(validate_non_negative_number("-0.1", "Door area").is_err());
    }

    #[test]
    fn test_check_dimension_bounds() {
        assert!(check_dimension("roll_width", 5.0, 5.0, "Roll width").is_ok());
        assert!(check_dimension("roll_width", 5.01, 5.0, "Roll width").is_err());
        assert!(check_dimension("roll_width", 0.0, 5.0, "Roll width").is_err());
        assert!(check_dimension("roll_width", f64::NAN, 5.0, "Roll width").is_err());
    }

    #[test]
    fn test_check_percent_edges() {
        assert!(check_percent("reserve_percent", 0.0).is_ok());
        assert!(check_percent("reserve_percent", 100.0).is_ok());
        assert!(check_percent("reserve_percent", -1.0).is_err());
        assert!(check_percent("reserve_percent", 101.0).is_err());
    }

    #[test]
    fn test_check_text_trims() {
        assert_eq!(check_text("name", "  Oak  ", "Name").unwrap(), "Oak");
        assert!(check_text("name", "   ", "Name").is_err());
    }
}
