//! # Error Types
//!
//! Structured error types for finish_core. Each variant carries enough
//! context (field names, offending values, bounds) for the console layer to
//! print a useful message and for tests to match on the failure kind.
//!
//! ## Example
//!
//! ```rust
//! use finish_core::errors::{CalcError, CalcResult};
//!
//! fn validate_price(price: f64) -> CalcResult<()> {
//!     if price <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "price_per_unit",
//!             price.to_string(),
//!             "Price must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for finish_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A value is outside its declared domain (raised at construction or assignment)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// An area is outside the calculator's configured bounds
    #[error("Value for '{field}' out of range: {value} (allowed {min} to {max})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// An argument has the wrong shape (empty list, unknown surface, missing height...)
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// The calculation store failed
    #[error("Persistence error during {operation}: {reason}")]
    Persistence { operation: String, reason: String },

    /// Report rendering failed
    #[error("Export to {format} failed: {reason}")]
    Export { format: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an OutOfRange error
    pub fn out_of_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        CalcError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create a Persistence error
    pub fn persistence(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Persistence {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an Export error
    pub fn export(format: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Export {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by user-entered values; the console layer
    /// re-prompts for these instead of aborting the current action.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::OutOfRange { .. }
                | CalcError::InvalidArgument { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::OutOfRange { .. } => "OUT_OF_RANGE",
            CalcError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            CalcError::Persistence { .. } => "PERSISTENCE_ERROR",
            CalcError::Export { .. } => "EXPORT_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::out_of_range("area", 0.05, 0.1, 10000.0);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"OutOfRange\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalcError::invalid_argument("materials", "empty").error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            CalcError::persistence("save_calculation", "disk full").error_code(),
            "PERSISTENCE_ERROR"
        );
    }

    #[test]
    fn test_input_errors_are_flagged() {
        assert!(CalcError::invalid_input("roll_width", "-1", "must be positive").is_input_error());
        assert!(CalcError::out_of_range("area", 0.0, 0.1, 1.0).is_input_error());
        assert!(!CalcError::export("pdf", "font missing").is_input_error());
    }

    #[test]
    fn test_display_names_field() {
        let error = CalcError::invalid_input("tile_width", "3", "Tile width cannot exceed 2 m");
        assert_eq!(
            error.to_string(),
            "Invalid input for 'tile_width': 3 - Tile width cannot exceed 2 m"
        );
    }
}
