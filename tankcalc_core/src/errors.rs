//! # Error Types
//!
//! Everything that can stop a calculation, a save or a report. Input
//! errors name the offending field so a form can highlight it; see
//! [`CalcError::field`].
//!
//! Numerically degenerate results (NaN, infinity) are *not* errors; they are
//! embedded in the result structs. See [`crate::calculations::DegenerateReason`].
//!
//! ## Example
//!
//! ```rust
//! use tankcalc_core::errors::{CalcError, CalcResult};
//!
//! fn check_courses(courses: &[f64], adopted: &[f64]) -> CalcResult<()> {
//!     if courses.len() != adopted.len() {
//!         return Err(CalcError::count_mismatch("adopted_thicknesses", courses.len(), adopted.len()));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_courses(&[2.4, 2.4], &[10.0]).unwrap_err();
//! assert_eq!(err.field(), Some("adopted_thicknesses"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tankcalc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Error raised by validation, persistence or report rendering.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A value is outside its allowed range
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A list does not line up with the list it pairs with
    #[error("'{field}' has {actual} entries, expected {expected}")]
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Project is held by another user or process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Project file written by an incompatible schema
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Typst could not compile or export a report
    #[error("{report} report failed: {reason}")]
    ReportFailed { report: String, reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn count_mismatch(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        CalcError::CountMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    pub fn report_failed(report: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ReportFailed {
            report: report.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CalcError::Internal {
            message: message.into(),
        }
    }

    /// Input field the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidInput { field, .. } | CalcError::CountMismatch { field, .. } => Some(field),
            _ => None,
        }
    }

    /// True when retrying later may succeed (a lock can be released)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Short code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::CountMismatch { .. } => "COUNT_MISMATCH",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::ReportFailed { .. } => "REPORT_FAILED",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_json_layout() {
        let error = CalcError::count_mismatch("adopted_thicknesses", 6, 5);
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "CountMismatch");
        assert_eq!(json["details"]["expected"], 6);

        let roundtrip: CalcError = serde_json::from_value(json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_field_of_input_errors() {
        let e = CalcError::invalid_input("joint_efficiency", "1.5", "must be in (0, 1]");
        assert_eq!(e.field(), Some("joint_efficiency"));
        assert_eq!(e.error_code(), "INVALID_INPUT");
        assert_eq!(CalcError::report_failed("Shell", "no font").field(), None);
    }

    #[test]
    fn test_messages() {
        let e = CalcError::count_mismatch("adopted_thicknesses", 3, 2);
        assert_eq!(e.to_string(), "'adopted_thicknesses' has 2 entries, expected 3");
        let e = CalcError::report_failed("Heat exchanger", "unknown font");
        assert_eq!(e.to_string(), "Heat exchanger report failed: unknown font");
    }

    #[test]
    fn test_only_lock_errors_are_recoverable() {
        assert!(CalcError::file_locked("a.tkc", "someone", "now").is_recoverable());
        assert!(!CalcError::invalid_input("diameter", "0", "must be positive").is_recoverable());
        assert!(!CalcError::internal("x").is_recoverable());
    }
}
