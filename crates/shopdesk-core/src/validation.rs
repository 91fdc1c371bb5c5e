//! Boundary validation for values written to the document store.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("'{field}' is required")]
    Missing { field: &'static str },

    #[error("'{field}' must be a finite, non-negative number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("'{field}' must be an integer between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("'{field}' must be a whole number, got {value}")]
    NotAnInteger { field: &'static str, value: f64 },

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),

    #[error("status must be one of pending, shipped, delivered, cancelled; got '{0}'")]
    UnknownStatus(String),

    #[error("unknown product tag '{0}'")]
    UnknownTag(String),

    #[error("'{field}' is not a valid date: '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("'{field}' is not a valid email address")]
    InvalidEmail { field: &'static str },
}

/// Require a non-blank string, returning it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] when the value is absent or blank.
pub fn require_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(ValidationError::Missing { field }),
    }
}

/// Check that a monetary amount is finite and not negative.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAmount`] for NaN, infinities, and negatives.
pub fn amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidAmount { field, value })
    }
}

/// Check that a count is a non-negative integer that fits in `u32`.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`] otherwise.
pub fn count(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange {
        field,
        min: 0,
        max: i64::from(u32::MAX),
        value,
    })
}

/// Convert a JSON number to an integer, rejecting fractional values.
///
/// # Errors
///
/// Returns [`ValidationError::NotAnInteger`] when `value` has a fractional part
/// or is not finite.
#[allow(clippy::cast_possible_truncation)]
pub fn whole_number(field: &'static str, value: f64) -> Result<i64, ValidationError> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Ok(value as i64)
    } else {
        Err(ValidationError::NotAnInteger { field, value })
    }
}
