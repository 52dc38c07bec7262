//! Static configuration checks
//!
//! Validation runs on the desired state alone, before any remote call.
//! A failure is a value, not a panic: callers get a [`ValidationError`]
//! naming the offending field.

use thiserror::Error;

/// A desired configuration that violates a static constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// String attribute outside its length bounds
    #[error("Attribute {field} string length must be between {min} and {max}, got: {actual}")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// Two boolean attributes that must not both be true
    #[error("{field} can not be set to true when {other} is true")]
    Conflict {
        field: &'static str,
        other: &'static str,
    },
}

impl ValidationError {
    /// Name of the field the error is reported against
    pub fn field(&self) -> &'static str {
        match self {
            Self::Length { field, .. } | Self::Conflict { field, .. } => field,
        }
    }
}

/// Check that `value` is between `min` and `max` characters long (inclusive)
pub fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::Length {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

/// Reject `field = true` while `other = true`
pub fn check_exclusive(
    field: &'static str,
    value: bool,
    other: &'static str,
    other_value: bool,
) -> Result<(), ValidationError> {
    if value && other_value {
        return Err(ValidationError::Conflict { field, other });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_bounds() {
        assert!(check_length("name", "a", 1, 64).is_ok());
        assert!(check_length("name", &"x".repeat(64), 1, 64).is_ok());

        let err = check_length("name", "", 1, 64).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute name string length must be between 1 and 64, got: 0"
        );

        let err = check_length("name", &"x".repeat(65), 1, 64).unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_check_length_counts_chars() {
        // 64 multi-byte chars are still 64 characters
        assert!(check_length("name", &"é".repeat(64), 1, 64).is_ok());
    }

    #[test]
    fn test_check_exclusive() {
        assert!(check_exclusive("a", true, "b", false).is_ok());
        assert!(check_exclusive("a", false, "b", true).is_ok());
        assert!(check_exclusive("a", false, "b", false).is_ok());

        let err = check_exclusive("admin_privileges", true, "auto_join", true).unwrap_err();
        assert!(err.to_string().contains("can not be set to"));
        assert_eq!(err.field(), "admin_privileges");
    }
}
