//! Validation helper functions for configuration types.

use crate::core::errors::{NpsError, Result};

/// Validate that an f64 value is greater than zero.
pub fn validate_positive_f64(value: f64, field: &str) -> Result<()> {
    if value <= 0.0 {
        return Err(NpsError::validation_field(
            format!("{} must be greater than 0.0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that a record field or column name is not blank.
pub fn validate_field_name(name: &str, field: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NpsError::validation_field(
            format!("{} must not be empty", field),
            field,
        ));
    }
    Ok(())
}
