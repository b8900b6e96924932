//! Validation helper functions for configuration types.

use crate::core::errors::{Result, SketchError};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(SketchError::config_field(
            format!("{field} must be greater than 0"),
            field,
        ));
    }
    Ok(())
}

/// Validate that a u64 value is greater than zero.
pub fn validate_positive_u64(value: u64, field: &str) -> Result<()> {
    if value == 0 {
        return Err(SketchError::config_field(
            format!("{field} must be greater than 0"),
            field,
        ));
    }
    Ok(())
}

/// Validate that an f64 value is in the unit range [0.0, 1.0].
pub fn validate_unit_range(value: f64, field: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SketchError::config_field(
            format!("{field} must be between 0.0 and 1.0"),
            field,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_range_accepts_bounds() {
        assert!(validate_unit_range(0.0, "threshold").is_ok());
        assert!(validate_unit_range(1.0, "threshold").is_ok());
        assert!(validate_unit_range(1.01, "threshold").is_err());
        assert!(validate_unit_range(f64::NAN, "threshold").is_err());
    }

    #[test]
    fn positive_checks_name_the_field() {
        let err = validate_positive_usize(0, "compute.num_hashes").unwrap_err();
        assert!(format!("{err}").contains("compute.num_hashes"));
        assert!(validate_positive_u64(3, "x").is_ok());
    }
}
