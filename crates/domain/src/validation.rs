//! Input validation for flag management
//!
//! Keys end up in URLs, log fields and the rollout hash input, so they are
//! restricted to a conservative character set.

use crate::constants::{MAX_DISPLAY_NAME_LENGTH, MAX_FLAG_KEY_LENGTH};
use crate::errors::{FlagwiseError, Result};

/// Validate a flag key.
///
/// Keys are non-empty, at most [`MAX_FLAG_KEY_LENGTH`] characters, and use
/// only ASCII alphanumerics, `-`, `_` and `.`.
///
/// # Errors
/// Returns `FlagwiseError::Validation` describing the problem.
pub fn validate_flag_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(FlagwiseError::Validation("flag key must not be empty".into()));
    }
    if key.len() > MAX_FLAG_KEY_LENGTH {
        return Err(FlagwiseError::Validation(format!(
            "flag key must be at most {MAX_FLAG_KEY_LENGTH} characters, got {}",
            key.len()
        )));
    }
    if let Some(invalid) = key.chars().find(|c| !is_key_char(*c)) {
        return Err(FlagwiseError::Validation(format!(
            "flag key '{key}' contains invalid character '{invalid}'"
        )));
    }
    Ok(())
}

/// Validate a human-readable display name.
///
/// # Errors
/// Returns `FlagwiseError::Validation` when blank or too long.
pub fn validate_display_name(display_name: &str) -> Result<()> {
    if display_name.trim().is_empty() {
        return Err(FlagwiseError::Validation("display name must not be empty".into()));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(FlagwiseError::Validation(format!(
            "display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

const fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}
