//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use std::collections::BTreeMap;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Menu item codes ("C1", "CB3")
pub const MAX_CODE_LEN: usize = 20;

/// Menu item titles
pub const MAX_TITLE_LEN: usize = 100;

/// Batch size labels ("1", "2", "Half pan")
pub const MAX_BATCH_LABEL_LEN: usize = 32;

/// Ingredients, allergens, nutrition notes
pub const MAX_NOTE_LEN: usize = 2000;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Upper bound for any cook or hold time (seconds)
pub const MAX_DURATION_SECONDS: i64 = 24 * 60 * 60;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a duration in seconds: strictly positive and bounded.
pub fn validate_duration(seconds: i64, field: &str) -> Result<(), AppError> {
    if seconds <= 0 || seconds > MAX_DURATION_SECONDS {
        return Err(AppError::validation(format!(
            "{field} must be between 1 and {MAX_DURATION_SECONDS} seconds, got {seconds}"
        )));
    }
    Ok(())
}

/// Validate the ordered batch label list: at least one label, no blanks, no repeats.
pub fn validate_batch_sizes(labels: &[String]) -> Result<(), AppError> {
    if labels.is_empty() {
        return Err(AppError::validation("batchSizes must not be empty"));
    }
    for (i, label) in labels.iter().enumerate() {
        validate_required_text(label, "batch size", MAX_BATCH_LABEL_LEN)?;
        if labels[..i].contains(label) {
            return Err(AppError::validation(format!("Duplicate batch size: {label}")));
        }
    }
    Ok(())
}

/// Validate every cook time in a batch → seconds table.
///
/// Labels missing from the table are allowed; lookups fall back to the default cook time.
pub fn validate_cook_times(cook_times: &BTreeMap<String, i64>) -> Result<(), AppError> {
    for (label, seconds) in cook_times {
        validate_duration(*seconds, &format!("cookTimes[{label}]"))?;
    }
    Ok(())
}
