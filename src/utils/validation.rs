//! Input validation helpers
//!
//! Centralized text length constants plus the bridge from `validator`'s
//! field-level errors to [`AppError`]. Validation always runs before any
//! state mutation, and the full error list is collected rather than stopping
//! at the first failure.

use validator::{Validate, ValidationErrors};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, observations, chat messages
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: cep, street number, payment ids
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Run derive-based validation on a request payload, collecting every field
/// error into one response.
pub fn check(payload: &impl Validate) -> Result<(), AppError> {
    payload.validate().map_err(flatten)
}

/// Flatten `ValidationErrors` into a single `AppError::Validation` carrying
/// the full per-field error list.
pub fn flatten(errors: ValidationErrors) -> AppError {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    details.sort();

    AppError::Validation {
        message: "Invalid request body".to_string(),
        details: Some(details),
    }
}

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
