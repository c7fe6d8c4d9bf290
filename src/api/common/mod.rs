//! Helpers shared by every route group.

pub mod form;
pub mod tracing;

pub use form::AppForm;

use crate::errors::AppError;

/// Returns the trimmed value of a required query parameter, or a 400.
pub fn require_param(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", name))),
    }
}
