//! Validation of configuration values
//!
//! Everything here runs before the first checkout. A failure is a
//! configuration error and aborts the run.

use crate::core::error_handling::ContextualError;

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Thresholds must be finite and non-negative
pub fn validate_threshold(name: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(format!(
            "{} must be a finite, non-negative number (got {})",
            name, value
        )));
    }
    Ok(value)
}

/// Worker count must be at least one
pub fn validate_workers(value: usize) -> Result<usize, ValidationError> {
    match value {
        0 => Err(ValidationError::new("workers must be greater than 0")),
        n => Ok(n),
    }
}

/// Normalise a file extension: strip a leading dot, reject separators
pub fn validate_extension(ext: &str) -> Result<String, ValidationError> {
    let cleaned = ext.trim().strip_prefix('.').unwrap_or(ext.trim());

    if cleaned.is_empty() {
        return Err(ValidationError::new("Extension cannot be empty"));
    }

    if cleaned.contains('/') || cleaned.contains('\\') {
        return Err(ValidationError::new(format!(
            "Extension '{}' cannot contain path separators",
            ext
        )));
    }

    Ok(cleaned.to_string())
}

/// Excluded directory names are single path segments
pub fn validate_excluded_dir(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ValidationError::new("Excluded directory name cannot be empty"));
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(ValidationError::new(format!(
            "Excluded directory '{}' must be a single path segment",
            name
        )));
    }
    Ok(trimmed.to_string())
}
