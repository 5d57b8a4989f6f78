//! Application Error Types
//!
//! The binary handles a single top-level error type; every area error
//! converts into it.

use std::path::PathBuf;

use crate::core::error_handling::ContextualError;
use crate::core::validation::ValidationError;
use crate::executor::ExecutorError;
use crate::export::ExportError;
use crate::scanner::WalkerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid option value
    #[error(transparent)]
    Configuration(#[from] ValidationError),

    /// Configuration file missing, unreadable or malformed
    #[error("Configuration file {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    #[error("Failed to initialise logging: {message}")]
    Logging { message: String },

    #[error(transparent)]
    Walker(#[from] WalkerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    pub fn config_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::ConfigFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Configuration(_) | AppError::ConfigFile { .. } => 2,
            _ => 1,
        }
    }
}

impl ContextualError for AppError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppError::Configuration(_) | AppError::ConfigFile { .. } => true,
            AppError::Walker(e) => e.is_user_actionable(),
            AppError::Export(e) => e.is_user_actionable(),
            AppError::Logging { .. } | AppError::Executor(_) => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            AppError::Configuration(e) => e.user_message(),
            AppError::ConfigFile { message, .. } => Some(message),
            AppError::Walker(e) => e.user_message(),
            AppError::Export(e) => e.user_message(),
            AppError::Logging { .. } | AppError::Executor(_) => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_actionable() {
        let err: AppError = ValidationError::new("workers must be greater than 0").into();
        assert!(err.is_user_actionable());
        assert_eq!(err.user_message(), Some("workers must be greater than 0"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_repository_errors_are_system_errors() {
        let err: AppError = WalkerError::Repository {
            message: "not a git repository".to_string(),
        }
        .into();
        assert!(!err.is_user_actionable());
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("not a git repository"));
    }
}
