//! Scanner Error Types

use crate::core::error_handling::ContextualError;

/// Failure to read the repository itself
#[derive(Debug, Clone, thiserror::Error)]
pub enum WalkerError {
    /// Repository could not be opened or its references read
    #[error("Repository error: {message}")]
    Repository { message: String },
    /// The repository has no working tree to check out into
    #[error("Repository at {path} has no working tree")]
    Bare { path: String },
    /// The `git` executable used for checkouts cannot be run
    #[error("Cannot run '{program}': {message}")]
    GitUnavailable { program: String, message: String },
    /// IO operation failed
    #[error("IO error: {message}")]
    Io { message: String },
}

impl ContextualError for WalkerError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            WalkerError::Bare { .. } | WalkerError::GitUnavailable { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            WalkerError::Bare { .. } => {
                Some("The repository is bare; point repodrift at a clone with a working tree")
            }
            WalkerError::GitUnavailable { .. } => {
                Some("Checkouts need the git executable; install git or put it on PATH")
            }
            _ => None,
        }
    }
}

impl From<CheckoutError> for WalkerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::GitUnavailable { program, message } => {
                WalkerError::GitUnavailable { program, message }
            }
            other => WalkerError::Io {
                message: other.to_string(),
            },
        }
    }
}

pub type WalkerResult<T> = Result<T, WalkerError>;

/// Failure to move the working tree to a commit
///
/// Recoverable: the caller logs it and skips the tag.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git checkout of '{rev}' failed: {stderr}")]
    Git { rev: String, stderr: String },

    #[error("Cannot run '{program}': {message}")]
    GitUnavailable { program: String, message: String },
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;
