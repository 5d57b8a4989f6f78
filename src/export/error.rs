//! Export Error Types

use std::path::PathBuf;

use crate::core::error_handling::ContextualError;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A matrix file that cannot be read back
    #[error("Malformed matrix at row {row}: {message}")]
    Malformed { row: usize, message: String },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ContextualError for ExportError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ExportError::Io { .. } | ExportError::Malformed { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ExportError::Io { .. } => Some("Cannot write the output files; check --output-dir"),
            ExportError::Malformed { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
