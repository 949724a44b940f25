//! Application layer errors.
//!
//! These errors represent failures of the outside world (disk, logging
//! sinks), not policy violations. Those are `DomainError` in `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors raised by adapters behind the application ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The logging backend could not set up one of the configured handlers.
    #[error("Logging handler '{handler}' could not be configured: {reason}")]
    LoggingBackend { handler: String, reason: String },
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::LoggingBackend { handler, .. } => vec![
                format!("Check the '{handler}' handler in your logging config"),
                "Use --logging-config-path to point at a different logging config".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } => ErrorCategory::Internal,
            Self::LoggingBackend { .. } => ErrorCategory::Configuration,
        }
    }
}
