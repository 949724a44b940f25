//! Unified error handling for Hearth Core.
//!
//! This module provides the root error type that wraps domain and application
//! errors, plus the distinguished [`ImproperlyConfigured`] error that batches
//! every configuration problem found during startup.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Configuration problems collected during startup, keyed by the offending
/// location (a file path or a command line option).
///
/// Reported as a whole so an operator can fix every location in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImproperlyConfigured {
    errors: BTreeMap<String, String>,
}

impl ImproperlyConfigured {
    /// Create an empty error collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error with exactly one entry.
    pub fn single(location: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(location, message);
        errors
    }

    /// Record a problem for `location`. A later message replaces an earlier
    /// one for the same location.
    pub fn insert(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(location.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Path (or option) → diagnostic message.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// `Err(self)` if anything was collected, `Ok(())` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ImproperlyConfigured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (location, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{location}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ImproperlyConfigured {}

/// Root error type for Hearth Core operations.
#[derive(Debug, Error, Clone)]
pub enum HearthError {
    /// Errors from the domain layer (path policy violations).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (I/O, adapters).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// One or more configuration locations are unusable.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(#[from] ImproperlyConfigured),

    /// An application config file exists but is not valid YAML.
    #[error("Malformed config file {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// The logging config bundled with the binary does not parse.
    #[error("Bundled logging config is corrupt: {reason}")]
    BundledResourceCorrupt { reason: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl HearthError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::ImproperlyConfigured(errors) => {
                let mut suggestions: Vec<String> = errors
                    .errors()
                    .iter()
                    .map(|(location, message)| format!("{location}: {message}"))
                    .collect();
                suggestions.push("Fix every location listed above and start again".into());
                suggestions
            }
            Self::ConfigParse { path, .. } => vec![
                format!("Check the YAML syntax of {}", path.display()),
                "Config files must contain a YAML mapping at the top level".into(),
            ],
            Self::BundledResourceCorrupt { .. } => vec![
                "The installation is broken: the bundled logging config does not parse".into(),
                "Reinstall hearth, or pass --logging-config-path explicitly".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in hearth".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
            Self::ImproperlyConfigured(_)
            | Self::ConfigParse { .. }
            | Self::BundledResourceCorrupt { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// `true` for the distinguished configuration error: batched problems or a
    /// path rejected by the environment's policy.
    pub fn is_improperly_configured(&self) -> bool {
        matches!(
            self,
            Self::ImproperlyConfigured(_) | Self::Domain(DomainError::RelativePathNotAllowed { .. })
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type HearthResult<T> = Result<T, HearthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Environment;

    #[test]
    fn improperly_configured_display_lists_every_location() {
        let mut errors = ImproperlyConfigured::new();
        errors.insert("/var/log/b.log", "denied");
        errors.insert("/var/log/a.log", "missing");

        assert_eq!(
            errors.to_string(),
            "/var/log/a.log: missing; /var/log/b.log: denied"
        );
    }

    #[test]
    fn empty_collector_is_ok() {
        assert!(ImproperlyConfigured::new().into_result().is_ok());
        assert!(ImproperlyConfigured::single("x", "y").into_result().is_err());
    }

    #[test]
    fn relative_path_rejection_counts_as_improperly_configured() {
        let err: HearthError = DomainError::RelativePathNotAllowed {
            option: "--config-file-path",
            environment: Environment::Test,
            path: "relative.yaml".into(),
        }
        .into();

        assert!(err.is_improperly_configured());
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn suggestions_include_each_batched_error() {
        let err = HearthError::from(ImproperlyConfigured::single("/x.log", "nope"));
        assert!(err.suggestions().iter().any(|s| s == "/x.log: nope"));
    }
}
