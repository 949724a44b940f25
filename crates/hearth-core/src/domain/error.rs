use thiserror::Error;

use crate::domain::Environment;
use crate::error::ErrorCategory;

/// Violations of an environment's location policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Development and test refuse relative overrides: the only base they
    /// could be resolved against is a system-wide location.
    #[error("Relative paths for {option} are not allowed in {environment} mode! (got '{path}')")]
    RelativePathNotAllowed {
        option: &'static str,
        environment: Environment,
        path: String,
    },

    #[error("Unknown environment '{0}'")]
    UnknownEnvironment(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::RelativePathNotAllowed {
                option,
                environment,
                path,
            } => vec![
                format!("Pass an absolute path to {option}, e.g. $(pwd)/{path}"),
                format!("Relative paths are only resolved in production, not in {environment}"),
            ],
            Self::UnknownEnvironment(_) => {
                vec!["Valid environments are: development, test, production".into()]
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RelativePathNotAllowed { .. } => ErrorCategory::Configuration,
            Self::UnknownEnvironment(_) => ErrorCategory::Validation,
        }
    }
}
