//! Driven (output) ports - implemented by infrastructure.

use std::path::Path;

use crate::domain::LoggingConfig;
use crate::error::HearthResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `hearth_adapters::filesystem::LocalFilesystem` (production)
/// - `hearth_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> HearthResult<String>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> HearthResult<()>;

    /// Open `path` for appending, creating it if missing, then close it.
    fn open_append(&self, path: &Path) -> HearthResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> HearthResult<()>;
}

/// Port for the process-wide logging system.
///
/// Implemented by `hearth_cli::logging::TracingBackend`.
#[cfg_attr(test, mockall::automock)]
pub trait LoggingBackend: Send + Sync {
    /// Install a post-processed logging config.
    ///
    /// Failures should be reported as `ApplicationError::LoggingBackend`
    /// naming the handler, wrapped in a `HearthError`.
    fn apply(&self, config: &LoggingConfig) -> HearthResult<()>;
}
