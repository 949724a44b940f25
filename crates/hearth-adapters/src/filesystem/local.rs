//! Local filesystem adapter using std::fs.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use hearth_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{HearthError, HearthResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> HearthResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> HearthResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e))
    }

    fn open_append(&self, path: &Path) -> HearthResult<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(drop)
            .map_err(|e| map_io_error(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir_all(&self, path: &Path) -> HearthResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e))
    }
}

fn map_io_error(path: &Path, e: io::Error) -> HearthError {
    ApplicationError::filesystem(path, e).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_append_creates_and_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        let fs = LocalFilesystem::new();

        fs.open_append(&log).unwrap();
        assert!(fs.exists(&log));

        std::fs::write(&log, "kept\n").unwrap();
        fs.open_append(&log).unwrap();
        assert_eq!(fs.read_to_string(&log).unwrap(), "kept\n");
    }

    #[test]
    fn io_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let err = LocalFilesystem::new().read_to_string(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn open_append_fails_without_parent() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("missing").join("app.log");

        assert!(LocalFilesystem::new().open_append(&log).is_err());
    }
}
