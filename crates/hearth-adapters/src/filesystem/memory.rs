//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use hearth_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{HearthError, HearthResult},
};

/// In-memory filesystem for testing.
///
/// Clones share state, so a test can keep one handle while the loader owns
/// another and inspect what happened afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    read_only: HashSet<PathBuf>,
    reads: HashMap<PathBuf, usize>,
}

impl MemoryFilesystemInner {
    fn is_read_only(&self, path: &Path) -> bool {
        self.read_only.iter().any(|root| path.starts_with(root))
    }

    fn add_dir_all(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (and its parent directories).
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            if let Some(parent) = path.parent() {
                inner.add_dir_all(parent);
            }
            inner.files.insert(path.to_path_buf(), content.into());
        }
        self
    }

    /// Refuse every write at or below `path`.
    pub fn with_read_only(self, path: impl AsRef<Path>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.read_only.insert(path.as_ref().to_path_buf());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// How many times `read_to_string` was called for `path`.
    pub fn read_count(&self, path: &Path) -> usize {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.reads.get(path).copied())
            .unwrap_or(0)
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn read_lock(&self) -> HearthResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write_lock(&self) -> HearthResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> HearthError {
    HearthError::Internal {
        message: "memory filesystem lock poisoned".into(),
    }
}

fn denied(path: &Path) -> HearthError {
    ApplicationError::filesystem(path, "Permission denied").into()
}

fn missing(path: &Path) -> HearthError {
    ApplicationError::filesystem(path, "No such file or directory").into()
}

impl Filesystem for MemoryFilesystem {
    fn read_to_string(&self, path: &Path) -> HearthResult<String> {
        let mut inner = self.write_lock()?;
        *inner.reads.entry(path.to_path_buf()).or_default() += 1;
        inner.files.get(path).cloned().ok_or_else(|| missing(path))
    }

    fn create_dir_all(&self, path: &Path) -> HearthResult<()> {
        let mut inner = self.write_lock()?;
        if inner.is_read_only(path) && !inner.directories.contains(path) {
            return Err(denied(path));
        }
        inner.add_dir_all(path);
        Ok(())
    }

    fn open_append(&self, path: &Path) -> HearthResult<()> {
        let mut inner = self.write_lock()?;
        if inner.is_read_only(path) {
            return Err(denied(path));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(missing(path));
            }
        }
        inner.files.entry(path.to_path_buf()).or_default();
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.read_lock()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_dir_all(&self, path: &Path) -> HearthResult<()> {
        let mut inner = self.write_lock()?;
        if inner.is_read_only(path) {
            return Err(denied(path));
        }

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_counted_even_when_missing() {
        let fs = MemoryFilesystem::new().with_file("/etc/hearth/app.yaml", "a: 1\n");

        assert_eq!(fs.read_to_string(Path::new("/etc/hearth/app.yaml")).unwrap(), "a: 1\n");
        assert!(fs.read_to_string(Path::new("/etc/hearth/app.yml")).is_err());
        assert!(fs.read_to_string(Path::new("/etc/hearth/app.yml")).is_err());

        assert_eq!(fs.read_count(Path::new("/etc/hearth/app.yaml")), 1);
        assert_eq!(fs.read_count(Path::new("/etc/hearth/app.yml")), 2);
    }

    #[test]
    fn open_append_needs_a_parent_directory() {
        let fs = MemoryFilesystem::new();
        let log = Path::new("/var/log/hearth/app.log");

        assert!(fs.open_append(log).is_err());
        fs.create_dir_all(log.parent().unwrap()).unwrap();
        fs.open_append(log).unwrap();
        assert_eq!(fs.read_file(log).as_deref(), Some(""));
    }

    #[test]
    fn read_only_roots_refuse_writes() {
        let fs = MemoryFilesystem::new().with_read_only("/var/log");

        assert!(fs.create_dir_all(Path::new("/var/log/hearth")).is_err());
        assert!(fs.open_append(Path::new("/var/log/x.log")).is_err());
        assert!(fs.create_dir_all(Path::new("/tmp/hearth")).is_ok());
    }

    #[test]
    fn remove_dir_all_drops_children() {
        let fs = MemoryFilesystem::new().with_file("/tmp/a/b/c.txt", "x");

        fs.remove_dir_all(Path::new("/tmp/a")).unwrap();
        assert!(!fs.exists(Path::new("/tmp/a/b/c.txt")));
        assert!(!fs.exists(Path::new("/tmp/a/b")));
        assert!(fs.is_dir(Path::new("/tmp")));
    }
}
