//! Path resolution helpers.
//!
//! Everything here is lexical: the filesystem is never consulted, so symlinks
//! are not followed and non-existent paths resolve fine.

use std::path::{Component, Path, PathBuf};

/// Turn `path` into an absolute path, using `base_dir` for relative input.
///
/// Absolute input is returned unchanged apart from normalisation.
pub fn resolve(path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base_dir.as_ref().join(path))
    }
}

/// Drop `.` components and fold `..` into its parent.
///
/// `..` at the root stays at the root, like the kernel does.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `true` for a missing value or one made only of whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// `Some(value)` unless blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_is_returned_unchanged() {
        assert_eq!(
            resolve("/etc/hearth/app.yaml", "/home/user"),
            PathBuf::from("/etc/hearth/app.yaml")
        );
    }

    #[test]
    fn relative_path_is_joined_with_base() {
        assert_eq!(
            resolve("relative/path/config_file.yaml", "/srv/repo"),
            PathBuf::from("/srv/repo/relative/path/config_file.yaml")
        );
    }

    #[test]
    fn dots_are_normalized() {
        assert_eq!(
            resolve("./a/../b/./c.log", "/base/dir"),
            PathBuf::from("/base/dir/b/c.log")
        );
        assert_eq!(resolve("../../../x", "/a"), PathBuf::from("/x"));
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("  \t")));
        assert!(!is_blank(Some("x")));
        assert_eq!(non_blank(Some(" ")), None);
        assert_eq!(non_blank(Some("/a")), Some("/a"));
    }
}
