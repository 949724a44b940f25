//! Runtime layout detection.
//!
//! Works out, once at startup, whether we run from a source checkout or an
//! installed binary and where the XDG base directories point.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use hearth_core::domain::{AppLayout, paths};
use tracing::debug;

use crate::resources;

/// Workspace root recorded at build time.
fn build_repo_root() -> PathBuf {
    paths::normalize(&Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(".."))
}

/// Installed resources live in `<prefix>/share/<app>`, next to `<prefix>/bin`.
fn installed_resources_dir(app_name: &str) -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("/usr"))
        .join("share")
        .join(app_name)
}

/// Detect the layout of the running binary.
///
/// The checkout counts as present while the workspace manifest this binary
/// was built from still exists.
pub fn detect_layout(app_name: &str) -> AppLayout {
    let repo_root = build_repo_root();
    let running_from_source = repo_root.join("Cargo.toml").is_file();

    let (user_config_base, user_data_base) = match BaseDirs::new() {
        Some(dirs) => (dirs.config_dir().to_path_buf(), dirs.data_dir().to_path_buf()),
        None => {
            let fallback = std::env::temp_dir();
            (fallback.join(".config"), fallback.join(".local").join("share"))
        }
    };

    let layout = AppLayout {
        app_name: app_name.to_string(),
        repo_root,
        running_from_source,
        resources_dir: installed_resources_dir(app_name),
        system_config_dir: Path::new("/etc").join(app_name),
        user_config_dir: user_config_base.join(app_name),
        user_data_dir: user_data_base.join(app_name),
        default_temp_dir: std::env::temp_dir().join(format!("{app_name}.tmp")),
        bundled_logging_config: Cow::Borrowed(resources::BUNDLED_LOGGING_CONFIG),
    };

    debug!(
        running_from_source = layout.running_from_source,
        repo_root = %layout.repo_root.display(),
        resources = %layout.resources_dir.display(),
        "Detected runtime layout"
    );
    layout
}

/// A layout with every location below `root`, for tests.
///
/// `<root>/repo`, `<root>/share`, `<root>/etc`, `<root>/config`,
/// `<root>/data` and `<root>/tmp`.
pub fn sandboxed_layout(app_name: &str, root: &Path, running_from_source: bool) -> AppLayout {
    AppLayout {
        app_name: app_name.to_string(),
        repo_root: root.join("repo"),
        running_from_source,
        resources_dir: root.join("share").join(app_name),
        system_config_dir: root.join("etc").join(app_name),
        user_config_dir: root.join("config").join(app_name),
        user_data_dir: root.join("data").join(app_name),
        default_temp_dir: root.join("tmp").join(format!("{app_name}.tmp")),
        bundled_logging_config: Cow::Borrowed(resources::BUNDLED_LOGGING_CONFIG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detected_layout_uses_app_name_everywhere() {
        let layout = detect_layout("hearth");

        assert_eq!(layout.system_config_dir, PathBuf::from("/etc/hearth"));
        assert!(layout.user_config_dir.ends_with("hearth"));
        assert!(layout.user_data_dir.ends_with("hearth"));
        assert!(layout.default_temp_dir.ends_with("hearth.tmp"));
        assert!(layout.resources_dir.ends_with("share/hearth"));
    }

    #[test]
    fn tests_run_from_the_checkout() {
        let layout = detect_layout("hearth");

        assert!(layout.running_from_source);
        assert!(layout.repo_config_file("logging_config.json").is_file());
    }

    #[test]
    fn sandbox_stays_under_root() {
        let layout = sandboxed_layout("hearth", Path::new("/sandbox"), false);

        for dir in [
            &layout.repo_root,
            &layout.resources_dir,
            &layout.system_config_dir,
            &layout.user_config_dir,
            &layout.user_data_dir,
            &layout.default_temp_dir,
        ] {
            assert!(dir.starts_with("/sandbox"));
        }
    }
}
