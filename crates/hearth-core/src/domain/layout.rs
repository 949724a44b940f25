use std::borrow::Cow;
use std::path::PathBuf;

/// Every location the configuration policy depends on, captured once.
///
/// Detection (environment variables, executable path, source tree probing)
/// happens in `hearth-adapters`; the policy only ever reads this struct, so
/// tests can build one by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLayout {
    /// Base application name, e.g. `hearth`.
    pub app_name: String,
    /// Root of the source checkout. Meaningless unless `running_from_source`.
    pub repo_root: PathBuf,
    /// `true` when started from inside the source checkout, `false` when
    /// running an installed binary.
    pub running_from_source: bool,
    /// Directory holding the resources shipped with an installed binary.
    pub resources_dir: PathBuf,
    /// System-wide config directory, `/etc/<app>`.
    pub system_config_dir: PathBuf,
    /// Per-user config base, `$XDG_CONFIG_HOME/<app>`.
    pub user_config_dir: PathBuf,
    /// Per-user data base, `$XDG_DATA_HOME/<app>`.
    pub user_data_dir: PathBuf,
    /// Default scratch base, `<system temp>/<app>.tmp`.
    pub default_temp_dir: PathBuf,
    /// Logging config used when no external logging layer loads.
    pub bundled_logging_config: Cow<'static, str>,
}

impl AppLayout {
    /// `<repo>/config/<file>`
    pub fn repo_config_file(&self, file: &str) -> PathBuf {
        self.repo_root.join("config").join(file)
    }

    /// `<repo>/log/<file>`
    pub fn repo_log_file(&self, file: &str) -> PathBuf {
        self.repo_root.join("log").join(file)
    }

    /// `<resources>/<file>`
    pub fn resource_file(&self, file: &str) -> PathBuf {
        self.resources_dir.join(file)
    }
}
