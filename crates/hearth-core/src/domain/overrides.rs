use serde::Serialize;

use crate::domain::paths::non_blank;

/// Values the command line may use to override configuration.
///
/// Every field is independently optional; a blank string means the same as
/// an absent one. The record is read-only once handed to a loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandLineOverrides {
    pub config_file_path: Option<String>,
    pub log_file_path: Option<String>,
    pub logging_config_path: Option<String>,
    pub process_name_suffix: Option<String>,
    pub dry_run: Option<bool>,
}

impl CommandLineOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file_path(mut self, path: impl Into<String>) -> Self {
        self.config_file_path = Some(path.into());
        self
    }

    pub fn with_log_file_path(mut self, path: impl Into<String>) -> Self {
        self.log_file_path = Some(path.into());
        self
    }

    pub fn with_logging_config_path(mut self, path: impl Into<String>) -> Self {
        self.logging_config_path = Some(path.into());
        self
    }

    pub fn with_process_name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.process_name_suffix = Some(suffix.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    /// `--config-file-path`, unless blank.
    pub fn config_file_path(&self) -> Option<&str> {
        non_blank(self.config_file_path.as_deref())
    }

    /// `--log-file-path`, unless blank.
    pub fn log_file_path(&self) -> Option<&str> {
        non_blank(self.log_file_path.as_deref())
    }

    /// `--logging-config-path`, unless blank.
    pub fn logging_config_path(&self) -> Option<&str> {
        non_blank(self.logging_config_path.as_deref())
    }

    /// Trimmed `--process-name-suffix`; empty when absent.
    pub fn process_name_suffix(&self) -> &str {
        self.process_name_suffix.as_deref().map_or("", str::trim)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }
}
