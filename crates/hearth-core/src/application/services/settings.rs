//! The process-wide settings handle.
//!
//! Built once by the shell before anything else runs, then passed by
//! reference to whoever needs configuration. Dropping it removes the
//! instance temp directory.

use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::{
        ConfigLoader, ResolvedLogging,
        ports::{Filesystem, LoggingBackend},
    },
    domain::{AppConfig, AppLayout, CommandLineOverrides, Environment},
    error::HearthResult,
};

/// Loaded and validated configuration of a running instance.
pub struct Settings {
    loader: ConfigLoader,
    // Held for the lifetime of the settings: backends may own writer guards
    // that flush on drop.
    backend: Box<dyn LoggingBackend>,
    released: bool,
}

impl Settings {
    /// Resolve, load and validate configuration, then install logging.
    pub fn init(
        environment: Environment,
        overrides: CommandLineOverrides,
        layout: AppLayout,
        filesystem: Box<dyn Filesystem>,
        backend: Box<dyn LoggingBackend>,
    ) -> HearthResult<Self> {
        Self::from_loader(
            ConfigLoader::new(environment, overrides, layout, filesystem),
            backend,
        )
    }

    /// Same as [`Self::init`] for a loader built by hand.
    pub fn from_loader(
        mut loader: ConfigLoader,
        backend: Box<dyn LoggingBackend>,
    ) -> HearthResult<Self> {
        loader.load_and_validate(backend.as_ref())?;
        Ok(Self {
            loader,
            backend,
            released: false,
        })
    }

    pub fn environment(&self) -> Environment {
        self.loader.environment()
    }

    pub fn is_debug(&self) -> bool {
        self.environment().is_debug()
    }

    pub fn is_testing(&self) -> bool {
        self.environment().is_testing()
    }

    pub fn instance_name(&self) -> String {
        self.loader.instance_name()
    }

    pub fn instance_id(&self) -> Uuid {
        self.loader.instance_id()
    }

    pub fn is_dry_run(&self) -> bool {
        self.loader.is_dry_run()
    }

    pub fn app_config(&self) -> &AppConfig {
        self.loader.app_config()
    }

    pub fn layout(&self) -> &AppLayout {
        self.loader.layout()
    }

    /// Always `Some` once `init` has succeeded.
    pub fn logging(&self) -> Option<&ResolvedLogging> {
        self.loader.logging_state().resolved()
    }

    pub fn instance_tmp_dir_path(&self) -> PathBuf {
        self.loader.instance_tmp_dir_path()
    }

    pub fn config_file_abspaths(&self) -> HearthResult<Vec<PathBuf>> {
        self.loader.config_file_abspaths()
    }

    pub fn logging_config_abspaths(&self) -> HearthResult<Vec<PathBuf>> {
        self.loader.logging_config_abspaths()
    }

    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }

    pub fn logging_backend(&self) -> &dyn LoggingBackend {
        self.backend.as_ref()
    }

    pub fn describe(&self) -> Value {
        self.loader.describe()
    }

    /// Remove the instance temp directory. Runs at most once; failures are
    /// ignored.
    pub fn release_resources(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let tmp_dir = self.loader.instance_tmp_dir_path();
        let filesystem = self.loader.filesystem();
        if filesystem.exists(&tmp_dir) {
            let _ = filesystem.remove_dir_all(&tmp_dir);
        }
        debug!(path = %tmp_dir.display(), "Released instance resources");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for Settings {
    fn drop(&mut self) {
        self.release_resources();
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("environment", &self.environment())
            .field("instance_name", &self.instance_name())
            .field("instance_id", &self.instance_id())
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::path::Path;

    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::{MockFilesystem, MockLoggingBackend};

    const TMP: &str = "/tmp/hearth.tmp/hearth/00000000000000000000000000000007";

    fn layout() -> AppLayout {
        AppLayout {
            app_name: "hearth".into(),
            repo_root: PathBuf::from("/src/hearth"),
            running_from_source: true,
            resources_dir: PathBuf::from("/usr/share/hearth"),
            system_config_dir: PathBuf::from("/etc/hearth"),
            user_config_dir: PathBuf::from("/home/op/.config/hearth"),
            user_data_dir: PathBuf::from("/home/op/.local/share/hearth"),
            default_temp_dir: PathBuf::from("/tmp/hearth.tmp"),
            bundled_logging_config: Cow::Borrowed(
                r#"{"handlers": {"console": {}}, "loggers": {"hearth": {"handlers": ["console"]}}}"#,
            ),
        }
    }

    fn filesystem(remove_calls: usize) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|p| Err(ApplicationError::filesystem(p, "missing").into()));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_exists().returning(|_| true);
        fs.expect_remove_dir_all()
            .withf(|p| p == Path::new(TMP))
            .times(remove_calls)
            .returning(|_| Ok(()));
        fs
    }

    fn settings(fs: MockFilesystem) -> Settings {
        let mut backend = MockLoggingBackend::new();
        backend.expect_apply().returning(|_| Ok(()));

        let loader = ConfigLoader::new(
            Environment::Development,
            CommandLineOverrides::new(),
            layout(),
            Box::new(fs),
        )
        .with_instance_id(Uuid::from_u128(7));
        Settings::from_loader(loader, Box::new(backend)).unwrap()
    }

    #[test]
    fn release_is_idempotent() {
        let mut settings = settings(filesystem(1));

        settings.release_resources();
        settings.release_resources();
        assert!(settings.is_released());
        // Dropping must not remove a second time.
        drop(settings);
    }

    #[test]
    fn drop_releases_resources() {
        let settings = settings(filesystem(1));
        assert!(!settings.is_released());
        drop(settings);
    }

    #[test]
    fn cleanup_failures_are_swallowed() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|p| Err(ApplicationError::filesystem(p, "missing").into()));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_exists().returning(|_| true);
        fs.expect_remove_dir_all()
            .returning(|p| Err(ApplicationError::filesystem(p, "busy").into()));

        let mut settings = settings(fs);
        settings.release_resources();
        assert!(settings.is_released());
    }

    #[test]
    fn exposes_environment_flags() {
        let settings = settings(filesystem(1));

        assert!(settings.is_debug());
        assert!(!settings.is_testing());
        assert!(!settings.is_dry_run());
        assert_eq!(settings.instance_name(), "hearth");
        assert_eq!(settings.instance_tmp_dir_path(), PathBuf::from(TMP));
        assert!(settings.logging().is_some());
    }
}
