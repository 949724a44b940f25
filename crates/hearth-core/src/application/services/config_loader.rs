//! Config Loader - resolves and validates external configuration.
//!
//! The loader ties the environment's location policy to actual files:
//! 1. Resolve candidate config and logging config locations
//! 2. Merge every YAML layer that reads, abort on one that doesn't parse
//! 3. Merge JSON logging layers and post-process them (memoized)
//! 4. Probe the log file, then hand the logging config to the backend
//! 5. Create the per-instance temp directory

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, LoggingBackend},
    },
    domain::{
        AppConfig, AppLayout, CommandLineOverrides, Environment, LoggingConfig,
        PostProcessOptions, paths,
    },
    error::{HearthError, HearthResult, ImproperlyConfigured},
};

/// Logging config after merge and post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLogging {
    /// Post-processed document, ready for a [`LoggingBackend`].
    pub config: LoggingConfig,
    /// `filename` found on a file handler before the resolved path was
    /// injected.
    pub configured_log_file: Option<String>,
    /// Resolved log file. `None` when file logging is disabled.
    pub filelog_path: Option<PathBuf>,
}

impl ResolvedLogging {
    pub fn is_file_logging_enabled(&self) -> bool {
        self.filelog_path.is_some()
    }
}

/// Whether the logging config has been computed yet.
///
/// It moves from `Pending` to `Resolved` once and never back; a fresh
/// loader is the only way to recompute it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoggingState {
    #[default]
    Pending,
    Resolved(ResolvedLogging),
}

impl LoggingState {
    pub fn resolved(&self) -> Option<&ResolvedLogging> {
        match self {
            Self::Pending => None,
            Self::Resolved(resolved) => Some(resolved),
        }
    }
}

/// External config loader for one application instance.
pub struct ConfigLoader {
    environment: Environment,
    overrides: CommandLineOverrides,
    layout: AppLayout,
    filesystem: Box<dyn Filesystem>,
    instance_id: Uuid,
    app_config: AppConfig,
    logging: LoggingState,
}

impl ConfigLoader {
    pub fn new(
        environment: Environment,
        overrides: CommandLineOverrides,
        layout: AppLayout,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            environment,
            overrides,
            layout,
            filesystem,
            instance_id: Uuid::new_v4(),
            app_config: AppConfig::new(),
            logging: LoggingState::Pending,
        }
    }

    /// Replace the random instance id.
    pub fn with_instance_id(mut self, instance_id: Uuid) -> Self {
        self.instance_id = instance_id;
        self
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn overrides(&self) -> &CommandLineOverrides {
        &self.overrides
    }

    pub fn layout(&self) -> &AppLayout {
        &self.layout
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.filesystem.as_ref()
    }

    /// Distinguishes instances running on the same host at the same time.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Application name plus `--process-name-suffix`. Shows up in logs and
    /// as the process name.
    pub fn instance_name(&self) -> String {
        format!(
            "{}{}",
            self.layout.app_name,
            self.overrides.process_name_suffix()
        )
    }

    pub fn is_dry_run(&self) -> bool {
        self.overrides.is_dry_run()
    }

    /// Merged application config. Empty until [`Self::load_and_validate`].
    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub fn logging_state(&self) -> &LoggingState {
        &self.logging
    }

    /// `<tmp base>/<instance name>/<instance id>`, absolute.
    ///
    /// The base is `tmp_dir_path` from the app config when set, the
    /// layout's default temp dir otherwise.
    pub fn instance_tmp_dir_path(&self) -> PathBuf {
        let base = self
            .app_config
            .tmp_dir_path()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.layout.default_temp_dir.clone());
        let base = std::path::absolute(&base).unwrap_or(base);

        paths::normalize(
            &base
                .join(self.instance_name())
                .join(self.instance_id.simple().to_string()),
        )
    }

    // ── locations ─────────────────────────────────────────────────────────

    pub fn config_file_abspaths(&self) -> HearthResult<Vec<PathBuf>> {
        Ok(self
            .environment
            .config_file_abspaths(&self.layout, &self.overrides)?)
    }

    pub fn logging_config_abspaths(&self) -> HearthResult<Vec<PathBuf>> {
        Ok(self
            .environment
            .logging_config_abspaths(&self.layout, &self.overrides)?)
    }

    /// Where file logs go, resolving the logging config first if needed.
    pub fn filelog_abspath(&mut self) -> HearthResult<PathBuf> {
        let configured = self.resolve_logging()?.configured_log_file.clone();
        Ok(self
            .environment
            .filelog_abspath(&self.layout, &self.overrides, configured.as_deref())?)
    }

    // ── logging ───────────────────────────────────────────────────────────

    /// Merge and post-process the logging config, once.
    pub fn resolve_logging(&mut self) -> HearthResult<&ResolvedLogging> {
        if let LoggingState::Pending = self.logging {
            let resolved = self.compute_logging()?;
            self.logging = LoggingState::Resolved(resolved);
        }

        self.logging.resolved().ok_or_else(|| HearthError::Internal {
            message: "logging config still pending after resolution".into(),
        })
    }

    pub fn logging_config(&mut self) -> HearthResult<&LoggingConfig> {
        Ok(&self.resolve_logging()?.config)
    }

    fn compute_logging(&self) -> HearthResult<ResolvedLogging> {
        let mut merged = LoggingConfig::new();

        for path in self.logging_config_abspaths()? {
            let layer = self
                .filesystem
                .read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| LoggingConfig::parse_fragment(&text).map_err(|e| e.to_string()));

            match layer {
                Ok(layer) => merged.merge(layer),
                Err(reason) => debug!(path = %path.display(), %reason, "Skipping logging config layer"),
            }
        }

        if merged.is_empty() {
            debug!("No logging config layer loaded, using the bundled default");
            merged = LoggingConfig::parse_fragment(&self.layout.bundled_logging_config).map_err(
                |e| HearthError::BundledResourceCorrupt {
                    reason: e.to_string(),
                },
            )?;
        }

        let configured_log_file = merged.configured_log_file();
        let filelog_path = if merged.is_file_logging_enabled() {
            Some(self.environment.filelog_abspath(
                &self.layout,
                &self.overrides,
                configured_log_file.as_deref(),
            )?)
        } else {
            None
        };

        let config = merged.post_process(&PostProcessOptions {
            filelog_path: filelog_path.clone(),
            instance_name: self.instance_name(),
            force_single_line: self.environment.force_single_line_logs(),
            force_disable_syslog: self.environment.force_disable_syslog(),
        });

        Ok(ResolvedLogging {
            config,
            configured_log_file,
            filelog_path,
        })
    }

    // ── load ──────────────────────────────────────────────────────────────

    /// Load every config layer, validate the log file and apply logging.
    ///
    /// Log file and logging backend problems are collected and reported
    /// together as [`ImproperlyConfigured`]. A config layer with broken YAML
    /// aborts at once.
    #[instrument(
        skip_all,
        fields(environment = %self.environment, instance = %self.instance_name())
    )]
    pub fn load_and_validate(&mut self, backend: &dyn LoggingBackend) -> HearthResult<()> {
        self.app_config = AppConfig::new();

        for path in self.config_file_abspaths()? {
            match self.filesystem.read_to_string(&path) {
                Ok(text) => {
                    let layer =
                        AppConfig::parse_layer(&text).map_err(|e| HearthError::ConfigParse {
                            path: path.clone(),
                            reason: e.to_string(),
                        })?;
                    debug!(path = %path.display(), "Loaded config layer");
                    self.app_config.merge_layer(layer);
                }
                Err(e) => debug!(path = %path.display(), reason = %e, "Skipping config layer"),
            }
        }

        let resolved = self.resolve_logging()?.clone();
        let mut errors = ImproperlyConfigured::new();

        if let Some(log_file) = &resolved.filelog_path {
            if let Err(e) = self.probe_log_file(log_file) {
                errors.insert(
                    log_file.display().to_string(),
                    format!("Unable to open log file for writing! {}", cause(&e)),
                );
            }
        }

        if errors.is_empty() {
            if let Err(e) = backend.apply(&resolved.config) {
                match e {
                    HearthError::Application(ApplicationError::LoggingBackend {
                        handler,
                        reason,
                    }) => errors.insert(handler, reason),
                    other => errors.insert("logging", other.to_string()),
                }
            }
        }

        errors.into_result()?;

        let tmp_dir = self.instance_tmp_dir_path();
        if let Err(e) = self.filesystem.create_dir_all(&tmp_dir) {
            warn!(path = %tmp_dir.display(), error = %e, "Could not create instance temp dir");
        }

        debug!(
            "Initialized and resolved config for {}: {}",
            self.instance_name(),
            self.describe()
        );
        match &resolved.filelog_path {
            Some(path) => debug!("Logging to: {}", path.display()),
            None => debug!("Was not configured to log to file, check syslog instead..."),
        }

        Ok(())
    }

    fn probe_log_file(&self, path: &Path) -> HearthResult<()> {
        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.open_append(path)
    }

    /// Everything resolved so far, as JSON.
    pub fn describe(&self) -> Value {
        json!({
            "environment": self.environment,
            "instance_name": self.instance_name(),
            "instance_uuid": self.instance_id.to_string(),
            "config_files": self.config_file_abspaths().unwrap_or_default(),
            "app_config": serde_json::to_value(&self.app_config).unwrap_or(Value::Null),
            "logging_json": self.logging.resolved().map(|r| &r.config),
            "cmdline_args": &self.overrides,
            "tmp_dir": self.instance_tmp_dir_path(),
        })
    }
}

/// The adapter's own words, without our wrapping.
fn cause(error: &HearthError) -> String {
    match error {
        HearthError::Application(ApplicationError::FilesystemError { reason, .. }) => {
            reason.clone()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::application::ports::{MockFilesystem, MockLoggingBackend};

    const LOGGING_WITH_FILE: &str = r#"{
        "handlers": {"console": {"class": "stream"}, "file": {"class": "file"}},
        "formatters": {},
        "loggers": {"hearth": {"level": "DEBUG", "handlers": ["console", "file"]}}
    }"#;

    const LOGGING_CONSOLE_ONLY: &str = r#"{
        "handlers": {"console": {"class": "stream"}, "file": {"class": "file"}},
        "formatters": {},
        "loggers": {"hearth": {"handlers": ["console"]}}
    }"#;

    fn layout(bundled: &'static str) -> AppLayout {
        AppLayout {
            app_name: "hearth".into(),
            repo_root: PathBuf::from("/src/hearth"),
            running_from_source: false,
            resources_dir: PathBuf::from("/usr/share/hearth"),
            system_config_dir: PathBuf::from("/etc/hearth"),
            user_config_dir: PathBuf::from("/home/op/.config/hearth"),
            user_data_dir: PathBuf::from("/home/op/.local/share/hearth"),
            default_temp_dir: PathBuf::from("/tmp/hearth.tmp"),
            bundled_logging_config: Cow::Borrowed(bundled),
        }
    }

    fn not_found(path: &Path) -> HearthResult<String> {
        Err(ApplicationError::filesystem(path, "No such file or directory").into())
    }

    fn test_overrides() -> CommandLineOverrides {
        CommandLineOverrides::new()
            .with_config_file_path("/cfg/test.yaml")
            .with_logging_config_path("/cfg/logging_config.json")
            .with_log_file_path("/logs/test.log")
    }

    #[test]
    fn logging_config_is_computed_once() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .withf(|p| p == Path::new("/cfg/logging_config.json"))
            .times(1)
            .returning(|_| Ok(LOGGING_WITH_FILE.to_string()));

        let mut loader = ConfigLoader::new(
            Environment::Test,
            test_overrides(),
            layout("{}"),
            Box::new(fs),
        );

        let first = loader.resolve_logging().unwrap().clone();
        let second = loader.resolve_logging().unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(first.filelog_path, Some(PathBuf::from("/logs/test.log")));
        assert!(matches!(loader.logging_state(), LoggingState::Resolved(_)));
    }

    #[test]
    fn bundled_default_is_used_when_no_layer_loads() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(not_found);

        let mut loader = ConfigLoader::new(
            Environment::Production,
            CommandLineOverrides::new(),
            layout(LOGGING_CONSOLE_ONLY),
            Box::new(fs),
        );

        let resolved = loader.resolve_logging().unwrap();
        assert!(!resolved.is_file_logging_enabled());
        assert_eq!(resolved.config.handler_names(), vec!["console".to_string()]);
    }

    #[test]
    fn malformed_logging_layers_are_skipped() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|p| {
            if p == Path::new("/etc/hearth/logging_config.json") {
                Ok("{ not json".to_string())
            } else {
                Ok(LOGGING_CONSOLE_ONLY.to_string())
            }
        });

        let mut loader = ConfigLoader::new(
            Environment::Production,
            CommandLineOverrides::new(),
            layout("{ also broken"),
            Box::new(fs),
        );

        assert!(loader.resolve_logging().is_ok());
    }

    #[test]
    fn corrupt_bundled_default_is_fatal() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(not_found);

        let mut loader = ConfigLoader::new(
            Environment::Production,
            CommandLineOverrides::new(),
            layout("{ broken"),
            Box::new(fs),
        );

        assert!(matches!(
            loader.resolve_logging(),
            Err(HearthError::BundledResourceCorrupt { .. })
        ));
    }

    #[test]
    fn relative_override_is_rejected_on_access() {
        let fs = MockFilesystem::new();
        let loader = ConfigLoader::new(
            Environment::Development,
            CommandLineOverrides::new().with_config_file_path("config/dev.yaml"),
            layout("{}"),
            Box::new(fs),
        );

        let err = loader.config_file_abspaths().unwrap_err();
        assert!(err.is_improperly_configured());
    }

    #[test]
    fn production_layers_merge_in_order() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|p| {
            match p.to_str().unwrap_or_default() {
                "/etc/hearth/production.yaml" => Ok("a: 1\nb: 1\n".to_string()),
                "/home/op/.config/hearth/app.yml" => Ok("b: 2\nc: 1\n".to_string()),
                "/etc/hearth/logging_config.json" => Ok(LOGGING_CONSOLE_ONLY.to_string()),
                _ => not_found(p),
            }
        });
        fs.expect_create_dir_all().returning(|_| Ok(()));

        let mut backend = MockLoggingBackend::new();
        backend.expect_apply().times(1).returning(|_| Ok(()));

        let mut loader = ConfigLoader::new(
            Environment::Production,
            CommandLineOverrides::new(),
            layout("{}"),
            Box::new(fs),
        );
        loader.load_and_validate(&backend).unwrap();

        assert_eq!(
            loader.app_config(),
            &AppConfig::parse_layer("a: 1\nb: 2\nc: 1\n").unwrap()
        );
    }

    #[test]
    fn yaml_syntax_error_aborts_before_logging() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|_| Ok("key: [unterminated\n".to_string()));

        let mut backend = MockLoggingBackend::new();
        backend.expect_apply().never();

        let mut loader = ConfigLoader::new(
            Environment::Test,
            test_overrides(),
            layout("{}"),
            Box::new(fs),
        );

        let err = loader.load_and_validate(&backend).unwrap_err();
        assert!(
            matches!(err, HearthError::ConfigParse { ref path, .. } if path == Path::new("/cfg/test.yaml"))
        );
    }

    #[test]
    fn unwritable_log_file_is_reported_and_logging_not_applied() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|p| {
            if p == Path::new("/cfg/logging_config.json") {
                Ok(LOGGING_WITH_FILE.to_string())
            } else {
                Ok(String::new())
            }
        });
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_open_append()
            .returning(|p| Err(ApplicationError::filesystem(p, "Permission denied").into()));

        let mut backend = MockLoggingBackend::new();
        backend.expect_apply().never();

        let mut loader = ConfigLoader::new(
            Environment::Test,
            test_overrides(),
            layout("{}"),
            Box::new(fs),
        );

        match loader.load_and_validate(&backend) {
            Err(HearthError::ImproperlyConfigured(errors)) => {
                assert_eq!(
                    errors.errors().get("/logs/test.log").map(String::as_str),
                    Some("Unable to open log file for writing! Permission denied")
                );
            }
            other => panic!("expected ImproperlyConfigured, got {other:?}"),
        }
    }

    #[test]
    fn backend_failures_are_keyed_by_handler() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|p| {
            if p == Path::new("/cfg/logging_config.json") {
                Ok(LOGGING_CONSOLE_ONLY.to_string())
            } else {
                Ok(String::new())
            }
        });

        let mut backend = MockLoggingBackend::new();
        backend.expect_apply().returning(|_| {
            Err(ApplicationError::LoggingBackend {
                handler: "console".into(),
                reason: "unknown formatter 'fancy'".into(),
            }
            .into())
        });

        let mut loader = ConfigLoader::new(
            Environment::Test,
            test_overrides(),
            layout("{}"),
            Box::new(fs),
        );

        let err = loader.load_and_validate(&backend).unwrap_err();
        assert!(err.is_improperly_configured());
        assert!(err.to_string().contains("console: unknown formatter 'fancy'"));
    }

    #[test]
    fn instance_tmp_dir_combines_base_name_and_id() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string().returning(|p| {
            if p == Path::new("/cfg/test.yaml") {
                Ok("tmp_dir_path: /srv/scratch\n".to_string())
            } else {
                Ok(LOGGING_CONSOLE_ONLY.to_string())
            }
        });
        fs.expect_create_dir_all()
            .withf(|p| {
                p == Path::new("/srv/scratch/hearth-w1/00000000000000000000000000002a2a")
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut backend = MockLoggingBackend::new();
        backend.expect_apply().returning(|_| Ok(()));

        let mut loader = ConfigLoader::new(
            Environment::Test,
            test_overrides().with_process_name_suffix(" -w1 "),
            layout("{}"),
            Box::new(fs),
        )
        .with_instance_id(Uuid::from_u128(0x2a2a));

        assert_eq!(
            loader.instance_tmp_dir_path(),
            PathBuf::from("/tmp/hearth.tmp/hearth-w1/00000000000000000000000000002a2a")
        );

        loader.load_and_validate(&backend).unwrap();
        assert_eq!(loader.instance_name(), "hearth-w1");
    }

    #[test]
    fn describe_reports_resolved_state() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|_| Ok(LOGGING_CONSOLE_ONLY.to_string()));

        let mut loader = ConfigLoader::new(
            Environment::Test,
            test_overrides().with_dry_run(true),
            layout("{}"),
            Box::new(fs),
        );
        assert_eq!(loader.describe()["logging_json"], Value::Null);

        loader.resolve_logging().unwrap();
        let described = loader.describe();

        assert_eq!(described["environment"], json!("test"));
        assert_eq!(described["instance_name"], json!("hearth"));
        assert_eq!(described["config_files"], json!(["/cfg/test.yaml"]));
        assert_eq!(described["cmdline_args"]["dry_run"], json!(true));
        assert!(described["logging_json"]["handlers"]["console"].is_object());
    }
}
