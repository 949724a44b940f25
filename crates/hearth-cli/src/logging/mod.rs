//! Tracing subscriber built from the resolved logging config.
//!
//! Only the CLI crate installs a subscriber; `hearth-core` only *emits*
//! spans and events and hands the post-processed config to
//! [`TracingBackend::apply`] through the `LoggingBackend` port.
//!
//! Every referenced handler becomes one `fmt` layer with its own filter:
//!
//! | Handler class | Sink                                   |
//! |---------------|----------------------------------------|
//! | stream        | stderr (or stdout with `ext://stdout`) |
//! | file          | non-blocking appender on `filename`    |
//! | syslog        | unix datagram socket at `address`      |
//!
//! `RUST_LOG` replaces the per-logger levels of every layer if set.

pub mod format;
#[cfg(unix)]
pub mod syslog;

use std::io::IsTerminal as _;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use hearth_core::APPLICATION_NAME;
use hearth_core::application::{ApplicationError, ports::LoggingBackend};
use hearth_core::domain::{HandlerClass, HandlerSpec, LoggingConfig, LoggingSpec, StreamTarget};
use hearth_core::error::HearthResult;

use self::format::TemplateFormatter;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Installs the global tracing subscriber.
///
/// Owns the file writer guards: pending lines are flushed when the backend
/// is dropped, so it must outlive the server.
#[derive(Debug, Default)]
pub struct TracingBackend {
    no_color: bool,
    guards: Mutex<Vec<WorkerGuard>>,
}

enum LayerFilter {
    Targets(Targets),
    Env(String),
}

impl TracingBackend {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            guards: Mutex::new(Vec::new()),
        }
    }

    /// Build every layer without installing anything.
    fn layers(&self, spec: &LoggingSpec) -> Result<Vec<BoxedLayer>, ApplicationError> {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let mut layers = Vec::new();
        for name in referenced(spec) {
            let handler = spec.handlers.get(name).ok_or_else(|| backend_error(
                name,
                "handler is referenced by a logger but not defined",
            ))?;

            let filter = match &env_directives {
                Some(directives) => LayerFilter::Env(directives.clone()),
                None => LayerFilter::Targets(targets_for(spec, name, handler)),
            };

            let layer = self
                .layer(spec, name, handler, filter)
                .map_err(|e| backend_error(name, format!("{e:#}")))?;
            layers.push(layer);
        }
        Ok(layers)
    }

    fn layer(
        &self,
        spec: &LoggingSpec,
        name: &str,
        handler: &HandlerSpec,
        filter: LayerFilter,
    ) -> anyhow::Result<BoxedLayer> {
        let formatter_spec = match handler.formatter.as_deref() {
            Some(formatter) => Some(
                spec.formatters
                    .get(formatter)
                    .ok_or_else(|| anyhow!("Unknown formatter '{formatter}'"))?,
            ),
            None => None,
        };

        match handler.effective_class(name) {
            HandlerClass::Stream => {
                let target = handler.stream_target();
                let terminal = match target {
                    StreamTarget::Stdout => std::io::stdout().is_terminal(),
                    StreamTarget::Stderr => std::io::stderr().is_terminal(),
                };
                let formatter = TemplateFormatter::from_spec(
                    formatter_spec,
                    APPLICATION_NAME,
                    terminal && !self.no_color,
                );
                Ok(match target {
                    StreamTarget::Stdout => finish(fmt_layer(formatter, std::io::stdout), filter),
                    StreamTarget::Stderr => finish(fmt_layer(formatter, std::io::stderr), filter),
                })
            }

            HandlerClass::File => {
                let filename = handler
                    .filename
                    .as_deref()
                    .context("File handler has no filename")?;
                let path = Path::new(filename);
                let (dir, file) = match (path.parent(), path.file_name()) {
                    (Some(dir), Some(file)) => (dir, file.to_string_lossy().into_owned()),
                    _ => return Err(anyhow!("Invalid log file path '{filename}'")),
                };

                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::NEVER)
                    .filename_prefix(file)
                    .build(dir)
                    .with_context(|| format!("Unable to open log file {filename}"))?;
                let (writer, guard) = tracing_appender::non_blocking(appender);
                self.guards
                    .lock()
                    .map_err(|_| anyhow!("log writer guard lock poisoned"))?
                    .push(guard);

                let formatter = TemplateFormatter::from_spec(formatter_spec, APPLICATION_NAME, false);
                Ok(finish(fmt_layer(formatter, writer), filter))
            }

            HandlerClass::Syslog => self.syslog_layer(handler, formatter_spec, filter),
        }
    }

    #[cfg(unix)]
    fn syslog_layer(
        &self,
        handler: &HandlerSpec,
        formatter_spec: Option<&hearth_core::domain::FormatterSpec>,
        filter: LayerFilter,
    ) -> anyhow::Result<BoxedLayer> {
        let facility_name = handler.facility.as_deref().unwrap_or("user");
        let facility = syslog::facility_code(facility_name)
            .with_context(|| format!("Unknown syslog facility '{facility_name}'"))?;
        let address = handler.address.as_deref().unwrap_or(syslog::DEFAULT_ADDRESS);
        let ident = handler.ident.as_deref().unwrap_or(APPLICATION_NAME);

        let writer = syslog::SyslogWriter::connect(address, facility, ident)
            .with_context(|| format!("Unable to connect to syslog at {address}"))?;

        let formatter = TemplateFormatter::from_spec(formatter_spec, ident, false);
        Ok(finish(fmt_layer(formatter, writer), filter))
    }

    #[cfg(not(unix))]
    fn syslog_layer(
        &self,
        _handler: &HandlerSpec,
        _formatter_spec: Option<&hearth_core::domain::FormatterSpec>,
        _filter: LayerFilter,
    ) -> anyhow::Result<BoxedLayer> {
        Err(anyhow!("syslog is only supported on unix"))
    }
}

impl LoggingBackend for TracingBackend {
    fn apply(&self, config: &LoggingConfig) -> HearthResult<()> {
        let spec = config
            .spec()
            .map_err(|e| backend_error("logging", e))?;
        let layers = self.layers(&spec)?;

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| backend_error("logging", e))?;
        Ok(())
    }
}

/// Handler names referenced by at least one logger, in first-use order.
fn referenced(spec: &LoggingSpec) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let loggers = spec.loggers.values().chain(spec.root.iter());
    for handler in loggers.flat_map(|logger| logger.handlers.iter()) {
        if !names.contains(&handler.as_str()) {
            names.push(handler);
        }
    }
    names
}

/// Per-target levels for one handler.
///
/// A logger without a level inherits root's, and the handler's own level
/// caps whatever the logger lets through.
fn targets_for(spec: &LoggingSpec, name: &str, handler: &HandlerSpec) -> Targets {
    let root_level = spec.root.as_ref().and_then(|root| root.level_filter());
    let handler_level = handler.level_filter().unwrap_or(LevelFilter::TRACE);

    spec.loggers_using(name)
        .fold(Targets::new(), |targets, (target, logger)| {
            let logger_level = logger
                .level_filter()
                .or(root_level)
                .unwrap_or(LevelFilter::WARN);
            let level = logger_level.min(handler_level);
            if target.is_empty() {
                targets.with_default(level)
            } else {
                targets.with_target(target, level)
            }
        })
}

fn fmt_layer<W>(
    formatter: TemplateFormatter,
    writer: W,
) -> tracing_subscriber::fmt::Layer<Registry, tracing_subscriber::fmt::format::DefaultFields, TemplateFormatter, W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(formatter)
        .with_writer(writer)
}

fn finish<L>(layer: L, filter: LayerFilter) -> BoxedLayer
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    match filter {
        LayerFilter::Targets(targets) => layer.with_filter(targets).boxed(),
        LayerFilter::Env(directives) => layer.with_filter(EnvFilter::new(directives)).boxed(),
    }
}

fn backend_error(handler: &str, reason: impl ToString) -> ApplicationError {
    ApplicationError::LoggingBackend {
        handler: handler.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> LoggingSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn logger_level_is_capped_by_handler_level() {
        let spec = spec(json!({
            "handlers": {"console": {"level": "INFO"}},
            "loggers": {"hearth": {"level": "DEBUG", "handlers": ["console"]}},
            "root": {"level": "ERROR", "handlers": ["console"]}
        }));
        let handler = &spec.handlers["console"];
        let targets = targets_for(&spec, "console", handler);

        assert!(targets.would_enable("hearth::server", &tracing::Level::INFO));
        assert!(!targets.would_enable("hearth::server", &tracing::Level::DEBUG));
        assert!(targets.would_enable("tokio", &tracing::Level::ERROR));
        assert!(!targets.would_enable("tokio", &tracing::Level::WARN));
    }

    #[test]
    fn logger_without_level_inherits_root() {
        let spec = spec(json!({
            "handlers": {"console": {}},
            "loggers": {"hearth": {"handlers": ["console"]}},
            "root": {"level": "INFO", "handlers": []}
        }));
        let targets = targets_for(&spec, "console", &spec.handlers["console"]);

        assert!(targets.would_enable("hearth", &tracing::Level::INFO));
        assert!(!targets.would_enable("hearth", &tracing::Level::DEBUG));
        // root does not use this handler
        assert!(!targets.would_enable("other", &tracing::Level::ERROR));
    }

    #[test]
    fn referenced_handlers_are_unique() {
        let spec = spec(json!({
            "loggers": {
                "a": {"handlers": ["console", "file"]},
                "b": {"handlers": ["file"]}
            },
            "root": {"handlers": ["console"]}
        }));
        assert_eq!(referenced(&spec), ["console", "file"]);
    }

    #[test]
    fn undefined_handler_is_reported_by_name() {
        let spec = spec(json!({
            "handlers": {},
            "loggers": {"hearth": {"handlers": ["ghost"]}}
        }));

        let err = TracingBackend::new(true).layers(&spec).err().unwrap();
        assert!(matches!(
            err,
            ApplicationError::LoggingBackend { ref handler, .. } if handler == "ghost"
        ));
    }

    #[test]
    fn unknown_formatter_is_reported_by_handler() {
        let spec = spec(json!({
            "handlers": {"console": {"formatter": "fancy"}},
            "loggers": {"hearth": {"handlers": ["console"]}}
        }));

        match TracingBackend::new(true).layers(&spec) {
            Err(ApplicationError::LoggingBackend { handler, reason }) => {
                assert_eq!(handler, "console");
                assert!(reason.contains("fancy"));
            }
            other => panic!("expected a backend error, got {:?}", other.map(|l| l.len())),
        }
    }

    #[cfg(unix)]
    #[test]
    fn missing_syslog_socket_names_the_handler() {
        let dir = tempfile::tempdir().unwrap();
        let address = dir.path().join("absent.sock");
        let spec = spec(json!({
            "handlers": {"syslog": {"address": address.display().to_string()}},
            "loggers": {"hearth": {"handlers": ["syslog"]}}
        }));

        match TracingBackend::new(true).layers(&spec) {
            Err(ApplicationError::LoggingBackend { handler, .. }) => assert_eq!(handler, "syslog"),
            other => panic!("expected a backend error, got {:?}", other.map(|l| l.len())),
        }
    }

    #[test]
    fn file_handler_keeps_a_writer_guard() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("test.log");
        let spec = spec(json!({
            "handlers": {"file": {"filename": log.display().to_string()}},
            "loggers": {"hearth": {"handlers": ["file"]}}
        }));

        let backend = TracingBackend::new(true);
        let layers = backend.layers(&spec).unwrap();

        assert_eq!(layers.len(), 1);
        assert_eq!(backend.guards.lock().unwrap().len(), 1);
    }
}
