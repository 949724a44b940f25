//! Logging configuration documents.
//!
//! [`LoggingConfig`] is the raw JSON object as merged from every logging
//! config layer. It is kept untyped so unknown keys survive the round trip
//! into diagnostics. [`LoggingSpec`] is the typed view a logging backend
//! consumes once post-processing is done.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::level_filters::LevelFilter;

use crate::domain::paths::non_blank;

const HANDLERS: &str = "handlers";
const FORMATTERS: &str = "formatters";
const LOGGERS: &str = "loggers";
const ROOT: &str = "root";

const FILE_MARKER: &str = "file";
const SYSLOG_MARKER: &str = "syslog";
const SINGLE_LINE_MARKER: &str = "SingleLine";
const COLOR_MARKER: &str = "Color";
const CONSTRUCTOR_KEY: &str = "()";
const COLOR_FORMATTER: &str = "ColorFormatter";
const SERVICE_NAME_PLACEHOLDER: &str = "{service_name}";

/// Knobs for [`LoggingConfig::post_process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessOptions {
    /// Resolved log file. `Some` exactly when file logging is enabled.
    pub filelog_path: Option<PathBuf>,
    pub instance_name: String,
    pub force_single_line: bool,
    pub force_disable_syslog: bool,
}

/// A logging config document: `handlers`, `formatters`, `loggers` and an
/// optional `root`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoggingConfig(Map<String, Value>);

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one layer. Anything but a JSON object at the top level fails.
    pub fn parse_fragment(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Map<String, Value>>(text).map(Self)
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge: top-level keys of `layer` replace ours wholesale.
    pub fn merge(&mut self, layer: LoggingConfig) {
        for (key, value) in layer.0 {
            self.0.insert(key, value);
        }
    }

    /// Names of every handler definition.
    pub fn handler_names(&self) -> Vec<String> {
        self.section(HANDLERS)
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Handler names referenced by any logger or by root.
    pub fn referenced_handlers(&self) -> BTreeSet<String> {
        let loggers = self
            .section(LOGGERS)
            .into_iter()
            .flat_map(|loggers| loggers.values());
        let root = self.0.get(ROOT).into_iter();

        loggers
            .chain(root)
            .filter_map(|logger| logger.get(HANDLERS).and_then(Value::as_array))
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }

    /// A handler whose name contains `file` is both defined and referenced.
    pub fn is_file_logging_enabled(&self) -> bool {
        let referenced = self.referenced_handlers();
        self.handler_names()
            .iter()
            .any(|name| name.contains(FILE_MARKER) && referenced.contains(name))
    }

    /// First non-blank `filename` on a handler whose name contains `file`.
    pub fn configured_log_file(&self) -> Option<String> {
        self.section(HANDLERS)?
            .iter()
            .filter(|(name, _)| name.contains(FILE_MARKER))
            .find_map(|(_, handler)| {
                non_blank(handler.get("filename").and_then(Value::as_str)).map(str::to_string)
            })
    }

    /// Apply the environment's policy to a merged document.
    pub fn post_process(mut self, options: &PostProcessOptions) -> Self {
        if let Some(handlers) = self.section_mut(HANDLERS) {
            match &options.filelog_path {
                Some(path) => {
                    let filename = Value::String(path.display().to_string());
                    for (name, handler) in handlers.iter_mut() {
                        if name.contains(FILE_MARKER) {
                            if let Some(handler) = handler.as_object_mut() {
                                handler.insert("filename".into(), filename.clone());
                            }
                        }
                    }
                }
                None => {
                    let doomed: Vec<String> = handlers
                        .keys()
                        .filter(|name| name.contains(FILE_MARKER))
                        .cloned()
                        .collect();
                    for name in doomed {
                        handlers.remove(&name);
                    }
                }
            }

            for (name, handler) in handlers.iter_mut() {
                if name.contains(SYSLOG_MARKER) {
                    if let Some(handler) = handler.as_object_mut() {
                        handler.insert("ident".into(), options.instance_name.clone().into());
                    }
                }
            }
        }

        if let Some(formatters) = self.section_mut(FORMATTERS) {
            for formatter in formatters.values_mut().filter_map(Value::as_object_mut) {
                rewrite_formatter(formatter, options);
            }
        }

        if options.force_disable_syslog {
            if let Some(loggers) = self.section_mut(LOGGERS) {
                for logger in loggers.values_mut() {
                    strip_syslog_refs(logger);
                }
            }
            if let Some(root) = self.0.get_mut(ROOT) {
                strip_syslog_refs(root);
            }
        }

        self
    }

    /// Typed view for a logging backend.
    pub fn spec(&self) -> Result<LoggingSpec, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    fn section_mut(&mut self, key: &str) -> Option<&mut Map<String, Value>> {
        self.0.get_mut(key).and_then(Value::as_object_mut)
    }
}

fn rewrite_formatter(formatter: &mut Map<String, Value>, options: &PostProcessOptions) {
    if let Some(Value::String(format)) = formatter.get_mut("format") {
        *format = format.replace(SERVICE_NAME_PLACEHOLDER, &options.instance_name);
    }

    if options.force_single_line {
        return;
    }

    let constructor = formatter
        .get(CONSTRUCTOR_KEY)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if constructor.contains(SINGLE_LINE_MARKER) {
        if constructor.contains(COLOR_MARKER) {
            formatter.insert(CONSTRUCTOR_KEY.into(), COLOR_FORMATTER.into());
        } else {
            formatter.remove(CONSTRUCTOR_KEY);
        }
    }
}

fn strip_syslog_refs(logger: &mut Value) {
    if let Some(handlers) = logger.get_mut(HANDLERS).and_then(Value::as_array_mut) {
        handlers.retain(|h| !h.as_str().is_some_and(|name| name.contains(SYSLOG_MARKER)));
    }
}

// ── Typed view ─────────────────────────────────────────────────────────────

/// Post-processed logging config, typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSpec {
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerSpec>,
    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterSpec>,
    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerSpec>,
    #[serde(default)]
    pub root: Option<LoggerSpec>,
}

impl LoggingSpec {
    /// Loggers (root under the empty target) referencing `handler`.
    pub fn loggers_using<'a>(
        &'a self,
        handler: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a LoggerSpec)> + 'a {
        self.loggers
            .iter()
            .map(|(target, logger)| (target.as_str(), logger))
            .chain(self.root.iter().map(|root| ("", root)))
            .filter(move |(_, logger)| logger.handlers.iter().any(|h| h == handler))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerClass {
    Stream,
    File,
    Syslog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTarget {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HandlerSpec {
    pub class: Option<String>,
    pub level: Option<String>,
    pub formatter: Option<String>,
    pub stream: Option<String>,
    pub filename: Option<String>,
    pub address: Option<String>,
    pub facility: Option<String>,
    pub ident: Option<String>,
}

impl HandlerSpec {
    /// `class` if it says, otherwise guessed from the handler's name.
    pub fn effective_class(&self, name: &str) -> HandlerClass {
        let hint = self.class.as_deref().unwrap_or(name).to_ascii_lowercase();
        if hint.contains(SYSLOG_MARKER) {
            HandlerClass::Syslog
        } else if hint.contains(FILE_MARKER) {
            HandlerClass::File
        } else {
            HandlerClass::Stream
        }
    }

    /// Stream handlers write to stderr unless told otherwise.
    pub fn stream_target(&self) -> StreamTarget {
        match self.stream.as_deref() {
            Some(s) if s.to_ascii_lowercase().contains("stdout") => StreamTarget::Stdout,
            _ => StreamTarget::Stderr,
        }
    }

    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.level.as_deref().and_then(parse_level)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormatterSpec {
    pub format: Option<String>,
    #[serde(rename = "()")]
    pub constructor: Option<String>,
}

impl FormatterSpec {
    pub fn is_single_line(&self) -> bool {
        self.constructor
            .as_deref()
            .is_some_and(|c| c.contains(SINGLE_LINE_MARKER))
    }

    pub fn is_color(&self) -> bool {
        self.constructor
            .as_deref()
            .is_some_and(|c| c.contains(COLOR_MARKER))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggerSpec {
    pub level: Option<String>,
    #[serde(default)]
    pub handlers: Vec<String>,
}

impl LoggerSpec {
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.level.as_deref().and_then(parse_level)
    }
}

/// Level names, including the `WARNING`/`CRITICAL`/`NOTSET` spellings common
/// in logging configs.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" | "NOTSET" => Some(LevelFilter::TRACE),
        "DEBUG" => Some(LevelFilter::DEBUG),
        "INFO" => Some(LevelFilter::INFO),
        "WARN" | "WARNING" => Some(LevelFilter::WARN),
        "ERROR" | "CRITICAL" | "FATAL" => Some(LevelFilter::ERROR),
        "OFF" => Some(LevelFilter::OFF),
        _ => None,
    }
}
