//! Template based event formatter.
//!
//! Renders `format` strings from the logging config. Recognised placeholders
//! are `{timestamp}`, `{level}`, `{target}`, `{message}`, `{fields}`, `{pid}`
//! and `{service_name}` (normally already substituted by the config loader).
//! Anything else in braces is written out verbatim.

use std::fmt::{self, Write as _};

use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use hearth_core::domain::FormatterSpec;

pub const DEFAULT_FORMAT: &str = "{timestamp} {level} {target}: {message}{fields}";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// `FormatEvent` driven by a formatter entry of the logging config.
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
    template: String,
    service_name: String,
    color: bool,
    single_line: bool,
}

impl TemplateFormatter {
    pub fn new(template: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            service_name: service_name.into(),
            color: false,
            single_line: false,
        }
    }

    /// Build from a config entry. `color` is whether the sink can show it.
    pub fn from_spec(spec: Option<&FormatterSpec>, service_name: &str, color: bool) -> Self {
        let template = spec
            .and_then(|s| s.format.clone())
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

        Self::new(template, service_name)
            .with_color(color && spec.is_some_and(FormatterSpec::is_color))
            .with_single_line(spec.is_some_and(FormatterSpec::is_single_line))
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }

    /// Render one event from its parts.
    pub fn render(&self, level: &Level, target: &str, message: &str, fields: &str) -> String {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let level = self.level(level);
        let pid = std::process::id().to_string();

        let mut out = String::with_capacity(self.template.len() + message.len());
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open..];
            let Some(close) = after.find('}') else {
                out.push_str(after);
                rest = "";
                break;
            };
            let value = match &after[1..close] {
                "timestamp" => Some(timestamp.as_str()),
                "level" => Some(level.as_str()),
                "target" => Some(target),
                "message" => Some(message),
                "fields" => Some(fields),
                "pid" => Some(pid.as_str()),
                "service_name" => Some(self.service_name.as_str()),
                _ => None,
            };
            match value {
                Some(value) => out.push_str(value),
                None => out.push_str(&after[..=close]),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);

        if self.single_line {
            escape_newlines(&out)
        } else {
            out
        }
    }

    fn level(&self, level: &Level) -> String {
        let name = format!("{:<5}", level.as_str());
        if !self.color {
            return name;
        }
        match *level {
            Level::ERROR => name.red().bold().to_string(),
            Level::WARN => name.yellow().bold().to_string(),
            Level::INFO => name.green().to_string(),
            Level::DEBUG => name.blue().to_string(),
            Level::TRACE => name.purple().to_string(),
        }
    }
}

fn escape_newlines(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

impl<S, N> FormatEvent<S, N> for TemplateFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let line = self.render(meta.level(), meta.target(), &visitor.message, &visitor.fields);
        writeln!(writer, "{line}")
    }
}

/// Splits an event into its `message` and the remaining ` key=value` pairs.
#[derive(Debug, Default)]
pub struct MessageVisitor {
    pub message: String,
    pub fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        let formatter = TemplateFormatter::new("{service_name}[{pid}] {level} {target}: {message}{fields}", "hearth");
        let line = formatter.render(&Level::INFO, "hearth::server", "up", " port=1");

        assert_eq!(
            line,
            format!("hearth[{}] INFO  hearth::server: up port=1", std::process::id())
        );
    }

    #[test]
    fn unknown_placeholders_and_stray_braces_survive() {
        let formatter = TemplateFormatter::new("{nope} {message} {", "hearth");
        assert_eq!(formatter.render(&Level::WARN, "t", "m", ""), "{nope} m {");
    }

    #[test]
    fn message_text_is_not_reinterpreted() {
        let formatter = TemplateFormatter::new("{message}", "hearth");
        assert_eq!(formatter.render(&Level::INFO, "t", "{level}", ""), "{level}");
    }

    #[test]
    fn single_line_escapes_newlines() {
        let formatter = TemplateFormatter::new("{message}", "hearth").with_single_line(true);
        assert_eq!(
            formatter.render(&Level::ERROR, "t", "line one\nline two", ""),
            "line one\\nline two"
        );
    }

    #[test]
    fn color_only_when_formatter_and_sink_allow() {
        let spec = FormatterSpec {
            format: Some("{level}".into()),
            constructor: Some("ColorFormatter".into()),
        };

        let colored = TemplateFormatter::from_spec(Some(&spec), "hearth", true);
        assert!(colored.render(&Level::ERROR, "t", "", "").contains('\u{1b}'));

        let plain = TemplateFormatter::from_spec(Some(&spec), "hearth", false);
        assert_eq!(plain.render(&Level::ERROR, "t", "", ""), "ERROR");
    }

    #[test]
    fn missing_formatter_uses_default_template() {
        let formatter = TemplateFormatter::from_spec(None, "hearth", true);
        let line = formatter.render(&Level::DEBUG, "hearth", "hello", "");
        assert!(line.ends_with("DEBUG hearth: hello"));
    }
}
