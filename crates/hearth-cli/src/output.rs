//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;

use crate::cli::GlobalArgs;

/// Writes command results to stdout. Logs never go through here.
pub struct OutputManager {
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags.
    pub fn new(args: &GlobalArgs) -> Self {
        Self {
            no_color: args.no_color || !io::stdout().is_terminal(),
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    pub fn print(&self, msg: &str) -> io::Result<()> {
        self.term.write_line(msg)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// `label: value`, label highlighted.
    pub fn field(&self, label: &str, value: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("  {label}: {value}")
        } else {
            format!("  {}: {value}", label.green())
        };
        self.term.write_line(&line)
    }

    /// Indented list entry.
    pub fn item(&self, value: &str) -> io::Result<()> {
        self.term.write_line(&format!("    - {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn make_manager(args: &[&str]) -> OutputManager {
        let cli = Cli::parse_from(args);
        OutputManager::new(&cli.global)
    }

    #[test]
    fn no_color_flag_disables_color() {
        let out = make_manager(&["hearth", "--no-color", "config", "show"]);
        assert!(out.no_color);
    }

    #[test]
    fn writes_do_not_fail_without_a_tty() {
        let out = make_manager(&["hearth", "--no-color", "config", "paths"]);
        assert!(out.header("Locations").is_ok());
        assert!(out.field("environment", "test").is_ok());
        assert!(out.item("/etc/hearth/app.yaml").is_ok());
    }
}
