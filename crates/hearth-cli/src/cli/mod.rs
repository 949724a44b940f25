//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

const LONG_ABOUT: &str = "\
hearth service.

The application loads configuration the standard Linux way: system-wide
configuration first (if there is any), then per-user configuration from
$XDG_CONFIG_HOME, replacing values from the system-wide one.

Config files are either the default ones or given on the command line:

    1. application config file paths
        - value of --config-file-path if one is provided
        - otherwise the following locations are loaded, in this order
            - /etc/hearth/production.yaml
            - /etc/hearth/production.yml
            - /etc/hearth/app.yaml
            - /etc/hearth/app.yml
            - $XDG_CONFIG_HOME/hearth/production.yaml
            - $XDG_CONFIG_HOME/hearth/production.yml
            - $XDG_CONFIG_HOME/hearth/app.yaml
            - $XDG_CONFIG_HOME/hearth/app.yml
    2. logging config JSON file path
        - value of --logging-config-path if provided
        - otherwise the following locations are loaded
            - /etc/hearth/logging_config.json
            - $XDG_CONFIG_HOME/hearth/logging_config.json

When no logging config can be loaded, the bundled default logging config is
used.

Depending on the logging config, the application logs to a stream, a file or
syslog (or any combination of these). The log file path is taken from:

    - value of --log-file-path if provided
    - or the value from the logging config JSON if provided
    - or the default $XDG_DATA_HOME/hearth/production.log

Relative paths are resolved into absolute ones like this:

    - running from the source repo: relative to the repo root
    - running an installed binary: relative to $XDG_CONFIG_HOME and
      $XDG_DATA_HOME

The development and test environments only accept absolute paths.";

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "hearth",
    bin_name = "hearth",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "hearth service",
    long_about = LONG_ABOUT,
    after_help = "EXAMPLES:\n\
        \x20 hearth runserver\n\
        \x20 hearth -e production --process-name-suffix -1 runserver\n\
        \x20 hearth -e test -c $(pwd)/config/test.yaml config show\n\
        \x20 hearth completions bash > /usr/share/bash-completion/completions/hearth",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the application server.
    #[command(
        about = "Starts application server",
        after_help = "EXAMPLES:\n\
            \x20 hearth runserver\n\
            \x20 hearth --dry-run runserver   # start up and shut down at once"
    )]
    Runserver,

    /// Inspect the resolved configuration.
    #[command(
        about = "Inspect resolved configuration",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 hearth config show\n\
            \x20 hearth -e production config paths"
    )]
    Config(ConfigCommands),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 hearth completions bash > ~/.local/share/bash-completion/completions/hearth\n\
            \x20 hearth completions zsh  > ~/.zfunc/_hearth\n\
            \x20 hearth completions fish > ~/.config/fish/completions/hearth.fish"
    )]
    Completions(CompletionsArgs),
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `hearth config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Load and validate configuration, then print it as JSON.
    Show,
    /// Print the locations the environment resolves, without loading them.
    Paths,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `hearth completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────
