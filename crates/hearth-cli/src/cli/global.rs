//! Global arguments that apply to every subcommand.
//!
//! Declared here and flattened into [`super::Cli`]. They map one to one onto
//! [`CommandLineOverrides`] plus the environment selector.

use clap::{Args, ValueEnum};
use hearth_core::domain::{CommandLineOverrides, Environment};

/// Global arguments for all commands.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config environment used by the application server.
    #[arg(
        short = 'e',
        long = "environment",
        value_enum,
        default_value = "development",
        env = "HEARTH_ENVIRONMENT",
        help = "Config environment that will be used by application server"
    )]
    pub environment: EnvironmentArg,

    #[arg(
        short = 'c',
        long = "config-file-path",
        value_name = "FILE",
        help = "Optional path to application config file"
    )]
    pub config_file_path: Option<String>,

    #[arg(
        short = 'l',
        long = "log-file-path",
        value_name = "FILE",
        help = "Optional path to application log file"
    )]
    pub log_file_path: Option<String>,

    #[arg(
        long = "logging-config-path",
        value_name = "FILE",
        help = "Optional path to application logging config file"
    )]
    pub logging_config_path: Option<String>,

    #[arg(
        long = "process-name-suffix",
        value_name = "SUFFIX",
        allow_hyphen_values = true,
        help = "Optional suffix that will be appended to running app's process name"
    )]
    pub process_name_suffix: Option<String>,

    /// Process everything but don't commit results.
    #[arg(
        long = "dry-run",
        overrides_with = "no_dry_run",
        help = "Process everything but don't commit results"
    )]
    pub dry_run: bool,

    #[arg(long = "no-dry-run", overrides_with = "dry_run", hide = true)]
    pub no_dry_run: bool,

    /// Disable ANSI colour codes.
    ///
    /// Automatically honoured when `NO_COLOR` is set to any non-empty value
    /// other than a false-like one (see <https://no-color.org>).
    #[arg(
        long = "no-color",
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new(),
        help = "Disable colored output"
    )]
    pub no_color: bool,
}

impl GlobalArgs {
    /// The read-only override record handed to the config loader.
    pub fn overrides(&self) -> CommandLineOverrides {
        CommandLineOverrides {
            config_file_path: self.config_file_path.clone(),
            log_file_path: self.log_file_path.clone(),
            logging_config_path: self.logging_config_path.clone(),
            process_name_suffix: self.process_name_suffix.clone(),
            dry_run: Some(self.dry_run && !self.no_dry_run),
        }
    }
}

/// Runtime environment as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvironmentArg {
    Development,
    Test,
    Production,
}

impl From<EnvironmentArg> for Environment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Development => Environment::Development,
            EnvironmentArg::Test => Environment::Test,
            EnvironmentArg::Production => Environment::Production,
        }
    }
}
