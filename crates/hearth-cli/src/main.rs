//! # Hearth CLI
//!
//! Service application shell with layered external configuration.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Build the [`OutputManager`].
//! 3. Dispatch to the command handler. Commands that need configuration
//!    resolve, load and validate it, which also installs logging.
//! 4. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                 |
//! |------|-------------------------|
//! |  0   | Success                 |
//! |  1   | Internal / system error |
//! |  2   | User / input error      |
//! |  3   | Resource not found      |
//! |  4   | Configuration error     |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::instrument;

use crate::{
    cli::{Cli, Commands},
    error::{CliError, CliResult},
    output::OutputManager,
};

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod process;
mod server;

fn main() -> ExitCode {
    // Load .env before anything reads the environment. Silently ignored if
    // .env doesn't exist.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too, with exit code 0.
            let _ = e.print();
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let output = OutputManager::new(&cli.global);
    let no_color = cli.global.no_color;

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => handle_error(e, no_color),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, output: &OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Runserver => commands::runserver::execute(&cli.global),
        Commands::Config(cmd) => commands::config::execute(cmd, &cli.global, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
    }
}

/// Translate a `CliError` into a user message and an exit code.
fn handle_error(err: CliError, no_color: bool) -> ExitCode {
    err.log();

    // Written straight to stderr: logging may not be set up yet.
    let msg = if !no_color && std::io::stderr().is_terminal() {
        err.format_colored()
    } else {
        err.format_plain()
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}
