//! Command handlers.
//!
//! Each submodule exposes an `execute` function taking the parsed arguments
//! and the [`OutputManager`](crate::output::OutputManager).

pub mod completions;
pub mod config;
pub mod runserver;

use hearth_adapters::{LocalFilesystem, detect_layout};
use hearth_core::{
    APPLICATION_NAME,
    application::{ConfigLoader, Settings},
};

use crate::{cli::GlobalArgs, error::CliResult, logging::TracingBackend};

/// Loader for this machine, not yet loaded.
pub fn loader(global: &GlobalArgs) -> ConfigLoader {
    ConfigLoader::new(
        global.environment.into(),
        global.overrides(),
        detect_layout(APPLICATION_NAME),
        Box::new(LocalFilesystem::new()),
    )
}

/// Load and validate configuration and install the tracing subscriber.
pub fn init_settings(global: &GlobalArgs) -> CliResult<Settings> {
    let backend = TracingBackend::new(global.no_color);
    Ok(Settings::from_loader(loader(global), Box::new(backend))?)
}
