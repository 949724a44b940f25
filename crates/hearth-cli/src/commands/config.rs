//! `hearth config`: inspect the resolved configuration.

use std::path::PathBuf;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    error::CliResult,
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, global: &GlobalArgs, output: &OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Show => {
            let settings = super::init_settings(global)?;
            output.print(&serde_json::to_string_pretty(&settings.describe())?)?;
        }

        ConfigCommands::Paths => {
            let mut loader = super::loader(global);

            output.header("Resolved locations")?;
            output.field("environment", loader.environment().name())?;
            output.field(
                "running from source",
                &loader.layout().running_from_source.to_string(),
            )?;

            output.field("config files", "")?;
            list(output, loader.config_file_abspaths()?)?;
            output.field("logging config files", "")?;
            list(output, loader.logging_config_abspaths()?)?;

            let log_file = loader.filelog_abspath()?;
            let file_logging = loader
                .logging_state()
                .resolved()
                .is_some_and(|logging| logging.is_file_logging_enabled());
            output.field("log file", &log_file.display().to_string())?;
            output.field(
                "file logging",
                if file_logging { "enabled" } else { "disabled" },
            )?;

            output.field(
                "instance tmp dir",
                &loader.instance_tmp_dir_path().display().to_string(),
            )?;
        }
    }

    Ok(())
}

fn list(output: &OutputManager, paths: Vec<PathBuf>) -> CliResult<()> {
    for path in paths {
        output.item(&path.display().to_string())?;
    }
    Ok(())
}
