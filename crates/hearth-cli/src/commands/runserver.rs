//! `hearth runserver`: run the application server until signalled.

use crate::{cli::GlobalArgs, error::CliResult, server::Server};

pub fn execute(global: &GlobalArgs) -> CliResult<()> {
    let settings = super::init_settings(global)?;
    Server::new(settings).run()
}
