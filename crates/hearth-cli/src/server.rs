//! Application server shell.
//!
//! Owns the [`Settings`] for the lifetime of the process, installs signal
//! handlers and parks the main thread until one of SIGINT, SIGTERM, SIGHUP or
//! SIGQUIT arrives. Everything a real service does goes into
//! [`Server::before_startup`] and [`Server::before_shutdown`].

use std::io;

use tracing::{debug, info};

use hearth_core::{VERSION, application::Settings};

use crate::{error::CliResult, process};

pub struct Server {
    settings: Settings,
}

impl Server {
    /// Take over the settings and rename the process after the instance.
    pub fn new(settings: Settings) -> Self {
        let name = settings.instance_name();
        if !process::set_process_name(&name) {
            debug!("Could not set process name to '{}'", name);
        }
        Self { settings }
    }

    /// Runs once signal handlers are in place, before waiting for a signal.
    pub fn before_startup(&mut self) {}

    /// Runs while shutting down, before the final log line.
    pub fn before_shutdown(&mut self) {
        self.settings.release_resources();
    }

    /// Start up, wait for a termination signal, shut down.
    ///
    /// In dry-run mode the server shuts down right after start up.
    pub fn run(&mut self) -> CliResult<()> {
        info!(
            "Starting up '{}' (v{}) application server...",
            self.settings.instance_name(),
            VERSION
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        if let Some(signal) = runtime.block_on(self.serve())? {
            info!("Received {}", signal);
        }
        self.shutdown();
        Ok(())
    }

    /// The signal that ended the wait, `None` for a dry run.
    async fn serve(&mut self) -> io::Result<Option<&'static str>> {
        let mut signals = Signals::install()?;
        self.before_startup();

        if self.settings.is_dry_run() {
            info!("Dry run, not waiting for signals");
            return Ok(None);
        }
        Ok(Some(signals.recv().await))
    }

    fn shutdown(&mut self) {
        let name = self.settings.instance_name();
        info!("Initiating shut down of '{}' application server...", name);

        self.before_shutdown();

        info!(
            "Application server '{}' was shut down. So Long, and Thanks for All the Fish!",
            name
        );
    }
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.hangup.recv() => "SIGHUP",
            _ = self.quit.recv() => "SIGQUIT",
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn install() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        let _ = tokio::signal::ctrl_c().await;
        "Ctrl+C"
    }
}
