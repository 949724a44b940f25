//! Hearth Core - configuration resolution for the hearth service shell.
//!
//! This crate decides *where* a running instance finds its configuration and
//! *what* that configuration resolves to. It follows the same hexagonal split
//! as the rest of the workspace.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           hearth-cli (binary)           │
//! │  (server shell, tracing backend, clap)  │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │     (ConfigLoader, Settings handle)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Filesystem, LoggingBackend)        │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   hearth-adapters / hearth-cli          │
//! │ (LocalFilesystem, TracingBackend, ...)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Environment, paths, LoggingConfig ...) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hearth_core::prelude::*;
//!
//! # fn demo(layout: AppLayout, fs: Box<dyn Filesystem>, backend: Box<dyn LoggingBackend>) -> HearthResult<()> {
//! let overrides = CommandLineOverrides::default();
//! let settings = Settings::init(Environment::Development, overrides, layout, fs, backend)?;
//! println!("running as {}", settings.instance_name());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ConfigLoader, LoggingState, ResolvedLogging, Settings,
        ports::{Filesystem, LoggingBackend},
    };
    pub use crate::domain::{
        AppConfig, AppLayout, CommandLineOverrides, Environment, LoggingConfig, LoggingSpec,
    };
    pub use crate::error::{HearthError, HearthResult, ImproperlyConfigured};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base name of the application process.
///
/// Used to build the instance name and every per-application directory
/// (`/etc/hearth`, `~/.config/hearth`, `<tmp>/hearth.tmp`, ...).
pub const APPLICATION_NAME: &str = "hearth";
