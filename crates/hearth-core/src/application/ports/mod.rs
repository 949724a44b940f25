//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `hearth-adapters` and
//! `hearth-cli` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: reading config layers, probing the log file, temp dirs
//!   - `LoggingBackend`: installing the resolved logging config process-wide

pub mod output;

pub use output::{Filesystem, LoggingBackend};

#[cfg(test)]
pub use output::{MockFilesystem, MockLoggingBackend};
