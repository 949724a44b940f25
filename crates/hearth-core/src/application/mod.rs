//! Application layer for Hearth.
//!
//! This layer contains:
//! - **Services**: [`ConfigLoader`] (resolution and validation) and the
//!   [`Settings`] handle owning it for the lifetime of the process
//! - **Ports**: traits for the filesystem and the process-wide logging system
//! - **Errors**: application-specific error types
//!
//! Location policy lives in `crate::domain`; this layer only performs the
//! I/O the policy asks for.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{ConfigLoader, LoggingState, ResolvedLogging, Settings};

pub use ports::{Filesystem, LoggingBackend};

pub use error::ApplicationError;
