//! Core domain layer for Hearth.
//!
//! Pure configuration policy with no I/O: every function here takes what it
//! needs as arguments and returns a value. File reads, directory creation and
//! logging initialisation are reached through ports in
//! [`crate::application::ports`].
//!
//! - [`paths`]: absolute/relative path resolution
//! - [`environment`]: per-environment location policy
//! - [`logging`]: logging config merge and post-processing
//! - [`app_config`]: layered YAML application config

pub mod app_config;
pub mod environment;
pub mod error;
pub mod layout;
pub mod logging;
pub mod overrides;
pub mod paths;

pub use app_config::AppConfig;
pub use environment::Environment;
pub use error::DomainError;
pub use layout::AppLayout;
pub use logging::{
    FormatterSpec, HandlerClass, HandlerSpec, LoggerSpec, LoggingConfig, LoggingSpec,
    PostProcessOptions, StreamTarget,
};
pub use overrides::CommandLineOverrides;
