//! Application services.

pub mod config_loader;
pub mod settings;

pub use config_loader::{ConfigLoader, LoggingState, ResolvedLogging};
pub use settings::Settings;
