//! Infrastructure adapters for Hearth.
//!
//! This crate implements the ports defined in `hearth-core::application::ports`
//! that touch the machine directly, and detects where this binary lives.

pub mod filesystem;
pub mod layout;
pub mod resources;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use layout::{detect_layout, sandboxed_layout};
