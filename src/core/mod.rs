// Public modules
pub mod config;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod serial;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
