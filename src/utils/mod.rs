//! Generic utility primitives with zero domain knowledge.
//!
//! - `io` - File I/O with consistent error handling
//! - `shell` - Shell quoting for status output
//! - `template` - `<replace>` placeholder substitution

pub mod io;
pub mod shell;
pub mod template;
