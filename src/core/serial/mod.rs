//! Serial mode: run a pipeline as one sequential bash script instead of
//! handing it to bashful.

pub mod compiler;
pub mod invocation;
pub mod tags;

pub use compiler::{compile, render, Step};
pub use invocation::{script_path_for, SerialExecution, SerialInvocation, SerialScript};
pub use tags::TagFilter;
