//! Pure data types for tsh — jobs, command descriptors, results, tool schemas.
//!
//! This crate is a leaf dependency with no async runtime and no OS calls.
//! Front ends (the REPL, a parser, tests) build `CommandDescriptor`s and read
//! `JobInfo` snapshots without pulling in the kernel.

pub mod command;
pub mod job;
pub mod result;
pub mod tool;

// Flat re-exports for convenience
pub use command::*;
pub use job::*;
pub use result::*;
pub use tool::*;
