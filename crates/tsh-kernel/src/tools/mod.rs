//! Tool system for tsh.
//!
//! Every builtin implements the same `Tool` trait and is looked up by name
//! in a `ToolRegistry`. Anything not found there is an external program.
//!
//! # Architecture
//!
//! ```text
//! ToolRegistry
//! ├── cd, bg, fg, jobs, kill, help
//! └── (NAME=VALUE words are handled by the dispatcher, not a tool)
//! ```

pub mod builtin;
mod context;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use context::ExecContext;
pub use registry::ToolRegistry;
pub use traits::Tool;
pub use tsh_types::{ParamSchema, ToolArgs, ToolSchema};
