//! tsh-kernel: process execution and job control for tsh.
//!
//! This crate provides:
//!
//! - **Paths**: `$PATH` executable resolution and `$HOME` lookup
//! - **Scheduler**: process launching, the job table, the status reaper,
//!   and the foreground controller
//! - **Tools**: the `Tool` trait, registry, and builtins (`cd`, `bg`, `fg`,
//!   `jobs`, `kill`, `help`)
//! - **Dispatch**: builtin-versus-external routing and `NAME=VALUE` handling
//! - **Kernel**: the facade front ends drive

pub mod dispatch;
pub mod kernel;
pub mod paths;
pub mod scheduler;
pub mod tools;

pub use dispatch::{CommandDispatcher, Dispatcher};
pub use kernel::{Kernel, KernelConfig};
pub use paths::{home_dir, resolve_executable, resolve_in_path};
pub use scheduler::{JobControl, JobError, LaunchError, LaunchOutcome};
pub use tsh_types::{CommandDescriptor, ExecResult, JobId, JobInfo, JobStatus, Redirects};
