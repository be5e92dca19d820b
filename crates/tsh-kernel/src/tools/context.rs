//! Execution context for tools.

use crate::scheduler::JobControl;

use tsh_types::ToolSchema;

/// Execution context passed to tools.
///
/// Owns the shell's job-control state. The working directory and the
/// environment are process-wide and are changed directly.
#[derive(Debug)]
pub struct ExecContext {
    /// Job table, foreground slot, and reaper.
    pub jobs: JobControl,
    /// Tool schemas for the help command.
    pub tool_schemas: Vec<ToolSchema>,
}

impl ExecContext {
    /// Create a context. Must run inside a tokio runtime.
    ///
    /// `interactive` adds terminal stop forwarding.
    pub fn new(interactive: bool) -> std::io::Result<Self> {
        Ok(Self {
            jobs: JobControl::new(interactive)?,
            tool_schemas: Vec::new(),
        })
    }
}
