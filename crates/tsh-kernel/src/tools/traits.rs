//! Core tool trait.

use async_trait::async_trait;

use tsh_types::{ExecResult, ToolArgs, ToolSchema};

use super::context::ExecContext;

/// A builtin command.
///
/// Builtins run inside the shell process and may mutate shell state (the
/// working directory, the environment, the job table) through `ctx`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name (used for lookup).
    fn name(&self) -> &str;

    /// Get the tool's schema.
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the given arguments and context.
    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult;
}
