//! jobs — List background and stopped jobs.

use async_trait::async_trait;

use crate::tools::{ExecContext, Tool, ToolArgs, ToolSchema};
use tsh_types::ExecResult;

/// Jobs tool: list every tracked job in id order.
pub struct Jobs;

#[async_trait]
impl Tool for Jobs {
    fn name(&self) -> &str {
        "jobs"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("jobs", "List background and stopped jobs").example("List jobs", "jobs")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let mut result = ExecResult::success("");
        result.append_lines(ctx.jobs.table.surface_all());
        // finished jobs have now been seen once
        ctx.jobs.table.reap_finished();
        result
    }
}
