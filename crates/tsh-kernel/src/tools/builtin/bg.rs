//! bg — Resume a job in the background.

use async_trait::async_trait;

use super::parse_job_ref;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use tsh_types::ExecResult;

/// Bg tool: continue a job's process group without waiting for it.
pub struct Bg;

#[async_trait]
impl Tool for Bg {
    fn name(&self) -> &str {
        "bg"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("bg", "Resume a stopped job in the background")
            .param(ParamSchema::optional(
                "job",
                "Job id, bare or as %N (defaults to the most recent job)",
            ))
            .example("Resume the most recent job", "bg")
            .example("Resume a specific job", "bg %2")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let requested = match parse_job_ref("bg", args.get_positional(0)) {
            Ok(id) => id,
            Err(result) => return result,
        };

        let Some(id) = ctx.jobs.table.find(requested).map(|job| job.id) else {
            return match requested {
                Some(id) => ExecResult::failure(1, format!("bg: %{id}: no such job")),
                None => ExecResult::success(""),
            };
        };

        match ctx.jobs.resume_in_background(id) {
            Ok(Some(job)) => ExecResult::success(format!("{}\n", job.status_line())),
            Ok(None) => ExecResult::success(""),
            Err(e) => ExecResult::failure(1, format!("bg: {e}")),
        }
    }
}
