//! fg — Bring a job to the foreground.

use async_trait::async_trait;

use super::parse_job_ref;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use tsh_types::ExecResult;

/// Fg tool: move a job into the foreground slot and wait on it.
///
/// A stopped job is continued first; a running one is taken over as is.
pub struct Fg;

#[async_trait]
impl Tool for Fg {
    fn name(&self) -> &str {
        "fg"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("fg", "Resume a job in the foreground")
            .param(ParamSchema::optional(
                "job",
                "Job id, bare or as %N (defaults to the most recent job)",
            ))
            .example("Resume the most recent job", "fg")
            .example("Resume a specific job", "fg 2")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let requested = match parse_job_ref("fg", args.get_positional(0)) {
            Ok(id) => id,
            Err(result) => return result,
        };

        let Some(job) = ctx.jobs.table.find(requested).cloned() else {
            return match requested {
                Some(id) => ExecResult::failure(1, format!("fg: %{id}: no such job")),
                None => ExecResult::success(""),
            };
        };

        tracing::debug!(id = %job.id, status = %job.status, "bringing job to foreground");
        match ctx.jobs.bring_to_foreground(job).await {
            Ok(outcome) => ExecResult::from_output(outcome.exit_code(), "", ""),
            Err(e) => ExecResult::failure(1, format!("fg: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::test_support::{
        args, ctx, kill_and_reap, spawn_group, stop_and_confirm,
    };
    use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
    use std::time::Duration;
    use tsh_types::JobStatus;

    #[tokio::test]
    async fn test_fg_empty_table_is_no_op() {
        let mut ctx = ctx();
        let result = Fg.execute(args(&[]), &mut ctx).await;
        assert!(result.ok());
        assert!(result.out.is_empty());
        assert!(result.err.is_empty());
        assert!(ctx.jobs.table.is_empty());
        assert!(ctx.jobs.foreground.current().is_none());
    }

    #[tokio::test]
    async fn test_fg_running_job_waits_for_exit() {
        let mut ctx = ctx();
        let group = spawn_group("sh", &["-c", "sleep 0.2; exit 4"]);
        ctx.jobs.table.add(group, "sh -c ...", JobStatus::Running);

        let result = Fg.execute(args(&["1"]), &mut ctx).await;
        assert_eq!(result.code, 4);
        assert!(ctx.jobs.table.is_empty());
        assert!(ctx.jobs.foreground.current().is_none());
    }

    #[tokio::test]
    async fn test_fg_running_job_is_not_continued() {
        let mut ctx = ctx();
        // stopped behind the table's back, and the stop already collected
        let group = spawn_group("sleep", &["100"]);
        stop_and_confirm(group);
        ctx.jobs.table.add(group, "sleep 100", JobStatus::Running);

        let waited =
            tokio::time::timeout(Duration::from_millis(300), Fg.execute(args(&[]), &mut ctx))
                .await;
        assert!(waited.is_err(), "fg returned early: {waited:?}");

        let status = waitpid(
            group.leader(),
            Some(WaitPidFlag::WCONTINUED | WaitPidFlag::WNOHANG),
        )
        .unwrap();
        assert_eq!(status, WaitStatus::StillAlive);

        kill_and_reap(group);
    }

    #[tokio::test]
    async fn test_fg_continues_stopped_job() {
        let mut ctx = ctx();
        let group = spawn_group("sleep", &["0.2"]);
        stop_and_confirm(group);
        ctx.jobs.table.add(group, "sleep 0.2", JobStatus::Stopped);
        ctx.jobs.table.take_notices();

        let result = Fg.execute(args(&["%1"]), &mut ctx).await;
        assert!(result.ok(), "{}", result.err);
        assert!(ctx.jobs.table.is_empty());
    }

    #[tokio::test]
    async fn test_fg_unknown_job() {
        let mut ctx = ctx();
        let result = Fg.execute(args(&["3"]), &mut ctx).await;
        assert!(!result.ok());
        assert!(result.err.contains("%3"));
    }
}
