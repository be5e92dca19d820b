//! kill — Send a signal to a job's process group.

use async_trait::async_trait;
use nix::sys::signal::Signal;

use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use tsh_types::{ExecResult, JobId, JobStatus};

/// Kill tool: signal every process in a job.
///
/// Only job references are accepted, so the signal always reaches the
/// whole group.
pub struct Kill;

#[async_trait]
impl Tool for Kill {
    fn name(&self) -> &str {
        "kill"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("kill", "Send a signal to a job")
            .param(ParamSchema::optional(
                "-SIG",
                "Signal name or number: TERM (default), KILL, INT, HUP, STOP, TSTP, CONT, QUIT, USR1, USR2",
            ))
            .param(ParamSchema::required("job", "Job id, bare or as %N"))
            .example("Terminate a job", "kill %1")
            .example("Stop a job", "kill -STOP %2")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let (signal, target) = match args.get_positional(0) {
            Some(flag) if flag.starts_with('-') => {
                let name = &flag[1..];
                match parse_signal(name) {
                    Some(sig) => (sig, args.get_positional(1)),
                    None => return ExecResult::failure(1, format!("kill: {name}: unknown signal")),
                }
            }
            other => (Signal::SIGTERM, other),
        };

        let Some(target) = target else {
            return ExecResult::failure(1, "kill: usage: kill [-SIG] %job");
        };
        let id = match target.parse::<JobId>() {
            Ok(id) => id,
            Err(_) => return ExecResult::failure(1, format!("kill: {target}: no such job")),
        };

        let Some(group) = ctx.jobs.table.find(Some(id)).map(|job| job.group) else {
            return ExecResult::failure(1, format!("kill: %{id}: no such job"));
        };

        if let Err(e) = group.signal(signal) {
            return ExecResult::failure(1, format!("kill: {e}"));
        }
        if signal == Signal::SIGCONT {
            ctx.jobs.table.set_status(id, JobStatus::Running);
        }
        ExecResult::success("")
    }
}

/// Parse a signal name (with or without `SIG`) or number.
fn parse_signal(name: &str) -> Option<Signal> {
    if let Ok(num) = name.parse::<i32>() {
        return Signal::try_from(num).ok();
    }

    let name = name.to_ascii_uppercase();
    let name = name.strip_prefix("SIG").unwrap_or(&name);

    match name {
        "TERM" => Some(Signal::SIGTERM),
        "KILL" => Some(Signal::SIGKILL),
        "INT" => Some(Signal::SIGINT),
        "HUP" => Some(Signal::SIGHUP),
        "STOP" => Some(Signal::SIGSTOP),
        "TSTP" => Some(Signal::SIGTSTP),
        "CONT" => Some(Signal::SIGCONT),
        "QUIT" => Some(Signal::SIGQUIT),
        "USR1" => Some(Signal::SIGUSR1),
        "USR2" => Some(Signal::SIGUSR2),
        _ => None,
    }
}
