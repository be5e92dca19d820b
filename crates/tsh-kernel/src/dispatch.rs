//! Command dispatch — the single execution path for every command line.
//!
//! ```text
//! CommandDescriptor
//!        │
//!   leading NAME=VALUE words ──▶ shell environment
//!        │
//!   ┌────┴─────────────┐
//!   │ builtin?         │
//!   ▼                  ▼
//! Tool::execute   ProcessLauncher::launch
//! (in-process)    (own process group; & → job table,
//!                  otherwise block in the foreground)
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use tsh_types::{CommandDescriptor, ExecResult, Redirects, ToolArgs};

use crate::scheduler::ProcessLauncher;
use crate::tools::builtin::assign;
use crate::tools::{ExecContext, ToolRegistry};

/// Trait for dispatching a single command.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Dispatch one command. User-facing failures (not found, bad
    /// arguments) come back as a failed `ExecResult`, not as `Err`.
    async fn dispatch(&self, cmd: &CommandDescriptor, ctx: &mut ExecContext) -> Result<ExecResult>;
}

/// Dispatches to registered builtins, falling back to external programs.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tools: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a tool registry.
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    async fn run_external(&self, cmd: &CommandDescriptor, ctx: &mut ExecContext) -> ExecResult {
        match ProcessLauncher::launch(cmd, &mut ctx.jobs).await {
            Ok(outcome) => ExecResult::from_output(outcome.exit_code(), "", ""),
            Err(e) => {
                tracing::debug!(error = %e, "launch failed");
                ExecResult::failure(e.exit_code(), format!("tsh: {e}"))
            }
        }
    }
}

#[async_trait]
impl CommandDispatcher for Dispatcher {
    async fn dispatch(&self, cmd: &CommandDescriptor, ctx: &mut ExecContext) -> Result<ExecResult> {
        let consumed = assign::apply_leading_assignments(&cmd.argv);
        if consumed == cmd.argv.len() {
            return Ok(ExecResult::success(""));
        }

        let stripped;
        let cmd = if consumed > 0 {
            let rest = &cmd.argv[consumed..];
            stripped = CommandDescriptor {
                argv: rest.to_vec(),
                background: cmd.background,
                redirects: cmd.redirects.clone(),
                text: rest.join(" "),
            };
            &stripped
        } else {
            cmd
        };

        let Some(name) = cmd.program() else {
            return Ok(ExecResult::success(""));
        };

        let Some(tool) = self.tools.get(name) else {
            return Ok(self.run_external(cmd, ctx).await);
        };

        if cmd.background {
            tracing::debug!(name, "builtin runs in the shell; ignoring &");
        }
        let result = tool.execute(ToolArgs::from_words(cmd.args()), ctx).await;
        Ok(redirect_output(result, &cmd.redirects))
    }
}

/// Send a builtin's stdout to its redirect target, if any.
fn redirect_output(mut result: ExecResult, redirects: &Redirects) -> ExecResult {
    let Some(path) = &redirects.stdout else {
        return result;
    };

    let written = OpenOptions::new()
        .write(true)
        .create(true)
        .append(redirects.append)
        .truncate(!redirects.append)
        .open(path)
        .and_then(|mut file| file.write_all(result.out.as_bytes()));

    match written {
        Ok(()) => {
            result.out.clear();
            result
        }
        Err(e) => ExecResult::failure(1, format!("tsh: {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::test_support::lock_process_state;
    use crate::tools::register_builtins;

    fn dispatcher() -> Dispatcher {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry);
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_assignment_only_line() {
        let _lock = lock_process_state();
        let mut ctx = ExecContext::new(false).unwrap();
        let cmd = CommandDescriptor::new(["TSH_DISPATCH_A=1"]);

        let result = dispatcher().dispatch(&cmd, &mut ctx).await.unwrap();
        assert!(result.ok());
        assert_eq!(std::env::var("TSH_DISPATCH_A").unwrap(), "1");
    }

    #[tokio::test]
    async fn test_assignment_then_external_sees_value() {
        let _lock = lock_process_state();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("env.txt");
        let mut ctx = ExecContext::new(false).unwrap();

        let cmd = CommandDescriptor::new(["TSH_DISPATCH_B=seen", "sh", "-c", "echo $TSH_DISPATCH_B"])
            .with_redirects(Redirects {
                stdout: Some(out.clone()),
                ..Redirects::default()
            });
        let result = dispatcher().dispatch(&cmd, &mut ctx).await.unwrap();
        assert!(result.ok(), "{}", result.err);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "seen\n");
    }

    #[tokio::test]
    async fn test_unknown_command_is_127() {
        let mut ctx = ExecContext::new(false).unwrap();
        let cmd = CommandDescriptor::new(["no-such-command-tsh-test"]);

        let result = dispatcher().dispatch(&cmd, &mut ctx).await.unwrap();
        assert_eq!(result.code, 127);
        assert_eq!(result.err, "tsh: no-such-command-tsh-test: command not found");
        assert!(ctx.jobs.table.is_empty());
    }

    #[tokio::test]
    async fn test_builtin_output_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("help.txt");
        let mut ctx = ExecContext::new(false).unwrap();
        ctx.tool_schemas = dispatcher().tools.schemas();

        let cmd = CommandDescriptor::new(["help"]).with_redirects(Redirects {
            stdout: Some(out.clone()),
            ..Redirects::default()
        });
        let result = dispatcher().dispatch(&cmd, &mut ctx).await.unwrap();
        assert!(result.ok());
        assert!(result.out.is_empty());
        assert!(std::fs::read_to_string(&out).unwrap().contains("jobs"));
    }

    #[tokio::test]
    async fn test_foreground_exit_status() {
        let mut ctx = ExecContext::new(false).unwrap();
        let cmd = CommandDescriptor::new(["sh", "-c", "exit 3"]);
        let result = dispatcher().dispatch(&cmd, &mut ctx).await.unwrap();
        assert_eq!(result.code, 3);

        let cmd = CommandDescriptor::new(["sh", "-c", "kill -TERM $$"]);
        let result = dispatcher().dispatch(&cmd, &mut ctx).await.unwrap();
        assert_eq!(result.code, 128 + 15);
    }
}
