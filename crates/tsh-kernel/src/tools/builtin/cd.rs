//! cd — Change working directory.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::paths::home_dir;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use tsh_types::ExecResult;

/// Cd tool: change the process working directory.
pub struct Cd;

#[async_trait]
impl Tool for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("cd", "Change current working directory")
            .param(ParamSchema::optional(
                "dir",
                "Directory to change to (defaults to $HOME)",
            ))
            .example("Go home", "cd")
            .example("Enter a directory", "cd /tmp")
    }

    async fn execute(&self, args: ToolArgs, _ctx: &mut ExecContext) -> ExecResult {
        let target = match args.get_positional(0) {
            Some(dir) => PathBuf::from(dir),
            None => match home_dir() {
                Some(home) => home,
                None => return ExecResult::failure(1, "cd: HOME not set"),
            },
        };

        match std::env::set_current_dir(&target) {
            Ok(()) => {
                tracing::debug!(cwd = %target.display(), "changed directory");
                ExecResult::success("")
            }
            Err(e) => ExecResult::failure(1, format!("cd: {}: {}", target.display(), e)),
        }
    }
}
