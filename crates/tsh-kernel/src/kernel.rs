//! The Kernel — the heart of tsh.
//!
//! Owns the tool registry and the job-control context, and runs one
//! `CommandDescriptor` at a time. Job status is collected at the end of
//! every dispatch; front ends also call [`Kernel::poll_jobs`] before each
//! prompt.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use tsh_types::{CommandDescriptor, ExecResult, JobInfo, ToolSchema};

use crate::dispatch::{CommandDispatcher, Dispatcher};
use crate::scheduler::ForegroundJob;
use crate::tools::{register_builtins, ExecContext, ToolRegistry};

/// Configuration for kernel initialization.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Name of this kernel (for identification in logs).
    pub name: String,

    /// Working directory to switch to at startup. `None` keeps the current one.
    pub cwd: Option<PathBuf>,

    /// Forward terminal stop signals to the foreground job.
    ///
    /// Set by the REPL. Interrupts are forwarded either way, since every
    /// job runs in its own process group and a terminal ^C only reaches
    /// the shell's.
    pub interactive: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::named("default")
    }
}

impl KernelConfig {
    /// Create a kernel config with the given name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cwd: None,
            interactive: false,
        }
    }

    /// A throwaway kernel for one command (`tsh -c`, tests).
    pub fn transient() -> Self {
        Self::named("transient")
    }

    /// An interactive REPL kernel.
    pub fn repl() -> Self {
        Self {
            name: "repl".to_string(),
            cwd: None,
            interactive: true,
        }
    }

    /// Set the initial working directory.
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    /// Set interactive mode.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

/// The shell kernel.
#[derive(Debug)]
pub struct Kernel {
    name: String,
    tools: Arc<ToolRegistry>,
    dispatcher: Dispatcher,
    ctx: ExecContext,
}

impl Kernel {
    /// Create a new kernel. Must be called inside a tokio runtime, since
    /// signal listeners are registered with it.
    pub fn new(config: KernelConfig) -> Result<Self> {
        if let Some(cwd) = &config.cwd {
            std::env::set_current_dir(cwd)
                .with_context(|| format!("changing directory to {}", cwd.display()))?;
        }

        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry);
        let tools = Arc::new(registry);

        let mut ctx =
            ExecContext::new(config.interactive).context("installing signal listeners")?;
        ctx.tool_schemas = tools.schemas();

        tracing::debug!(name = %config.name, interactive = config.interactive, "kernel ready");
        Ok(Self {
            name: config.name,
            dispatcher: Dispatcher::new(tools.clone()),
            tools,
            ctx,
        })
    }

    /// Get the kernel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run one command to completion (or until it stops, or immediately for
    /// `&`), then collect job status changes.
    ///
    /// Status notices (stopped, done, error) are appended to `out`.
    pub async fn execute(&mut self, cmd: CommandDescriptor) -> Result<ExecResult> {
        tracing::debug!(command = %cmd.text, background = cmd.background, "execute");
        let mut result = self.dispatcher.dispatch(&cmd, &mut self.ctx).await?;

        let polled = self.poll_jobs();
        result.out.push_str(&polled.out);
        result.err.push_str(&polled.err);
        Ok(result)
    }

    /// Collect pending job status changes.
    ///
    /// Returns queued notices in `out` and status-query failures in `err`.
    pub fn poll_jobs(&mut self) -> ExecResult {
        let errors = self.ctx.jobs.poll();

        let mut result = ExecResult::success("");
        result.append_lines(self.ctx.jobs.table.take_notices());
        for e in errors {
            result.err.push_str(&format!("tsh: {e}\n"));
        }
        result
    }

    /// Snapshot of the job table in id order.
    pub fn jobs(&self) -> Vec<JobInfo> {
        self.ctx.jobs.table.list()
    }

    /// The job currently in the foreground, if any.
    pub fn foreground(&self) -> Option<&ForegroundJob> {
        self.ctx.jobs.foreground.current()
    }

    /// Schemas of every builtin.
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools.schemas()
    }

    /// Whether `name` is handled in-process.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.tools.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsh_types::{JobId, JobStatus};

    #[test]
    fn test_config_constructors() {
        let repl = KernelConfig::repl();
        assert!(repl.interactive);
        assert_eq!(repl.name, "repl");

        let t = KernelConfig::transient().with_cwd(PathBuf::from("/tmp"));
        assert!(!t.interactive);
        assert_eq!(t.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(KernelConfig::default().name, "default");
    }

    #[tokio::test]
    async fn test_kernel_builtins_registered() {
        let kernel = Kernel::new(KernelConfig::transient()).unwrap();
        for name in ["cd", "bg", "fg", "jobs", "kill", "help"] {
            assert!(kernel.is_builtin(name), "{name} missing");
        }
        assert!(!kernel.is_builtin("sleep"));
        assert_eq!(kernel.name(), "transient");
    }

    #[tokio::test]
    async fn test_background_job_then_listing() {
        let mut kernel = Kernel::new(KernelConfig::transient()).unwrap();

        let started = kernel
            .execute(CommandDescriptor::new(["sleep", "100"]).background(true))
            .await
            .unwrap();
        assert!(started.ok());

        let jobs = kernel.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, JobId(1));
        assert_eq!(jobs[0].status, JobStatus::Running);

        let listing = kernel.execute(CommandDescriptor::new(["jobs"])).await.unwrap();
        assert_eq!(listing.out, "[1] Running                 sleep 100 &\n");

        kernel
            .execute(CommandDescriptor::new(["kill", "-KILL", "%1"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_finished_background_job_is_announced_once() {
        let mut kernel = Kernel::new(KernelConfig::transient()).unwrap();
        let mut announced = kernel
            .execute(CommandDescriptor::new(["true"]).background(true))
            .await
            .unwrap()
            .out;

        for _ in 0..200 {
            announced.push_str(&kernel.poll_jobs().out);
            if kernel.jobs().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(announced, "[1] Done                    true\n");
        assert!(kernel.poll_jobs().out.is_empty());
    }
}
