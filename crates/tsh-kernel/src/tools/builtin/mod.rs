//! Built-in tools for tsh.
//!
//! These tools run inside the shell process and act on shell state: the
//! working directory, the environment, and the job table.

pub mod assign;
mod bg;
mod cd;
mod fg;
mod help;
mod jobs;
mod kill;

pub use bg::Bg;
pub use cd::Cd;
pub use fg::Fg;
pub use help::Help;
pub use jobs::Jobs;
pub use kill::Kill;

use tsh_types::{ExecResult, JobId};

use super::ToolRegistry;

/// Register all built-in tools with the registry.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(Bg);
    registry.register(Cd);
    registry.register(Fg);
    registry.register(Help);
    registry.register(Jobs);
    registry.register(Kill);
}

/// Parse an optional job reference (`2` or `%2`).
pub(crate) fn parse_job_ref(tool: &str, arg: Option<&str>) -> Result<Option<JobId>, ExecResult> {
    match arg {
        None => Ok(None),
        Some(s) => s
            .parse::<JobId>()
            .map(Some)
            .map_err(|_| ExecResult::failure(1, format!("{tool}: {s}: no such job"))),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for builtin tests.

    use std::os::unix::process::CommandExt;
    use std::process::Command;
    use std::sync::{Mutex, MutexGuard};

    use nix::sys::signal::Signal;
    use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};

    use tsh_types::ToolArgs;

    use crate::scheduler::ProcessGroup;
    use crate::tools::ExecContext;

    /// Serializes tests that touch the process cwd or environment.
    static PROCESS_STATE: Mutex<()> = Mutex::new(());

    pub(crate) fn lock_process_state() -> MutexGuard<'static, ()> {
        PROCESS_STATE.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn ctx() -> ExecContext {
        ExecContext::new(false).unwrap()
    }

    pub(crate) fn args(words: &[&str]) -> ToolArgs {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        ToolArgs::from_words(&words)
    }

    /// Spawn `program` as the leader of a new process group.
    pub(crate) fn spawn_group(program: &str, argv: &[&str]) -> ProcessGroup {
        let child = Command::new(program)
            .args(argv)
            .process_group(0)
            .spawn()
            .unwrap();
        ProcessGroup::from_raw(child.id() as i32)
    }

    /// Stop a group and wait until the kernel reports the stop.
    pub(crate) fn stop_and_confirm(group: ProcessGroup) {
        group.signal(Signal::SIGSTOP).unwrap();
        let status = waitpid(group.leader(), Some(WaitPidFlag::WUNTRACED)).unwrap();
        assert!(matches!(status, WaitStatus::Stopped(..)), "got {status:?}");
    }

    pub(crate) fn kill_and_reap(group: ProcessGroup) {
        let _ = group.signal(Signal::SIGKILL);
        let _ = waitpid(group.leader(), None);
    }
}
