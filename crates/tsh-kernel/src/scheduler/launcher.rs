//! Starting external programs.
//!
//! Each program gets a fresh process group led by itself. Redirect files are
//! opened in the shell before the fork, so a bad path fails the launch
//! instead of the child. The child's signal mask and dispositions are reset
//! before exec, and an exec failure is reported back to the shell: the child
//! never runs shell code.
//!
//! SIGCHLD stays blocked from just before the fork until the job is in the
//! table or the foreground slot, so no status change can be observed for a
//! process the shell does not know about yet.

use std::fs::{File, OpenOptions};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use nix::errno::Errno;
use nix::sys::signal::{sigprocmask, SigSet, SigmaskHow, Signal};
use nix::unistd::Pid;
use thiserror::Error;

use tsh_types::{CommandDescriptor, JobId, JobStatus, Redirects};

use super::foreground::{ForegroundJob, ForegroundOutcome};
use super::group::ProcessGroup;
use super::job::JobError;
use super::JobControl;
use crate::paths;

/// Errors starting an external program.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("empty command")]
    Empty,

    #[error("{0}: command not found")]
    NotFound(String),

    #[error("{}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("cannot block SIGCHLD: {0}")]
    SignalMask(Errno),

    #[error(transparent)]
    Job(#[from] JobError),
}

impl LaunchError {
    /// Shell exit code for this failure.
    pub fn exit_code(&self) -> i64 {
        match self {
            LaunchError::NotFound(_) => 127,
            LaunchError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                126
            }
            _ => 1,
        }
    }
}

/// Result of a successful launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Registered as a running background job.
    Background { id: JobId, group: ProcessGroup },
    /// Ran in the foreground until it exited or stopped.
    Foreground(ForegroundOutcome),
}

impl LaunchOutcome {
    /// Shell exit code: 0 for background jobs.
    pub fn exit_code(self) -> i64 {
        match self {
            LaunchOutcome::Background { .. } => 0,
            LaunchOutcome::Foreground(outcome) => outcome.exit_code(),
        }
    }
}

/// Blocks SIGCHLD for the calling thread until dropped.
struct ChildSignalBlock {
    previous: SigSet,
}

impl ChildSignalBlock {
    fn new() -> Result<Self, Errno> {
        let mut set = SigSet::empty();
        set.add(Signal::SIGCHLD);
        let mut previous = SigSet::empty();
        sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut previous))?;
        Ok(Self { previous })
    }
}

impl Drop for ChildSignalBlock {
    fn drop(&mut self) {
        if let Err(errno) = sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None) {
            tracing::warn!(%errno, "failed to restore signal mask");
        }
    }
}

/// Starts external programs in their own process groups.
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Resolve, spawn and register `cmd`.
    ///
    /// Background commands land in the job table as Running. Foreground
    /// commands occupy the foreground slot and this call blocks until they
    /// exit or stop.
    pub async fn launch(
        cmd: &CommandDescriptor,
        jobs: &mut JobControl,
    ) -> Result<LaunchOutcome, LaunchError> {
        let program = cmd.program().ok_or(LaunchError::Empty)?;
        let path = paths::resolve_executable(program)
            .ok_or_else(|| LaunchError::NotFound(program.to_string()))?;

        let mut command = Command::new(&path);
        command.arg0(program).args(cmd.args()).process_group(0);
        attach_redirects(&mut command, &cmd.redirects)?;

        if !cmd.background {
            jobs.foreground.discard_stale_signals().await;
        }

        let mask = ChildSignalBlock::new().map_err(LaunchError::SignalMask)?;
        let child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;
        // status is collected with waitpid on the group, not through `Child`
        let group = ProcessGroup::from_leader(Pid::from_raw(child.id() as i32));
        drop(child);

        tracing::debug!(
            program,
            path = %path.display(),
            pgid = group.as_raw(),
            background = cmd.background,
            "launched"
        );

        if cmd.background {
            let id = jobs.table.add(group, cmd.text.clone(), JobStatus::Running);
            drop(mask);
            return Ok(LaunchOutcome::Background { id, group });
        }

        jobs.foreground.arm(ForegroundJob {
            group,
            command: cmd.text.clone(),
        });
        drop(mask);

        let outcome = jobs.foreground.block(&mut jobs.table).await?;
        Ok(LaunchOutcome::Foreground(outcome))
    }
}

fn attach_redirects(command: &mut Command, redirects: &Redirects) -> Result<(), LaunchError> {
    if let Some(path) = &redirects.stdin {
        let file = File::open(path).map_err(|source| redirect_error(path, source))?;
        command.stdin(Stdio::from(file));
    }

    if let Some(path) = &redirects.stdout {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(redirects.append)
            .truncate(!redirects.append)
            .open(path)
            .map_err(|source| redirect_error(path, source))?;
        command.stdout(Stdio::from(file));
    }

    Ok(())
}

fn redirect_error(path: &Path, source: std::io::Error) -> LaunchError {
    LaunchError::Redirect {
        path: path.to_path_buf(),
        source,
    }
}
