//! The foreground slot.
//!
//! At most one process group is in the foreground at a time. While the
//! shell blocks on it, terminal stop and interrupt signals aimed at the
//! shell are forwarded to the foreground group instead:
//!
//! - SIGTSTP is forwarded; the group moves into the job table as Stopped
//!   once the kernel reports the stop. Interactive shells only.
//! - SIGINT is forwarded and otherwise ignored by the shell. Every job runs
//!   in its own process group, so this holds for non-interactive shells too.
//!
//! The shell never hands the terminal to the child (`tcsetpgrp`), so a
//! job that reads from the terminal is stopped with SIGTTIN by the kernel.
//! That stop is observed like any other.

use futures::FutureExt;
use nix::errno::Errno;
use nix::sys::signal::Signal as Sig;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use tokio::signal::unix::{signal, Signal, SignalKind};

use tsh_types::{JobId, JobStatus};

use super::group::ProcessGroup;
use super::job::{JobError, JobTable};

/// The process group currently owning the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundJob {
    /// The job's process group.
    pub group: ProcessGroup,
    /// Command description, kept for the job table if it stops.
    pub command: String,
}

/// How a foreground job left the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForegroundOutcome {
    /// The leader exited with this code.
    Exited(i32),
    /// The leader was killed by this signal.
    Signaled(Sig),
    /// The job stopped and now lives in the job table.
    Stopped(JobId),
}

impl ForegroundOutcome {
    /// Shell exit code: the exit status, 128+N for signal N, 148 when stopped.
    pub fn exit_code(self) -> i64 {
        match self {
            ForegroundOutcome::Exited(code) => i64::from(code),
            ForegroundOutcome::Signaled(sig) => 128 + sig as i64,
            ForegroundOutcome::Stopped(_) => 128 + Sig::SIGTSTP as i64,
        }
    }
}

/// What woke the foreground wait loop.
enum Wake {
    Child,
    Stop,
    Interrupt,
}

/// Owns the foreground slot and blocks the shell on it.
#[derive(Debug)]
pub struct ForegroundController {
    slot: Option<ForegroundJob>,
    child: Signal,
    interrupt: Signal,
    /// Only installed for interactive shells.
    stop: Option<Signal>,
}

impl ForegroundController {
    /// Install signal listeners. Must run inside a tokio runtime.
    ///
    /// The shell is no longer killed by SIGINT. An interactive controller
    /// also takes over SIGTSTP, so the shell itself is not stopped by it.
    pub fn new(interactive: bool) -> std::io::Result<Self> {
        let child = signal(SignalKind::child())?;
        let interrupt = signal(SignalKind::interrupt())?;
        let stop = if interactive {
            Some(signal(SignalKind::from_raw(Sig::SIGTSTP as i32))?)
        } else {
            None
        };

        Ok(Self {
            slot: None,
            child,
            interrupt,
            stop,
        })
    }

    /// The job currently in the foreground.
    pub fn current(&self) -> Option<&ForegroundJob> {
        self.slot.as_ref()
    }

    /// Whether terminal stop signals are being forwarded.
    pub fn is_interactive(&self) -> bool {
        self.stop.is_some()
    }

    /// Put `job` in the foreground slot.
    pub fn arm(&mut self, job: ForegroundJob) {
        tracing::debug!(pgid = job.group.as_raw(), command = %job.command, "foreground armed");
        self.slot = Some(job);
    }

    /// Forget terminal signals that arrived while nothing was in the
    /// foreground, so they cannot hit the next job.
    pub async fn discard_stale_signals(&mut self) {
        // let the driver deliver anything already pending
        tokio::task::yield_now().await;
        if let Some(stop) = self.stop.as_mut() {
            while stop.recv().now_or_never().flatten().is_some() {}
        }
        while self.interrupt.recv().now_or_never().flatten().is_some() {}
    }

    /// Wait until the foreground job exits or stops.
    ///
    /// Exit or death of the leader clears the slot. A stop (from any source)
    /// moves the job into `table` as Stopped. A terminal stop is only
    /// forwarded here, so a job that ignores SIGTSTP keeps the foreground.
    /// Exits of other group members are collected and ignored.
    pub async fn block(&mut self, table: &mut JobTable) -> Result<ForegroundOutcome, JobError> {
        loop {
            let Some(job) = self.slot.clone() else {
                return Err(JobError::NoForeground);
            };
            let leader = job.group.leader();

            match waitpid(
                job.group.members(),
                Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED),
            ) {
                Ok(WaitStatus::StillAlive) => {}
                Ok(WaitStatus::Exited(pid, code)) if pid == leader => {
                    self.slot = None;
                    tracing::debug!(pgid = job.group.as_raw(), code, "foreground exited");
                    return Ok(ForegroundOutcome::Exited(code));
                }
                Ok(WaitStatus::Signaled(pid, sig, _)) if pid == leader => {
                    self.slot = None;
                    tracing::debug!(pgid = job.group.as_raw(), signal = %sig, "foreground killed");
                    return Ok(ForegroundOutcome::Signaled(sig));
                }
                Ok(WaitStatus::Stopped(pid, sig)) if pid == leader => {
                    tracing::debug!(pgid = job.group.as_raw(), signal = %sig, "foreground stopped");
                    return Ok(ForegroundOutcome::Stopped(self.promote_stopped(table)?));
                }
                Ok(other) => {
                    tracing::trace!(?other, "ignoring group member status");
                    continue;
                }
                Err(Errno::EINTR) => continue,
                Err(errno) => {
                    self.slot = None;
                    // ECHILD: nothing left in the group to track
                    if errno != Errno::ECHILD {
                        table.add(job.group, job.command, JobStatus::Running);
                    }
                    return Err(JobError::Foreground {
                        pgid: job.group.as_raw(),
                        errno,
                    });
                }
            }

            match self.next_wake().await {
                Wake::Child => {}
                Wake::Stop => self.forward_stop_signal()?,
                Wake::Interrupt => self.handle_interrupt_signal(),
            }
        }
    }

    /// Forward a stop request to the foreground group and move it into the
    /// job table as Stopped right away, without waiting for the kernel to
    /// report the stop. For callers outside [`Self::block`].
    ///
    /// Returns the new job id, or `None` when nothing is in the foreground
    /// or the group is already gone.
    pub fn handle_stop_signal(&mut self, table: &mut JobTable) -> Result<Option<JobId>, JobError> {
        let Some(job) = self.slot.as_ref() else {
            return Ok(None);
        };

        match job.group.signal(Sig::SIGTSTP) {
            Ok(()) => self.promote_stopped(table).map(Some),
            Err(JobError::Signal {
                errno: Errno::ESRCH,
                ..
            }) => {
                // already exited; the next wait collects it
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Send SIGTSTP to the foreground group and leave it in the slot until
    /// the stop is observed.
    fn forward_stop_signal(&self) -> Result<(), JobError> {
        let Some(job) = self.slot.as_ref() else {
            return Ok(());
        };
        match job.group.signal(Sig::SIGTSTP) {
            Err(JobError::Signal {
                errno: Errno::ESRCH,
                ..
            }) => Ok(()),
            other => other,
        }
    }

    /// Forward an interrupt to the foreground group, if any.
    pub fn handle_interrupt_signal(&self) {
        if let Some(job) = self.slot.as_ref()
            && let Err(e) = job.group.signal(Sig::SIGINT)
        {
            tracing::warn!(error = %e, "interrupt not delivered");
        }
    }

    fn promote_stopped(&mut self, table: &mut JobTable) -> Result<JobId, JobError> {
        let job = self.slot.take().ok_or(JobError::NoForeground)?;
        Ok(table.add(job.group, job.command, JobStatus::Stopped))
    }

    async fn next_wake(&mut self) -> Wake {
        tokio::select! {
            _ = self.child.recv() => Wake::Child,
            Some(()) = recv_optional(self.stop.as_mut()) => Wake::Stop,
            Some(()) = self.interrupt.recv() => Wake::Interrupt,
        }
    }
}

async fn recv_optional(stream: Option<&mut Signal>) -> Option<()> {
    match stream {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}
