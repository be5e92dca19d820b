//! Scheduler — process launching and job control.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         JobControl                           │
//! │                                                              │
//! │  ProcessLauncher ──spawn──▶ ProcessGroup (pgid = leader pid) │
//! │        │                                                     │
//! │        ├── cmd &  ──▶ JobTable (Running)                     │
//! │        └── cmd    ──▶ ForegroundController::block            │
//! │                          │ exit     → slot cleared           │
//! │                          │ stop     → JobTable (Stopped)     │
//! │                          │ SIGINT   → forwarded to group     │
//! │                                                              │
//! │  SignalReaper::poll ──waitpid(WNOHANG)──▶ JobTable statuses  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs on the shell's single thread. Signal notifications
//! arrive through tokio streams and are acted on at await points, so the
//! job table is only ever touched from ordinary code.

mod foreground;
mod group;
mod job;
mod launcher;
mod reaper;

pub use foreground::{ForegroundController, ForegroundJob, ForegroundOutcome};
pub use group::ProcessGroup;
pub use job::{Job, JobError, JobTable};
pub use launcher::{LaunchError, LaunchOutcome, ProcessLauncher};
pub use reaper::{classify, Observation, SignalReaper, StatusProbe, WaitPidProbe};

use nix::sys::signal::Signal;

use tsh_types::{JobId, JobStatus};

/// The job-control state of one shell: job table, foreground slot, reaper.
#[derive(Debug)]
pub struct JobControl {
    /// Background and stopped jobs.
    pub table: JobTable,
    /// The foreground slot.
    pub foreground: ForegroundController,
    reaper: SignalReaper,
}

impl JobControl {
    /// Create job control. Must run inside a tokio runtime.
    pub fn new(interactive: bool) -> std::io::Result<Self> {
        Ok(Self {
            table: JobTable::new(),
            foreground: ForegroundController::new(interactive)?,
            reaper: SignalReaper::new(),
        })
    }

    /// Collect pending status changes for every tracked job.
    pub fn poll(&mut self) -> Vec<JobError> {
        self.reaper.poll(&mut self.table)
    }

    /// Take `job` out of the table and block on it in the foreground.
    ///
    /// A stopped job is continued first. A running one is not signalled.
    pub async fn bring_to_foreground(&mut self, job: Job) -> Result<ForegroundOutcome, JobError> {
        let Job {
            group,
            command,
            status,
            ..
        } = job;
        self.table.remove(group);

        self.foreground.discard_stale_signals().await;
        self.foreground.arm(ForegroundJob { group, command });
        if status == JobStatus::Stopped
            && let Err(e) = group.signal(Signal::SIGCONT)
        {
            // group vanished; block() will observe the exit
            tracing::warn!(error = %e, "continue failed");
        }
        self.foreground.block(&mut self.table).await
    }

    /// Continue a job's group in the background and mark it Running.
    pub fn resume_in_background(&mut self, id: JobId) -> Result<Option<&Job>, JobError> {
        let Some(group) = self.table.find(Some(id)).map(|job| job.group) else {
            return Ok(None);
        };
        group.signal(Signal::SIGCONT)?;
        self.table.set_status(id, JobStatus::Running);
        Ok(self.table.find(Some(id)))
    }
}
