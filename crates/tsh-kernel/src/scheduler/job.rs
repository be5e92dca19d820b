//! The job table.
//!
//! Tracks every background or stopped process group the shell knows about.
//! Ids come from a monotonic counter and are never reused, so iteration in
//! id order is also insertion order and "most recent" is the last entry.
//!
//! Status lines produced for the user (stop notices, completion notices) are
//! queued here and drained by whoever owns the terminal.

use std::collections::{BTreeMap, HashMap};

use nix::errno::Errno;
use nix::sys::signal::Signal;
use thiserror::Error;

use tsh_types::{JobId, JobInfo, JobStatus};

use super::group::ProcessGroup;

/// Errors from signalling or waiting on jobs.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("cannot send {signal} to group {pgid}: {errno}")]
    Signal {
        pgid: i32,
        signal: Signal,
        errno: Errno,
    },

    #[error("status query for job [{id}] failed: {errno}")]
    Wait { id: JobId, errno: Errno },

    #[error("waiting on foreground group {pgid} failed: {errno}")]
    Foreground { pgid: i32, errno: Errno },

    #[error("no foreground job")]
    NoForeground,
}

/// A tracked job.
#[derive(Debug, Clone)]
pub struct Job {
    /// Job ID.
    pub id: JobId,
    /// The job's process group.
    pub group: ProcessGroup,
    /// Command description.
    pub command: String,
    /// Current status.
    pub status: JobStatus,
    /// The user has seen this job in a listing or notice.
    surfaced: bool,
}

impl Job {
    /// Whether the user has seen the job since it last changed.
    pub fn surfaced(&self) -> bool {
        self.surfaced
    }

    /// Snapshot for listings.
    pub fn info(&self) -> JobInfo {
        JobInfo {
            id: self.id,
            pgid: self.group.as_raw(),
            command: self.command.clone(),
            status: self.status,
        }
    }

    /// `[id] Status                  command`, with ` &` for running jobs.
    pub fn status_line(&self) -> String {
        let suffix = if self.status == JobStatus::Running {
            " &"
        } else {
            ""
        };
        format!("[{}] {:<24}{}{}", self.id, self.status, self.command, suffix)
    }
}

/// Every background or stopped job, keyed by id.
#[derive(Debug)]
pub struct JobTable {
    next_id: u64,
    jobs: BTreeMap<JobId, Job>,
    by_group: HashMap<ProcessGroup, JobId>,
    notices: Vec<String>,
}

impl JobTable {
    /// Create an empty table; the first job gets id 1.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            jobs: BTreeMap::new(),
            by_group: HashMap::new(),
            notices: Vec::new(),
        }
    }

    /// Register a job and return its fresh id.
    ///
    /// A job that arrives already stopped gets its status line queued
    /// immediately, since the user just watched it leave the foreground.
    pub fn add(&mut self, group: ProcessGroup, command: impl Into<String>, status: JobStatus) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;

        if let Some(stale) = self.by_group.insert(group, id) {
            // pgids are recycled by the kernel once a group is fully reaped
            tracing::debug!(%group, old = %stale, "replacing stale group entry");
            self.jobs.remove(&stale);
        }

        let job = Job {
            id,
            group,
            command: command.into(),
            status,
            surfaced: false,
        };
        tracing::debug!(id = %id, %group, status = %status, "job added");

        if status == JobStatus::Stopped {
            self.notices.push(job.status_line());
        }
        self.jobs.insert(id, job);
        id
    }

    /// Remove the job owning `group`.
    pub fn remove(&mut self, group: ProcessGroup) -> Option<Job> {
        let id = self.by_group.remove(&group)?;
        self.jobs.remove(&id)
    }

    /// Look up by id, or the most recent job when `id` is `None`.
    pub fn find(&self, id: Option<JobId>) -> Option<&Job> {
        match id {
            Some(id) => self.jobs.get(&id),
            None => self.jobs.values().next_back(),
        }
    }

    /// Look up the job owning `group`.
    pub fn find_by_group(&self, group: ProcessGroup) -> Option<&Job> {
        self.by_group.get(&group).and_then(|id| self.jobs.get(id))
    }

    /// Change a job's status, honoring the allowed transitions.
    ///
    /// Returns `true` when the status actually changed. Moving into Done or
    /// Error queues one notice and clears the surfaced flag.
    pub fn set_status(&mut self, id: JobId, status: JobStatus) -> bool {
        let Some(job) = self.jobs.get_mut(&id) else {
            return false;
        };
        if job.status == status || !job.status.can_transition_to(status) {
            return false;
        }

        tracing::debug!(id = %id, from = %job.status, to = %status, "job status changed");
        job.status = status;
        job.surfaced = false;
        if status.is_finished() {
            let line = job.status_line();
            job.surfaced = true;
            self.notices.push(line);
        }
        true
    }

    /// Drop finished jobs the user has already been told about.
    pub fn reap_finished(&mut self) -> usize {
        let finished: Vec<(JobId, ProcessGroup)> = self
            .jobs
            .values()
            .filter(|job| job.status.is_finished() && job.surfaced)
            .map(|job| (job.id, job.group))
            .collect();

        for (id, group) in &finished {
            self.jobs.remove(id);
            if self.by_group.get(group) == Some(id) {
                self.by_group.remove(group);
            }
        }
        finished.len()
    }

    /// Jobs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Status lines for every job, marking each one surfaced.
    pub fn surface_all(&mut self) -> Vec<String> {
        self.jobs
            .values_mut()
            .map(|job| {
                job.surfaced = true;
                job.status_line()
            })
            .collect()
    }

    /// Snapshot of all jobs for listings.
    pub fn list(&self) -> Vec<JobInfo> {
        self.jobs.values().map(Job::info).collect()
    }

    /// Drain queued status lines.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Number of tracked jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True if no jobs are tracked.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}
