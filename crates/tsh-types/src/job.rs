//! Job identification and status types.

/// Unique identifier for a job in the job table.
///
/// Ids come from a per-table counter and are never reused, so they also
/// order jobs by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = std::num::ParseIntError;

    /// Parses `2` or `%2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('%').unwrap_or(s).parse().map(JobId)
    }
}

/// Status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Job is currently running.
    Running,
    /// Job was stopped by a signal (e.g., Ctrl-Z / SIGTSTP).
    Stopped,
    /// Job exited normally.
    Done,
    /// Job was terminated by an uncaught signal.
    Error,
}

impl JobStatus {
    /// Done and Error are terminal.
    pub fn is_finished(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    /// Whether a job in this status may move to `next`.
    ///
    /// Running → {Running, Stopped, Done, Error}; Stopped → {Stopped, Running,
    /// Done, Error}; terminal states only to themselves.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        match self {
            JobStatus::Running | JobStatus::Stopped => true,
            JobStatus::Done | JobStatus::Error => next == self,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            JobStatus::Running => "Running",
            JobStatus::Stopped => "Stopped",
            JobStatus::Done => "Done",
            JobStatus::Error => "Error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // pad so `{:<24}` lines up job listings
        f.pad(self.as_str())
    }
}

/// Information about a job for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Job ID.
    pub id: JobId,
    /// Process group id (equal to the leader's pid).
    pub pgid: i32,
    /// Command description.
    pub command: String,
    /// Current status.
    pub status: JobStatus,
}
