//! Background status collection.
//!
//! The reaper never blocks: each poll probes every tracked job once with
//! `WNOHANG | WUNTRACED | WCONTINUED` and folds whatever the kernel reports into the
//! job table. Polls happen at safe points (before a prompt, after every
//! dispatch) so the table is never mutated from signal context.

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use tsh_types::{JobId, JobStatus};

use super::job::{JobError, JobTable};

/// Source of child status changes.
pub trait StatusProbe {
    /// Report any pending status change for `leader` without blocking.
    fn probe(&mut self, leader: Pid) -> nix::Result<WaitStatus>;
}

/// Queries the kernel with `waitpid(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaitPidProbe;

impl StatusProbe for WaitPidProbe {
    fn probe(&mut self, leader: Pid) -> nix::Result<WaitStatus> {
        waitpid(
            leader,
            Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED),
        )
    }
}

/// What a probe result means for the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Nothing to report.
    Unchanged,
    /// The job moved to this status.
    Became(JobStatus),
    /// The query itself failed; the job is left as it was.
    Failed(Errno),
}

/// Map a `waitpid` result onto a job status change.
pub fn classify(result: nix::Result<WaitStatus>) -> Observation {
    match result {
        Ok(WaitStatus::StillAlive) => Observation::Unchanged,
        Ok(WaitStatus::Exited(..)) => Observation::Became(JobStatus::Done),
        Ok(WaitStatus::Signaled(..)) => Observation::Became(JobStatus::Error),
        Ok(WaitStatus::Stopped(..)) => Observation::Became(JobStatus::Stopped),
        Ok(WaitStatus::Continued(_)) => Observation::Became(JobStatus::Running),
        Ok(_) => Observation::Unchanged,
        // someone else reaped it; it is gone either way
        Err(Errno::ECHILD) => Observation::Became(JobStatus::Error),
        Err(errno) => Observation::Failed(errno),
    }
}

/// Non-blocking status collector for the job table.
#[derive(Debug, Default)]
pub struct SignalReaper<P = WaitPidProbe> {
    probe: P,
}

impl SignalReaper<WaitPidProbe> {
    /// A reaper backed by `waitpid(2)`.
    pub fn new() -> Self {
        Self::with_probe(WaitPidProbe)
    }
}

impl<P: StatusProbe> SignalReaper<P> {
    /// A reaper backed by a custom probe.
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Probe every unfinished job once, update the table, and drop finished
    /// jobs that have been announced.
    ///
    /// Failed queries are returned rather than applied.
    pub fn poll(&mut self, table: &mut JobTable) -> Vec<JobError> {
        let targets: Vec<(JobId, Pid)> = table
            .iter()
            .filter(|job| !job.status.is_finished())
            .map(|job| (job.id, job.group.leader()))
            .collect();

        let mut errors = Vec::new();
        for (id, leader) in targets {
            match classify(self.probe.probe(leader)) {
                Observation::Unchanged => {}
                Observation::Became(status) => {
                    table.set_status(id, status);
                }
                Observation::Failed(errno) => {
                    tracing::warn!(id = %id, %errno, "job status query failed");
                    errors.push(JobError::Wait { id, errno });
                }
            }
        }

        table.reap_finished();
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ProcessGroup;
    use nix::sys::signal::Signal;
    use std::collections::HashMap;

    /// Replays canned results per leader pid.
    #[derive(Default)]
    struct FakeProbe {
        results: HashMap<i32, Vec<nix::Result<WaitStatus>>>,
    }

    impl FakeProbe {
        fn push(&mut self, pid: i32, result: nix::Result<WaitStatus>) {
            self.results.entry(pid).or_default().push(result);
        }
    }

    impl StatusProbe for FakeProbe {
        fn probe(&mut self, leader: Pid) -> nix::Result<WaitStatus> {
            match self.results.get_mut(&leader.as_raw()) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => Ok(WaitStatus::StillAlive),
            }
        }
    }

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    #[test]
    fn classify_maps_wait_statuses() {
        assert_eq!(classify(Ok(WaitStatus::StillAlive)), Observation::Unchanged);
        assert_eq!(
            classify(Ok(WaitStatus::Exited(pid(5), 3))),
            Observation::Became(JobStatus::Done)
        );
        assert_eq!(
            classify(Ok(WaitStatus::Signaled(pid(5), Signal::SIGKILL, false))),
            Observation::Became(JobStatus::Error)
        );
        assert_eq!(
            classify(Ok(WaitStatus::Stopped(pid(5), Signal::SIGTSTP))),
            Observation::Became(JobStatus::Stopped)
        );
        assert_eq!(
            classify(Ok(WaitStatus::Continued(pid(5)))),
            Observation::Became(JobStatus::Running)
        );
        assert_eq!(classify(Err(Errno::ECHILD)), Observation::Became(JobStatus::Error));
        assert_eq!(classify(Err(Errno::EINVAL)), Observation::Failed(Errno::EINVAL));
    }

    #[test]
    fn finished_jobs_notify_once_and_leave() {
        let mut table = JobTable::new();
        table.add(ProcessGroup::from_raw(100), "sleep 1", JobStatus::Running);
        table.add(ProcessGroup::from_raw(200), "sleep 100", JobStatus::Running);

        let mut probe = FakeProbe::default();
        probe.push(100, Ok(WaitStatus::Exited(pid(100), 0)));
        let mut reaper = SignalReaper::with_probe(probe);

        assert!(reaper.poll(&mut table).is_empty());
        assert_eq!(
            table.take_notices(),
            vec![format!("[1] {:<24}sleep 1", "Done")]
        );
        assert_eq!(table.len(), 1);

        // second poll finds nothing new
        assert!(reaper.poll(&mut table).is_empty());
        assert!(table.take_notices().is_empty());
    }

    #[test]
    fn stop_and_continue_are_tracked() {
        let mut table = JobTable::new();
        let id = table.add(ProcessGroup::from_raw(100), "cat", JobStatus::Running);

        let mut probe = FakeProbe::default();
        probe.push(100, Ok(WaitStatus::Stopped(pid(100), Signal::SIGTTIN)));
        probe.push(100, Ok(WaitStatus::Continued(pid(100))));
        let mut reaper = SignalReaper::with_probe(probe);

        reaper.poll(&mut table);
        assert_eq!(table.find(Some(id)).unwrap().status, JobStatus::Stopped);
        reaper.poll(&mut table);
        assert_eq!(table.find(Some(id)).unwrap().status, JobStatus::Running);
        assert!(table.take_notices().is_empty());
    }

    #[test]
    fn query_errors_leave_status_alone() {
        let mut table = JobTable::new();
        let id = table.add(ProcessGroup::from_raw(100), "sleep 100", JobStatus::Running);

        let mut probe = FakeProbe::default();
        probe.push(100, Err(Errno::EINVAL));
        let mut reaper = SignalReaper::with_probe(probe);

        let errors = reaper.poll(&mut table);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], JobError::Wait { errno: Errno::EINVAL, .. }));
        assert_eq!(table.find(Some(id)).unwrap().status, JobStatus::Running);
    }

    #[test]
    fn vanished_child_becomes_error() {
        let mut table = JobTable::new();
        table.add(ProcessGroup::from_raw(100), "ghost", JobStatus::Stopped);
        table.take_notices();

        let mut probe = FakeProbe::default();
        probe.push(100, Err(Errno::ECHILD));
        let mut reaper = SignalReaper::with_probe(probe);

        reaper.poll(&mut table);
        assert_eq!(
            table.take_notices(),
            vec![format!("[1] {:<24}ghost", "Error")]
        );
        assert!(table.is_empty());
    }
}
