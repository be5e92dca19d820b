//! Process group handles.
//!
//! Every job runs in its own process group whose id equals the leader's
//! pid. Signals always go to the whole group, never to a bare pid.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use super::job::JobError;

/// A process group, identified by its leader's pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessGroup(Pid);

impl ProcessGroup {
    /// The group led by `leader` (pgid == leader pid).
    pub fn from_leader(leader: Pid) -> Self {
        Self(leader)
    }

    /// Wrap a raw pgid.
    pub fn from_raw(pgid: i32) -> Self {
        Self(Pid::from_raw(pgid))
    }

    /// The leader's pid.
    pub fn leader(self) -> Pid {
        self.0
    }

    /// Raw pgid.
    pub fn as_raw(self) -> i32 {
        self.0.as_raw()
    }

    /// Negative pid addressing every member, for `kill(2)` and `waitpid(2)`.
    pub fn members(self) -> Pid {
        Pid::from_raw(-self.0.as_raw())
    }

    /// Deliver `sig` to every process in the group.
    pub fn signal(self, sig: Signal) -> Result<(), JobError> {
        tracing::debug!(pgid = self.as_raw(), signal = %sig, "signalling group");
        signal::kill(self.members(), sig).map_err(|errno| JobError::Signal {
            pgid: self.as_raw(),
            signal: sig,
            errno,
        })
    }
}

impl std::fmt::Display for ProcessGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    #[test]
    fn members_is_negated_pgid() {
        let group = ProcessGroup::from_raw(4242);
        assert_eq!(group.members(), Pid::from_raw(-4242));
        assert_eq!(group.leader(), Pid::from_raw(4242));
        assert_eq!(group.to_string(), "4242");
    }

    #[test]
    fn signalling_a_missing_group_reports_errno() {
        // pid_max on Linux is at most 2^22, so this group cannot exist
        let group = ProcessGroup::from_raw(i32::MAX - 7);
        let err = group.signal(Signal::SIGCONT).unwrap_err();
        match err {
            JobError::Signal { errno, .. } => assert_eq!(errno, Errno::ESRCH),
            other => panic!("unexpected error: {other}"),
        }
    }
}
