use std::io;

use tokio::process::Child;
use tokio::time::{Duration, Instant, sleep, timeout};

use crate::constants::DEATH_POLL_INTERVAL;

/// Takedown progress for a group that hit its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Running,
    GracePeriod,
    Killed,
}

/// Handle to the process group a supervised child was spawned into.
///
/// The child is started with its pgid equal to its own pid, so every
/// descendant it forks stays addressable through this one handle even after
/// the direct child is gone.
#[derive(Debug, Clone, Copy)]
pub struct ProcessGroup {
    pgid: i32,
}

impl ProcessGroup {
    pub fn new(pid: u32) -> Self {
        Self { pgid: pid as i32 }
    }

    pub fn pgid(&self) -> i32 {
        self.pgid
    }

    /// True while at least one process in the group exists. Signal 0 checks
    /// without delivering anything.
    pub fn is_alive(&self) -> bool {
        unsafe { libc::killpg(self.pgid, 0) == 0 }
    }

    pub fn signal_term(&self) -> io::Result<()> {
        self.signal(libc::SIGTERM)
    }

    pub fn signal_kill(&self) -> io::Result<()> {
        self.signal(libc::SIGKILL)
    }

    fn signal(&self, sig: i32) -> io::Result<()> {
        let rc = unsafe { libc::killpg(self.pgid, sig) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        // A group that already vanished is not a failure to signal.
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        Err(err)
    }

    /// Escalates a group that blew its deadline: SIGTERM to the whole group,
    /// then SIGKILL once `grace` runs out. Returns the state the main
    /// process died in. The direct child is reaped here on both paths.
    pub async fn escalate(&self, child: &mut Child, grace: Duration) -> io::Result<GroupState> {
        self.signal_term()?;
        if let Ok(waited) = timeout(grace, child.wait()).await {
            waited?;
            return Ok(GroupState::GracePeriod);
        }
        self.signal_kill()?;
        child.wait().await?;
        Ok(GroupState::Killed)
    }

    /// Polls until the whole group is gone or `window` elapses. Killed
    /// descendants are reparented and reaped by init, so a dead group turns
    /// into ESRCH without our involvement.
    pub async fn await_death(&self, window: Duration) -> bool {
        let deadline = Instant::now() + window;
        while self.is_alive() {
            if Instant::now() >= deadline {
                return false;
            }
            sleep(DEATH_POLL_INTERVAL).await;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Stdio;
    use tokio::process::Command;

    fn spawn_in_own_group(script: &str) -> (Child, ProcessGroup) {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .kill_on_drop(true);
        let child = cmd.spawn().unwrap();
        let pid = child.id().unwrap();
        (child, ProcessGroup::new(pid))
    }

    #[tokio::test]
    async fn test_cooperative_process_dies_during_grace() {
        let (mut child, group) = spawn_in_own_group("sleep 30");
        assert!(group.is_alive());

        let state = group.escalate(&mut child, Duration::from_secs(2)).await.unwrap();

        assert_eq!(state, GroupState::GracePeriod);
        assert!(group.await_death(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_term_ignoring_process_is_killed() {
        let (mut child, group) = spawn_in_own_group("trap '' TERM; sleep 30");
        // Give the shell a moment to install the trap.
        sleep(Duration::from_millis(200)).await;

        let state = group.escalate(&mut child, Duration::from_millis(300)).await.unwrap();

        assert_eq!(state, GroupState::Killed);
        assert!(group.await_death(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_signaling_a_dead_group_is_not_an_error() {
        let (mut child, group) = spawn_in_own_group("exit 0");
        child.wait().await.unwrap();
        assert!(group.await_death(Duration::from_secs(2)).await);

        assert!(group.signal_term().is_ok());
        assert!(group.signal_kill().is_ok());
        assert!(!group.is_alive());
    }
}
