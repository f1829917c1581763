//! Liveness probing and deterministic process termination.

use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;

use paddock_common::constants::POLL_INTERVAL_MS;
use paddock_common::error::{PaddockError, Result};

/// Returns whether the process with `pid` is alive.
///
/// An exited child of this manager is reaped first with a non-blocking
/// `waitpid`, so a zombie init reads as dead rather than alive.
#[must_use]
pub fn process_exists(pid: i32) -> bool {
    let pid = Pid::from_raw(pid);
    let _ = waitpid(pid, Some(WaitPidFlag::WNOHANG));
    kill(pid, None).is_ok()
}

/// Terminates a process, escalating from TERM to KILL.
///
/// Sends `SIGTERM` and polls liveness every 100 ms for up to `timeout`;
/// if the process survives, sends `SIGKILL` and polls for another
/// `timeout`. A process that is already dead returns success
/// immediately.
///
/// # Errors
///
/// Returns [`PaddockError::StillAliveAfterKill`] if the process still
/// exists after both phases.
pub fn kill_and_wait(pid: i32, timeout: Duration) -> Result<()> {
    if !process_exists(pid) {
        return Ok(());
    }

    let target = Pid::from_raw(pid);
    let _ = kill(target, Signal::SIGTERM);
    if wait_for_death(pid, timeout) {
        return Ok(());
    }

    tracing::warn!(pid, "process survived SIGTERM, escalating to SIGKILL");
    let _ = kill(target, Signal::SIGKILL);
    if wait_for_death(pid, timeout) {
        return Ok(());
    }

    Err(PaddockError::StillAliveAfterKill { pid })
}

fn wait_for_death(pid: i32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !process_exists(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
    !process_exists(pid)
}
