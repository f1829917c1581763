//! Interactive shell entry into a running container.
//!
//! Delegates the namespace join to the host's `nsenter` tool: it
//! enters the container's mount, UTS, network, cgroup, and PID
//! namespaces and forks so the shell becomes a child of the
//! container's PID 1.

use paddock_common::error::{PaddockError, Result};

/// Runs `/bin/sh` inside the namespaces of the init process `pid` and
/// waits for it to exit.
///
/// The terminal state is saved before `nsenter` runs and restored
/// afterwards, followed by `stty sane` to repair any tty damage
/// inflicted by the guest.
///
/// # Errors
///
/// Returns an error if `nsenter` is not installed, cannot be invoked,
/// or the shell exits non-zero.
#[cfg(target_os = "linux")]
pub fn shell_into(pid: i32) -> Result<()> {
    use nix::sys::termios::{tcgetattr, tcsetattr, SetArg};

    use paddock_common::constants::DEFAULT_SHELL;

    which::which("nsenter").map_err(|_| PaddockError::Setup {
        message: "nsenter not found in PATH".into(),
    })?;

    let stdin = std::io::stdin();
    let saved_termios = tcgetattr(&stdin).ok();

    tracing::info!(pid, "entering container namespaces");
    let status = std::process::Command::new("nsenter")
        .args([
            "-t",
            &pid.to_string(),
            "-m",
            "-u",
            "-n",
            "-C",
            "-p",
            "-F",
            "-r",
            "-w",
            DEFAULT_SHELL,
        ])
        .status();

    if let Some(termios) = saved_termios {
        let _ = tcsetattr(&stdin, SetArg::TCSANOW, &termios);
    }
    let _ = std::process::Command::new("stty").arg("sane").status();
    println!();

    let status = status.map_err(|e| PaddockError::Io {
        path: "nsenter".into(),
        source: e,
    })?;
    if !status.success() {
        return Err(PaddockError::Setup {
            message: format!("shell exited with {status}"),
        });
    }
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — namespace entry requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn shell_into(_pid: i32) -> Result<()> {
    Err(PaddockError::Config {
        message: "Linux required for native container operations".into(),
    })
}
