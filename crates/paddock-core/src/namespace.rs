//! Linux namespace management for container isolation.
//!
//! Provides the spawn primitive that creates a child inside fresh
//! namespaces with the flags applied atomically by `clone(2)`.

use std::ffi::CString;

use paddock_common::error::{PaddockError, Result};

/// Which namespaces to create for a new container.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct NamespaceSet {
    /// Isolate the mount table.
    pub mount: bool,
    /// Isolate the process ID space.
    pub pid: bool,
    /// Isolate the cgroup hierarchy view.
    pub cgroup: bool,
    /// Isolate hostname and domain name.
    pub uts: bool,
    /// Isolate the network stack.
    pub network: bool,
}

impl Default for NamespaceSet {
    fn default() -> Self {
        Self {
            mount: true,
            pid: true,
            cgroup: true,
            uts: true,
            network: true,
        }
    }
}

#[cfg(target_os = "linux")]
impl NamespaceSet {
    fn clone_flags(&self) -> nix::sched::CloneFlags {
        use nix::sched::CloneFlags;

        let mut flags = CloneFlags::empty();
        if self.mount {
            flags |= CloneFlags::CLONE_NEWNS;
        }
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        if self.cgroup {
            flags |= CloneFlags::CLONE_NEWCGROUP;
        }
        if self.uts {
            flags |= CloneFlags::CLONE_NEWUTS;
        }
        if self.network {
            flags |= CloneFlags::CLONE_NEWNET;
        }
        flags
    }
}

const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Spawns `argv[0]` in fresh namespaces, returning the child's host PID.
///
/// The namespace flags are applied atomically by `clone(2)`, so the
/// child's very first instruction already runs inside the new
/// namespaces. The child is placed in its own process group and then
/// replaced by `execve`; no manager code runs between clone and exec.
/// `env` is the complete environment of the child.
///
/// # Errors
///
/// Returns an error if `argv` is empty or the `clone(2)` syscall fails.
/// An exec failure in the child surfaces as the child exiting 127.
#[cfg(target_os = "linux")]
pub fn spawn_in_namespaces(
    argv: &[CString],
    env: &[CString],
    namespaces: &NamespaceSet,
) -> Result<i32> {
    use nix::sched::clone;
    use nix::unistd::{execve, setpgid, Pid};

    let program = argv.first().ok_or_else(|| PaddockError::Spawn {
        message: "empty argv".into(),
    })?;

    let mut stack = vec![0u8; CHILD_STACK_SIZE];
    let child: Box<dyn FnMut() -> isize + '_> = Box::new(|| {
        let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
        match execve(program, argv, env) {
            Err(_) => 127,
            Ok(infallible) => match infallible {},
        }
    });

    // SAFETY: the child callback only calls setpgid and execve, both
    // async-signal-safe; it never returns into Rust code that shares
    // state with the parent.
    let pid = unsafe {
        clone(
            child,
            &mut stack,
            namespaces.clone_flags(),
            Some(nix::libc::SIGCHLD),
        )
    }
    .map_err(|e| PaddockError::Spawn {
        message: format!("clone failed: {e}"),
    })?;

    tracing::debug!(pid = pid.as_raw(), "spawned child in fresh namespaces");
    Ok(pid.as_raw())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — namespace creation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn spawn_in_namespaces(
    _argv: &[CString],
    _env: &[CString],
    _namespaces: &NamespaceSet,
) -> Result<i32> {
    Err(PaddockError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Sets the hostname inside the current UTS namespace.
///
/// # Errors
///
/// Returns an error if `sethostname(2)` fails.
#[cfg(target_os = "linux")]
pub fn set_hostname(hostname: &str) -> Result<()> {
    nix::unistd::sethostname(hostname).map_err(|e| PaddockError::Setup {
        message: format!("sethostname failed: {e}"),
    })?;
    tracing::debug!(hostname, "hostname set");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — `sethostname` requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn set_hostname(_hostname: &str) -> Result<()> {
    Err(PaddockError::Config {
        message: "Linux required for native container operations".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_enables_all_five() {
        let set = NamespaceSet::default();
        assert!(set.mount && set.pid && set.cgroup && set.uts && set.network);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn clone_flags_follow_toggles() {
        use nix::sched::CloneFlags;

        let mut set = NamespaceSet::default();
        set.network = false;
        let flags = set.clone_flags();
        assert!(flags.contains(CloneFlags::CLONE_NEWNS));
        assert!(flags.contains(CloneFlags::CLONE_NEWPID));
        assert!(flags.contains(CloneFlags::CLONE_NEWCGROUP));
        assert!(flags.contains(CloneFlags::CLONE_NEWUTS));
        assert!(!flags.contains(CloneFlags::CLONE_NEWNET));
    }

    #[test]
    fn spawn_rejects_empty_argv() {
        let result = spawn_in_namespaces(&[], &[], &NamespaceSet::default());
        assert!(result.is_err());
    }
}
