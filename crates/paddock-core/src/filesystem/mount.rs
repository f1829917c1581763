//! Typed wrappers over `mount(2)` for each mount shape the init
//! sequence needs.
//!
//! Helpers that mount onto a fresh directory create the mountpoint
//! themselves; propagation and bind helpers expect the target to exist.

use std::path::Path;

use nix::mount::{mount, MsFlags};

use paddock_common::error::{PaddockError, Result};

fn mount_error(target: &Path, e: nix::Error) -> PaddockError {
    PaddockError::Mount {
        target: target.to_path_buf(),
        message: e.to_string(),
    }
}

fn ensure_dir(target: &Path) -> Result<()> {
    std::fs::create_dir_all(target).map_err(|e| PaddockError::Io {
        path: target.to_path_buf(),
        source: e,
    })
}

/// Remounts `target` and everything below it as slave: mount events
/// propagate host to container, never back.
pub fn make_rslave(target: &Path) -> Result<()> {
    mount(
        None::<&str>,
        target,
        None::<&str>,
        MsFlags::MS_SLAVE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}

/// Recursively bind-mounts `target` onto itself, turning it into a
/// mount point as `pivot_root(2)` requires.
pub fn bind_self_recursive(target: &Path) -> Result<()> {
    mount(
        Some(target),
        target,
        None::<&str>,
        MsFlags::MS_BIND | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}

/// Marks the mount at `target` private.
pub fn make_private(target: &Path) -> Result<()> {
    mount(
        None::<&str>,
        target,
        None::<&str>,
        MsFlags::MS_PRIVATE,
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}

/// Mounts a fresh procfs at `target`.
pub fn mount_proc(target: &Path) -> Result<()> {
    ensure_dir(target)?;
    mount(
        Some("proc"),
        target,
        Some("proc"),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}

/// Mounts the container's `/dev` tmpfs.
pub fn mount_dev_tmpfs(target: &Path) -> Result<()> {
    ensure_dir(target)?;
    mount(
        Some("tmpfs"),
        target,
        Some("tmpfs"),
        MsFlags::MS_NOSUID | MsFlags::MS_STRICTATIME,
        Some("mode=0755,size=65536k"),
    )
    .map_err(|e| mount_error(target, e))
}

/// Mounts a private devpts instance at `target`.
pub fn mount_devpts(target: &Path) -> Result<()> {
    ensure_dir(target)?;
    mount(
        Some("devpts"),
        target,
        Some("devpts"),
        MsFlags::empty(),
        Some("newinstance,ptmxmode=0666,mode=0620"),
    )
    .map_err(|e| mount_error(target, e))
}

/// Mounts the POSIX message queue filesystem at `target`.
pub fn mount_mqueue(target: &Path) -> Result<()> {
    ensure_dir(target)?;
    mount(
        Some("mqueue"),
        target,
        Some("mqueue"),
        MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}

/// Mounts the shared-memory tmpfs at `target`.
pub fn mount_shm(target: &Path) -> Result<()> {
    ensure_dir(target)?;
    mount(
        Some("tmpfs"),
        target,
        Some("tmpfs"),
        MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
        Some("mode=1777,size=67108864"),
    )
    .map_err(|e| mount_error(target, e))
}

/// Mounts a read-only sysfs at `target`.
pub fn mount_sysfs(target: &Path) -> Result<()> {
    ensure_dir(target)?;
    mount(
        Some("sysfs"),
        target,
        Some("sysfs"),
        MsFlags::MS_RDONLY | MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}

/// Mounts the unified cgroup v2 hierarchy read-only at `target`.
pub fn mount_cgroup2(target: &Path) -> Result<()> {
    ensure_dir(target)?;
    mount(
        Some("cgroup2"),
        target,
        Some("cgroup2"),
        MsFlags::MS_RDONLY | MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}

/// Bind-mounts the file at `source` over `target`.
pub fn bind_file(source: &Path, target: &Path) -> Result<()> {
    mount(
        Some(source),
        target,
        None::<&str>,
        MsFlags::MS_BIND,
        None::<&str>,
    )
    .map_err(|e| mount_error(target, e))
}
