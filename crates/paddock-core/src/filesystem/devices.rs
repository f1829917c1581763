//! Device-node population for the container's `/dev` tmpfs.

use std::path::Path;

use nix::sys::stat::{makedev, mknod, Mode, SFlag};
use nix::unistd::{chown, Gid, Uid};

use paddock_common::error::{PaddockError, Result};

/// A character device to create under `/dev`.
#[derive(Debug, Clone, Copy)]
pub struct DeviceNode {
    /// Node name under the dev directory.
    pub name: &'static str,
    /// Device major number.
    pub major: u64,
    /// Device minor number.
    pub minor: u64,
}

/// The standard character devices every container receives.
pub const DEVICE_NODES: &[DeviceNode] = &[
    DeviceNode { name: "null", major: 1, minor: 3 },
    DeviceNode { name: "zero", major: 1, minor: 5 },
    DeviceNode { name: "full", major: 1, minor: 7 },
    DeviceNode { name: "random", major: 1, minor: 8 },
    DeviceNode { name: "urandom", major: 1, minor: 9 },
    DeviceNode { name: "tty", major: 5, minor: 0 },
];

/// Creates one character device under `dev` with mode 0666, owned by root.
///
/// # Errors
///
/// Returns an error if `mknod(2)` fails.
pub fn create_device_node(dev: &Path, node: &DeviceNode) -> Result<()> {
    let path = dev.join(node.name);
    mknod(
        &path,
        SFlag::S_IFCHR,
        Mode::from_bits_truncate(0o666),
        makedev(node.major, node.minor),
    )
    .map_err(|e| PaddockError::Setup {
        message: format!("mknod {} failed: {e}", path.display()),
    })?;
    let _ = chown(&path, Some(Uid::from_raw(0)), Some(Gid::from_raw(0)));
    Ok(())
}

const DEV_SYMLINKS: &[(&str, &str)] = &[
    ("/proc/self/fd", "fd"),
    ("/proc/self/fd/0", "stdin"),
    ("/proc/self/fd/1", "stdout"),
    ("/proc/self/fd/2", "stderr"),
    ("/proc/kcore", "core"),
];

/// Creates the standard stdio and kcore symlinks inside `dev`.
///
/// Best-effort: a link that cannot be created is skipped.
pub fn create_dev_symlinks(dev: &Path) {
    for (target, link) in DEV_SYMLINKS {
        let link_path = dev.join(link);
        if let Err(e) = std::os::unix::fs::symlink(target, &link_path) {
            tracing::debug!(link = %link_path.display(), error = %e, "skipping dev symlink");
        }
    }
}

/// Points `<dev>/ptmx` at the private devpts instance. Best-effort.
pub fn create_ptmx_symlink(dev: &Path) {
    let link_path = dev.join("ptmx");
    if let Err(e) = std::os::unix::fs::symlink("/dev/pts/ptmx", &link_path) {
        tracing::debug!(link = %link_path.display(), error = %e, "skipping ptmx symlink");
    }
}
