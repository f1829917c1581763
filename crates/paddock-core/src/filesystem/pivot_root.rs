//! Root filesystem switching via `pivot_root(2)`.
//!
//! Swaps the process root for the prepared rootfs and detaches the old
//! root so nothing of the host tree remains reachable. The caller must
//! already have turned the rootfs into a private mount point.

use std::path::Path;

use paddock_common::constants::OLD_ROOT_DIR;
use paddock_common::error::{PaddockError, Result};

use super::mount;

/// Pivots into `new_root` and discards the old root.
///
/// Sequence:
/// 1. Create `<new_root>/.oldroot` as the parking spot for the old root.
/// 2. Call `pivot_root(2)`.
/// 3. Change working directory to the new `/`.
/// 4. Remount `/` recursively as slave.
/// 5. Lazily unmount `/.oldroot` and remove the directory.
///
/// # Errors
///
/// Returns an error if directory creation, the pivot, the chdir, the
/// propagation remount, or the detach fails.
pub fn pivot_root(new_root: &Path) -> Result<()> {
    let put_old = new_root.join(OLD_ROOT_DIR);
    std::fs::create_dir_all(&put_old).map_err(|e| PaddockError::Io {
        path: put_old.clone(),
        source: e,
    })?;

    nix::unistd::pivot_root(new_root, &put_old).map_err(|e| PaddockError::Setup {
        message: format!("pivot_root failed: {e}"),
    })?;

    std::env::set_current_dir("/").map_err(|e| PaddockError::Setup {
        message: format!("chdir to / failed: {e}"),
    })?;

    mount::make_rslave(Path::new("/"))?;

    let old_root = Path::new("/").join(OLD_ROOT_DIR);
    nix::mount::umount2(&old_root, nix::mount::MntFlags::MNT_DETACH).map_err(|e| {
        PaddockError::Setup {
            message: format!("failed to unmount old root: {e}"),
        }
    })?;

    let _ = std::fs::remove_dir_all(&old_root);

    tracing::debug!(root = %new_root.display(), "pivot_root complete");
    Ok(())
}
