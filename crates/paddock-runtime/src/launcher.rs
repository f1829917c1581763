//! Container staging and namespace launch.
//!
//! Prepares the per-container directory (rootfs copy, network files,
//! payload binary), then re-executes the manager binary as the
//! in-container init inside fresh namespaces.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use paddock_common::config::ManagerConfig;
use paddock_common::constants::{
    ENV_BINARY, ENV_CONTAINER_DIR, ENV_HOSTNAME, ENV_ROOTFS, GUEST_PAYLOAD_DIR,
    GUEST_PAYLOAD_PATH, ROOTFS_DIR_NAME,
};
use paddock_common::error::{PaddockError, Result};
use paddock_common::types::{Container, ContainerName};
use paddock_core::namespace::{self, NamespaceSet};

/// Creates a new container and spawns its init process.
///
/// Stages the rootfs copy, the network files, and the payload binary,
/// then clones a child into fresh mount, PID, cgroup, UTS, and network
/// namespaces which re-executes this binary with the `init` argument.
///
/// # Errors
///
/// Returns a staging, path-resolution, or spawn error; see the
/// individual steps. A failed launch removes its partially staged
/// directory — no registry record will ever exist to clean it up.
pub fn launch(config: &ManagerConfig, binary: &Path) -> Result<Container> {
    let name = ContainerName::generate();
    let location = config.work_root.join(name.as_str());
    let rootfs_location = location.join(ROOTFS_DIR_NAME);

    match stage_and_spawn(config, binary, &name, &location, &rootfs_location) {
        Ok(namespace_pid) => {
            tracing::info!(name = %name, pid = namespace_pid, "container init spawned");
            Ok(Container {
                name,
                location,
                rootfs_location,
                namespace_pid,
            })
        }
        Err(e) => {
            if let Err(rm) = std::fs::remove_dir_all(&location) {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(location = %location.display(), error = %rm,
                        "could not remove partially staged container dir");
                }
            }
            Err(e)
        }
    }
}

fn stage_and_spawn(
    config: &ManagerConfig,
    binary: &Path,
    name: &ContainerName,
    location: &Path,
    rootfs_location: &Path,
) -> Result<i32> {
    stage_rootfs(&config.base_rootfs, rootfs_location)?;
    stage_network_files(location, name);
    stage_payload(binary, rootfs_location)?;

    let rootfs_abs = absolute_path(rootfs_location)?;
    let location_abs = absolute_path(location)?;

    spawn_init(&rootfs_abs, &location_abs, name)
}

/// Creates the rootfs directory (mode 0755) and copies the base rootfs
/// into it.
///
/// # Errors
///
/// Returns [`PaddockError::Stage`] if directory creation or the copy
/// fails.
pub fn stage_rootfs(base_rootfs: &Path, rootfs_location: &Path) -> Result<()> {
    std::fs::create_dir_all(rootfs_location).map_err(|e| PaddockError::Stage {
        message: format!("creating {}: {e}", rootfs_location.display()),
    })?;
    std::fs::set_permissions(rootfs_location, std::fs::Permissions::from_mode(0o755)).map_err(
        |e| PaddockError::Stage {
            message: format!("setting mode on {}: {e}", rootfs_location.display()),
        },
    )?;

    let options = fs_extra::dir::CopyOptions::new()
        .content_only(true)
        .overwrite(true);
    fs_extra::dir::copy(base_rootfs, rootfs_location, &options).map_err(|e| {
        PaddockError::Stage {
            message: format!("copying base rootfs {}: {e}", base_rootfs.display()),
        }
    })?;
    Ok(())
}

/// Stages `hosts`, `hostname`, and `resolv.conf` in the container dir.
///
/// The files live outside the rootfs; init bind-mounts them over
/// `/etc/*` later. Failures are warnings — the container runs without
/// the affected file.
pub fn stage_network_files(location: &Path, name: &ContainerName) {
    let hosts = format!(
        "127.0.0.1   localhost {name}\n::1   localhost ip6-localhost ip6-loopback\n"
    );
    if let Err(e) = std::fs::write(location.join("hosts"), hosts) {
        tracing::warn!(error = %e, "could not stage hosts file");
    }

    if let Err(e) = std::fs::write(location.join("hostname"), format!("{name}\n")) {
        tracing::warn!(error = %e, "could not stage hostname file");
    }

    if let Err(e) = std::fs::copy("/etc/resolv.conf", location.join("resolv.conf")) {
        tracing::warn!(error = %e, "could not stage resolv.conf");
    }
}

/// Copies the payload binary to the fixed guest path and marks it
/// executable.
///
/// # Errors
///
/// Returns [`PaddockError::BinaryStaging`] if the copy or chmod fails.
pub fn stage_payload(binary: &Path, rootfs_location: &Path) -> Result<()> {
    let payload_dir = rootfs_location.join(GUEST_PAYLOAD_DIR);
    std::fs::create_dir_all(&payload_dir).map_err(|e| PaddockError::BinaryStaging {
        message: format!("creating {}: {e}", payload_dir.display()),
    })?;

    let payload = payload_dir.join("container-app");
    std::fs::copy(binary, &payload).map_err(|e| PaddockError::BinaryStaging {
        message: format!("copying {}: {e}", binary.display()),
    })?;
    std::fs::set_permissions(&payload, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        PaddockError::BinaryStaging {
            message: format!("marking {} executable: {e}", payload.display()),
        }
    })?;
    Ok(())
}

/// Resolves a path to an absolute one, anchoring relatives at the
/// current working directory.
///
/// # Errors
///
/// Returns [`PaddockError::PathResolution`] if the working directory
/// cannot be determined.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| PaddockError::PathResolution {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(cwd.join(path))
}

fn spawn_init(rootfs_abs: &Path, location_abs: &Path, name: &ContainerName) -> Result<i32> {
    let argv = vec![
        cstring("/proc/self/exe".as_bytes())?,
        cstring("init".as_bytes())?,
    ];
    let env = child_environment(rootfs_abs, location_abs, name)?;
    namespace::spawn_in_namespaces(&argv, &env, &NamespaceSet::default())
}

/// Builds the child environment: the inherited host environment plus
/// the four `CNTR_*` configuration values.
fn child_environment(
    rootfs_abs: &Path,
    location_abs: &Path,
    name: &ContainerName,
) -> Result<Vec<CString>> {
    let own_keys = [ENV_ROOTFS, ENV_CONTAINER_DIR, ENV_BINARY, ENV_HOSTNAME];

    let mut env = Vec::new();
    for (key, value) in std::env::vars_os() {
        if own_keys.iter().any(|k| key == *k) {
            continue;
        }
        let mut entry = key.as_bytes().to_vec();
        entry.push(b'=');
        entry.extend_from_slice(value.as_bytes());
        env.push(cstring(&entry)?);
    }

    for (key, value) in [
        (ENV_ROOTFS, rootfs_abs.as_os_str().as_bytes()),
        (ENV_CONTAINER_DIR, location_abs.as_os_str().as_bytes()),
        (ENV_BINARY, GUEST_PAYLOAD_PATH.as_bytes()),
        (ENV_HOSTNAME, name.as_str().as_bytes()),
    ] {
        let mut entry = key.as_bytes().to_vec();
        entry.push(b'=');
        entry.extend_from_slice(value);
        env.push(cstring(&entry)?);
    }

    Ok(env)
}

fn cstring(bytes: &[u8]) -> Result<CString> {
    CString::new(bytes).map_err(|e| PaddockError::Spawn {
        message: format!("NUL byte in environment or argv: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_environment_carries_the_four_config_values() {
        let name = ContainerName::new("container-test123");
        let env = child_environment(
            Path::new("/work/container-test123/root_fs"),
            Path::new("/work/container-test123"),
            &name,
        )
        .expect("environment");

        let entries: Vec<String> = env
            .iter()
            .map(|e| e.to_str().expect("utf-8").to_string())
            .collect();
        assert!(entries.contains(&"CNTR_ROOTFS=/work/container-test123/root_fs".to_string()));
        assert!(entries.contains(&"CNTR_DIR=/work/container-test123".to_string()));
        assert!(entries.contains(&"CNTR_BINARY=/home/container/container-app".to_string()));
        assert!(entries.contains(&"CNTR_HOSTNAME=container-test123".to_string()));
    }

    #[test]
    fn child_environment_does_not_duplicate_config_keys() {
        std::env::set_var(ENV_ROOTFS, "/stale/value");
        let name = ContainerName::new("container-test123");
        let env = child_environment(Path::new("/fresh"), Path::new("/work"), &name)
            .expect("environment");
        std::env::remove_var(ENV_ROOTFS);

        let rootfs_entries = env
            .iter()
            .filter(|e| e.to_bytes().starts_with(b"CNTR_ROOTFS="))
            .count();
        assert_eq!(rootfs_entries, 1);
    }

    #[test]
    fn absolute_path_anchors_relatives_at_cwd() {
        let resolved = absolute_path(Path::new("some/dir")).expect("resolve");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/dir"));

        let already = absolute_path(Path::new("/abs/path")).expect("resolve");
        assert_eq!(already, PathBuf::from("/abs/path"));
    }
}
