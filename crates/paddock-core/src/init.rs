//! The in-container init sequence.
//!
//! Runs inside the freshly cloned namespaces: fixes mount propagation,
//! mounts the pseudo-filesystems, populates `/dev`, pivots the root,
//! hardens `/proc`, masks sensitive paths, and finally `exec`s the
//! payload as PID 1 of the container. The step order is load-bearing;
//! each step depends on state established by the earlier ones.

use std::path::PathBuf;

use paddock_common::constants::{ENV_BINARY, ENV_CONTAINER_DIR, ENV_HOSTNAME, ENV_ROOTFS};
use paddock_common::error::{PaddockError, Result};

/// Configuration handed to the init process by the launcher.
#[derive(Debug, Clone)]
pub struct InitConfig {
    /// Absolute host path of the prepared rootfs.
    pub rootfs: PathBuf,
    /// Absolute host path of the container staging dir (network files).
    pub container_dir: PathBuf,
    /// Guest-visible path of the payload to exec.
    pub binary: PathBuf,
    /// Desired UTS hostname; empty skips `sethostname`.
    pub hostname: String,
}

impl InitConfig {
    /// Reads the configuration from the `CNTR_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `CNTR_ROOTFS` is missing or empty; the other
    /// variables default to empty values.
    pub fn from_env() -> Result<Self> {
        let rootfs = std::env::var(ENV_ROOTFS)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PaddockError::Config {
                message: format!("{ENV_ROOTFS} not set"),
            })?;

        Ok(Self {
            rootfs: PathBuf::from(rootfs),
            container_dir: PathBuf::from(std::env::var(ENV_CONTAINER_DIR).unwrap_or_default()),
            binary: PathBuf::from(std::env::var(ENV_BINARY).unwrap_or_default()),
            hostname: std::env::var(ENV_HOSTNAME).unwrap_or_default(),
        })
    }
}

/// Performs the full container setup, then replaces this process with
/// the payload.
///
/// Warning-class failures (individual device nodes, mqueue, cgroup2,
/// network-file binds, hostname) are reported on stderr and skipped;
/// everything else is fatal. On success this function does not return.
///
/// # Errors
///
/// Returns an error on any fatal setup failure, or if the final exec
/// fails.
#[cfg(target_os = "linux")]
pub fn run(config: &InitConfig) -> Result<std::convert::Infallible> {
    use std::path::Path;

    use crate::filesystem::{devices, harden, mount, pivot_root};
    use crate::namespace;

    // Propagation events must flow host->container only, and the rootfs
    // must be a private mount point before it can be pivoted into.
    mount::make_rslave(Path::new("/"))?;
    mount::bind_self_recursive(&config.rootfs)?;
    mount::make_private(&config.rootfs)?;

    mount::mount_proc(&config.rootfs.join("proc"))?;

    let dev = config.rootfs.join("dev");
    mount::mount_dev_tmpfs(&dev)?;

    for node in devices::DEVICE_NODES {
        if let Err(e) = devices::create_device_node(&dev, node) {
            eprintln!("Warning: failed to create {}: {e}", node.name);
        }
    }
    devices::create_dev_symlinks(&dev);

    mount::mount_devpts(&dev.join("pts"))?;
    devices::create_ptmx_symlink(&dev);

    if let Err(e) = mount::mount_mqueue(&dev.join("mqueue")) {
        eprintln!("Warning: failed to mount mqueue: {e}");
    }

    mount::mount_shm(&dev.join("shm"))?;

    mount::mount_sysfs(&config.rootfs.join("sys"))?;

    if let Err(e) = mount::mount_cgroup2(&config.rootfs.join("sys/fs/cgroup")) {
        eprintln!("Warning: failed to mount cgroup2: {e}");
    }

    bind_network_files(&config.rootfs, &config.container_dir);

    pivot_root::pivot_root(&config.rootfs)?;

    if !config.hostname.is_empty() {
        if let Err(e) = namespace::set_hostname(&config.hostname) {
            eprintln!("Warning: failed to set hostname: {e}");
        }
    }

    harden::harden_proc();
    harden::mask_sensitive_paths();

    tracing::debug!(binary = %config.binary.display(), "setup complete, executing payload");
    exec_payload(&config.binary)
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — container setup requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn run(_config: &InitConfig) -> Result<std::convert::Infallible> {
    Err(PaddockError::Config {
        message: "Linux required for native container operations".into(),
    })
}

#[cfg(target_os = "linux")]
const NETWORK_FILES: &[&str] = &["hostname", "hosts", "resolv.conf"];

/// Bind-mounts the staged network files over `<rootfs>/etc/<file>`.
///
/// Targets are created empty when missing. Failures are warnings; the
/// container merely runs without that file.
#[cfg(target_os = "linux")]
fn bind_network_files(rootfs: &std::path::Path, container_dir: &std::path::Path) {
    use crate::filesystem::mount;

    let etc = rootfs.join("etc");
    let _ = std::fs::create_dir_all(&etc);

    for file in NETWORK_FILES {
        let source = container_dir.join(file);
        let target = etc.join(file);

        if let Err(e) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target)
        {
            eprintln!("Warning: failed to create {}: {e}", target.display());
        }
        if let Err(e) = mount::bind_file(&source, &target) {
            eprintln!("Warning: failed to bind mount {file}: {e}");
        }
    }
}

#[cfg(target_os = "linux")]
fn exec_payload(binary: &std::path::Path) -> Result<std::convert::Infallible> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let program = CString::new(binary.as_os_str().as_bytes()).map_err(|e| PaddockError::Exec {
        path: binary.to_path_buf(),
        message: e.to_string(),
    })?;
    let argv = [program.clone()];

    // The environment of the current process (which carries CNTR_*) is
    // inherited by the payload.
    match nix::unistd::execv(&program, &argv) {
        Err(e) => Err(PaddockError::Exec {
            path: binary.to_path_buf(),
            message: e.to_string(),
        }),
        Ok(infallible) => match infallible {},
    }
}
