//! System-wide constants and default paths.

/// Default working-directory anchor holding one subdirectory per container.
pub const DEFAULT_WORK_ROOT: &str = ".containers";

/// Default location of the prebuilt base rootfs that gets copied per container.
pub const DEFAULT_BASE_ROOTFS: &str = "./root_fs";

/// Name of the per-container rootfs subdirectory under its staging dir.
pub const ROOTFS_DIR_NAME: &str = "root_fs";

/// Guest-visible directory that receives the payload binary.
pub const GUEST_PAYLOAD_DIR: &str = "home/container";

/// Guest-visible path of the payload, passed to the init process for `exec`.
pub const GUEST_PAYLOAD_PATH: &str = "/home/container/container-app";

/// Mountpoint inside the new rootfs where the old root is parked during pivot.
pub const OLD_ROOT_DIR: &str = ".oldroot";

/// Environment key carrying the absolute rootfs path to the init process.
pub const ENV_ROOTFS: &str = "CNTR_ROOTFS";

/// Environment key carrying the absolute container staging dir.
pub const ENV_CONTAINER_DIR: &str = "CNTR_DIR";

/// Environment key carrying the guest-visible payload path.
pub const ENV_BINARY: &str = "CNTR_BINARY";

/// Environment key carrying the desired UTS hostname.
pub const ENV_HOSTNAME: &str = "CNTR_HOSTNAME";

/// Prefix of every generated container name.
pub const NAME_PREFIX: &str = "container-";

/// Number of random alphanumerics appended to [`NAME_PREFIX`].
pub const NAME_SUFFIX_LEN: usize = 7;

/// Liveness poll interval during kill-and-wait, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 100;

/// Default per-phase timeout for the TERM/KILL escalation, in seconds.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 5;

/// Shell executed when the launch prompt is left empty, and by shell-in.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Application name used in CLI output.
pub const APP_NAME: &str = "paddock";
