//! Attack-surface reduction after the pivot: read-only proc subtrees
//! and masking of kernel introspection paths.

use std::path::Path;

use nix::mount::{mount, MsFlags};

const PROC_READONLY: &[&str] = &[
    "/proc/bus",
    "/proc/fs",
    "/proc/irq",
    "/proc/sys",
    "/proc/sysrq-trigger",
];

/// Remounts sensitive `/proc` subtrees read-only.
///
/// Each existing entry is bind-mounted onto itself, then the bind is
/// remounted read-only. Absent entries are skipped silently.
pub fn harden_proc() {
    for path in PROC_READONLY {
        let path = Path::new(path);
        if !path.exists() {
            continue;
        }
        let _ = mount(
            Some(path),
            path,
            None::<&str>,
            MsFlags::MS_BIND,
            None::<&str>,
        );
        let _ = mount(
            None::<&str>,
            path,
            None::<&str>,
            MsFlags::MS_REMOUNT | MsFlags::MS_BIND | MsFlags::MS_RDONLY,
            None::<&str>,
        );
    }
}

const MASKED_PATHS: &[&str] = &[
    "/proc/asound",
    "/proc/interrupts",
    "/proc/kcore",
    "/proc/keys",
    "/proc/latency_stats",
    "/proc/timer_list",
    "/proc/timer_stats",
    "/proc/sched_debug",
    "/proc/acpi",
    "/proc/scsi",
    "/sys/firmware",
];

/// Renders kernel introspection paths inert.
///
/// Directories are overlaid with an empty read-only tmpfs, files get
/// `/dev/null` bind-mounted over them. The dir-vs-file decision is
/// taken by `stat` at runtime; absent paths are skipped.
pub fn mask_sensitive_paths() {
    for path in MASKED_PATHS {
        let path = Path::new(path);
        let Ok(meta) = std::fs::metadata(path) else {
            continue;
        };
        if meta.is_dir() {
            let _ = mount(
                Some("tmpfs"),
                path,
                Some("tmpfs"),
                MsFlags::MS_RDONLY,
                None::<&str>,
            );
        } else {
            let _ = mount(
                Some("/dev/null"),
                path,
                None::<&str>,
                MsFlags::MS_BIND,
                None::<&str>,
            );
        }
    }
}
