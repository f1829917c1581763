//! Integration tests for the container staging and lifecycle pipeline.
//!
//! Everything here runs without root: staging is exercised against a
//! synthetic base rootfs in a temp directory, and termination against
//! ordinary child processes. Actual namespace creation is covered by
//! the spawn contract tests in `paddock-core`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};

use paddock_common::config::ManagerConfig;
use paddock_common::types::ContainerName;
use paddock_runtime::launcher;
use paddock_runtime::process;

/// Builds a minimal fake base rootfs with a `/bin/sh` placeholder.
fn make_base_rootfs(dir: &Path) -> std::path::PathBuf {
    let base = dir.join("base_rootfs");
    std::fs::create_dir_all(base.join("bin")).expect("base dirs");
    std::fs::create_dir_all(base.join("etc")).expect("base etc");
    std::fs::write(base.join("bin/sh"), b"#!/bin/sh\n").expect("fake sh");
    base
}

// ── Staging ──────────────────────────────────────────────────────────

#[test]
fn staging_produces_expected_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = make_base_rootfs(dir.path());

    let name = ContainerName::generate();
    let location = dir.path().join("work").join(name.as_str());
    let rootfs = location.join("root_fs");

    launcher::stage_rootfs(&base, &rootfs).expect("stage rootfs");
    launcher::stage_network_files(&location, &name);
    launcher::stage_payload(&base.join("bin/sh"), &rootfs).expect("stage payload");

    // Base rootfs content was copied into root_fs, not nested beside it.
    assert!(rootfs.join("bin/sh").exists());
    assert!(rootfs.join("etc").is_dir());

    // Network files live in the staging dir, not yet in the rootfs.
    assert!(location.join("hosts").exists());
    assert!(location.join("hostname").exists());
    assert!(!rootfs.join("etc/hosts").exists());

    // The payload sits at the fixed guest path and is executable.
    let payload = rootfs.join("home/container/container-app");
    assert!(payload.exists());
    let mode = payload.metadata().expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn staged_hosts_file_names_the_container() {
    let dir = tempfile::tempdir().expect("tempdir");
    let name = ContainerName::new("container-aB3xY9z");
    std::fs::create_dir_all(dir.path().join("pen")).expect("location");
    launcher::stage_network_files(&dir.path().join("pen"), &name);

    let hosts = std::fs::read_to_string(dir.path().join("pen/hosts")).expect("hosts");
    let mut lines = hosts.lines();
    assert_eq!(
        lines.next().expect("ipv4 line"),
        "127.0.0.1   localhost container-aB3xY9z"
    );
    assert_eq!(
        lines.next().expect("ipv6 line"),
        "::1   localhost ip6-localhost ip6-loopback"
    );

    let hostname = std::fs::read_to_string(dir.path().join("pen/hostname")).expect("hostname");
    assert_eq!(hostname.trim_end(), "container-aB3xY9z");
}

#[test]
fn stage_rootfs_fails_on_missing_base() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = launcher::stage_rootfs(
        &dir.path().join("no-such-base"),
        &dir.path().join("pen/root_fs"),
    );
    assert!(result.is_err(), "missing base rootfs must fail staging");
}

#[test]
fn stage_payload_fails_on_missing_binary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rootfs = dir.path().join("root_fs");
    std::fs::create_dir_all(&rootfs).expect("rootfs dir");
    let result = launcher::stage_payload(Path::new("/no/such/binary"), &rootfs);
    assert!(result.is_err());
}

// ── Path resolution ──────────────────────────────────────────────────

#[test]
fn absolute_path_is_stable_for_absolute_input() {
    let resolved = launcher::absolute_path(Path::new("/var/lib/pen")).expect("resolve");
    assert_eq!(resolved, Path::new("/var/lib/pen"));
}

#[test]
fn absolute_path_prefixes_cwd_for_relative_input() {
    let cwd = std::env::current_dir().expect("cwd");
    let resolved = launcher::absolute_path(Path::new(".containers/x")).expect("resolve");
    assert_eq!(resolved, cwd.join(".containers/x"));
}

// ── Names ────────────────────────────────────────────────────────────

#[test]
fn generated_names_have_seven_alphanumeric_suffix() {
    for _ in 0..32 {
        let name = ContainerName::generate();
        assert!(
            ContainerName::is_well_formed(name.as_str()),
            "unexpected name: {name}"
        );
    }
}

// ── Termination ──────────────────────────────────────────────────────

#[test]
fn kill_and_wait_handles_child_that_dies_before_term() {
    // The child exits between our spawn and the TERM send; the reap in
    // the liveness probe must report it dead within one poll interval.
    let child = std::process::Command::new("true")
        .spawn()
        .expect("spawn true");
    let pid = child.id() as i32;
    std::thread::sleep(Duration::from_millis(300));

    let start = Instant::now();
    process::kill_and_wait(pid, Duration::from_secs(5)).expect("already dead");
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn kill_and_wait_escalation_stays_within_two_timeouts() {
    let child = std::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .expect("spawn sleep");
    let pid = child.id() as i32;

    let timeout = Duration::from_secs(2);
    let start = Instant::now();
    process::kill_and_wait(pid, timeout).expect("sleep dies on TERM");
    assert!(start.elapsed() < timeout * 2 + Duration::from_millis(200));
    assert!(!process::process_exists(pid));
}

// ── Configuration ────────────────────────────────────────────────────

#[test]
fn default_config_matches_on_disk_conventions() {
    let config = ManagerConfig::default();
    assert_eq!(config.work_root, Path::new(".containers"));
    assert_eq!(config.stop_timeout(), Duration::from_secs(5));
}
