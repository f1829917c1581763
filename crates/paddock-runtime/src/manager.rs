//! The container manager: registries and lifecycle operations.
//!
//! One `Manager` value is constructed per process and owns the three
//! container registries (*starting*, *running*, *stopped*). All
//! mutation happens from the manager's single thread.

use std::path::Path;

use paddock_common::config::ManagerConfig;
use paddock_common::error::{PaddockError, Result};
use paddock_common::types::{Container, ContainerName, ContainerStatus};

use crate::{enter, launcher, process};

/// Supervises the set of live containers.
///
/// New containers land directly in *running* once the launcher
/// returns. The *starting* registry is reserved for a future
/// two-phase launch handshake and *stopped* for post-mortem
/// inspection; both are swept by delete and bulk cleanup so adopting
/// them later will not change those operations.
pub struct Manager {
    config: ManagerConfig,
    starting: Vec<Container>,
    running: Vec<Container>,
    #[allow(dead_code)]
    stopped: Vec<Container>,
}

/// One row of the container listing.
#[derive(Debug, Clone)]
pub struct ContainerListing {
    /// Container name.
    pub name: ContainerName,
    /// Host-side PID of the init process.
    pub pid: i32,
    /// Probed liveness of that PID.
    pub status: ContainerStatus,
}

/// Result of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record was removed and its directory deleted.
    Deleted,
    /// No container with that name exists.
    NotFound,
}

impl Manager {
    /// Creates a manager with empty registries.
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            starting: Vec::new(),
            running: Vec::new(),
            stopped: Vec::new(),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Launches a new container running `binary` and registers it.
    ///
    /// # Errors
    ///
    /// Returns the launcher's staging, path-resolution, or spawn
    /// error. A failed launch leaves no record behind; the partially
    /// staged directory is removed.
    pub fn launch(&mut self, binary: &Path) -> Result<Container> {
        let container = launcher::launch(&self.config, binary)?;
        let snapshot = container.clone();
        self.running.push(container);
        Ok(snapshot)
    }

    /// Renders all *running* records with their probed liveness.
    #[must_use]
    pub fn list(&self) -> Vec<ContainerListing> {
        self.running
            .iter()
            .map(|c| ContainerListing {
                name: c.name.clone(),
                pid: c.namespace_pid,
                status: if process::process_exists(c.namespace_pid) {
                    ContainerStatus::Running
                } else {
                    ContainerStatus::Stopped
                },
            })
            .collect()
    }

    /// Stops and removes the container with the given name.
    ///
    /// Searches *running*, then *starting*. Kill or removal failures
    /// are warnings; the record is dropped either way.
    pub fn delete(&mut self, name: &str) -> DeleteOutcome {
        if let Some(idx) = self.running.iter().position(|c| c.name.as_str() == name) {
            let container = self.running.remove(idx);
            self.dispose(&container);
            return DeleteOutcome::Deleted;
        }
        if let Some(idx) = self.starting.iter().position(|c| c.name.as_str() == name) {
            let container = self.starting.remove(idx);
            self.dispose(&container);
            return DeleteOutcome::Deleted;
        }
        DeleteOutcome::NotFound
    }

    /// Opens an interactive shell inside a running container.
    ///
    /// # Errors
    ///
    /// Returns [`PaddockError::NotFound`] for an unknown name,
    /// [`PaddockError::NotRunning`] when the init PID has exited, or
    /// the shell-entry error.
    pub fn shell(&self, name: &str) -> Result<()> {
        let container = self
            .running
            .iter()
            .find(|c| c.name.as_str() == name)
            .ok_or_else(|| PaddockError::NotFound {
                kind: "container",
                id: name.to_string(),
            })?;

        if !process::process_exists(container.namespace_pid) {
            return Err(PaddockError::NotRunning {
                name: name.to_string(),
                pid: container.namespace_pid,
            });
        }

        println!(
            "Entering container '{}' (PID: {})...",
            container.name, container.namespace_pid
        );
        enter::shell_into(container.namespace_pid)
    }

    /// Kills every tracked container and removes its directory.
    ///
    /// Invoked at manager exit; the registries are deliberately left
    /// untouched because the process is going away.
    pub fn cleanup_all(&self) {
        Self::cleanup_registry(&self.config, &self.running, "running");
        Self::cleanup_registry(&self.config, &self.starting, "starting");
    }

    fn cleanup_registry(config: &ManagerConfig, registry: &[Container], label: &str) {
        for container in registry {
            if container.namespace_pid > 0 {
                println!(
                    "Killing namespace process (PID {}) for container: {}",
                    container.namespace_pid, container.name
                );
                match process::kill_and_wait(container.namespace_pid, config.stop_timeout()) {
                    Ok(()) => {
                        println!("Confirmed process {} is terminated", container.namespace_pid);
                    }
                    Err(e) => eprintln!("Warning: {e}"),
                }
            }
            remove_location(container);
        }
        if !registry.is_empty() {
            println!("Cleaned-up all {label} containers.");
        }
    }

    fn dispose(&self, container: &Container) {
        if container.namespace_pid > 0 {
            if let Err(e) =
                process::kill_and_wait(container.namespace_pid, self.config.stop_timeout())
            {
                eprintln!("Warning: {e}");
            }
        }
        remove_location(container);
    }
}

fn remove_location(container: &Container) {
    if let Err(e) = std::fs::remove_dir_all(&container.location) {
        if e.kind() != std::io::ErrorKind::NotFound {
            eprintln!(
                "Warning: could not remove container directory '{}': {e}",
                container.location.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_manager(work_root: &Path) -> Manager {
        Manager::new(ManagerConfig {
            work_root: work_root.to_path_buf(),
            base_rootfs: PathBuf::from("/nonexistent"),
            stop_timeout_secs: 1,
        })
    }

    fn fake_container(work_root: &Path, name: &str, pid: i32) -> Container {
        let location = work_root.join(name);
        let rootfs_location = location.join("root_fs");
        std::fs::create_dir_all(&rootfs_location).expect("staging dirs");
        Container {
            name: ContainerName::new(name),
            location,
            rootfs_location,
            namespace_pid: pid,
        }
    }

    fn dead_pid() -> i32 {
        let mut child = std::process::Command::new("true")
            .spawn()
            .expect("spawn true");
        let pid = child.id() as i32;
        child.wait().expect("wait");
        pid
    }

    #[test]
    fn delete_removes_record_and_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        let container = fake_container(dir.path(), "container-aaaaaaa", 0);
        let location = container.location.clone();
        manager.running.push(container);

        assert_eq!(manager.delete("container-aaaaaaa"), DeleteOutcome::Deleted);
        assert!(manager.running.is_empty());
        assert!(!location.exists());
    }

    #[test]
    fn delete_twice_reports_not_found_second_time() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        manager
            .running
            .push(fake_container(dir.path(), "container-bbbbbbb", 0));

        assert_eq!(manager.delete("container-bbbbbbb"), DeleteOutcome::Deleted);
        assert_eq!(manager.delete("container-bbbbbbb"), DeleteOutcome::NotFound);
    }

    #[test]
    fn delete_unknown_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        manager
            .running
            .push(fake_container(dir.path(), "container-ccccccc", 0));

        assert_eq!(manager.delete("container-ZZZZZZZ"), DeleteOutcome::NotFound);
        assert_eq!(manager.running.len(), 1);
        assert!(manager.running[0].location.exists());
    }

    #[test]
    fn delete_searches_starting_after_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        manager
            .starting
            .push(fake_container(dir.path(), "container-ddddddd", 0));

        assert_eq!(manager.delete("container-ddddddd"), DeleteOutcome::Deleted);
        assert!(manager.starting.is_empty());
    }

    #[test]
    fn delete_with_dead_pid_still_removes_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        let container = fake_container(dir.path(), "container-eeeeeee", dead_pid());
        let location = container.location.clone();
        manager.running.push(container);

        assert_eq!(manager.delete("container-eeeeeee"), DeleteOutcome::Deleted);
        assert!(!location.exists());
    }

    #[test]
    fn list_reports_liveness_per_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        manager.running.push(fake_container(
            dir.path(),
            "container-fffffff",
            std::process::id() as i32,
        ));
        manager
            .running
            .push(fake_container(dir.path(), "container-ggggggg", dead_pid()));

        let listings = manager.list();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].status, ContainerStatus::Running);
        assert_eq!(listings[1].status, ContainerStatus::Stopped);
    }

    #[test]
    fn list_empty_registry_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = test_manager(dir.path());
        assert!(manager.list().is_empty());
    }

    #[test]
    fn cleanup_all_on_empty_registries_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = test_manager(dir.path());
        manager.cleanup_all();
    }

    #[test]
    fn cleanup_all_removes_directories_but_keeps_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        let a = fake_container(dir.path(), "container-hhhhhhh", 0);
        let b = fake_container(dir.path(), "container-iiiiiii", dead_pid());
        let (loc_a, loc_b) = (a.location.clone(), b.location.clone());
        manager.running.push(a);
        manager.starting.push(b);

        manager.cleanup_all();
        assert!(!loc_a.exists());
        assert!(!loc_b.exists());
        assert_eq!(manager.running.len(), 1);
        assert_eq!(manager.starting.len(), 1);
    }

    #[test]
    fn shell_unknown_name_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = test_manager(dir.path());
        let err = manager.shell("container-ZZZZZZZ").expect_err("unknown");
        assert!(matches!(err, PaddockError::NotFound { .. }));
    }

    #[test]
    fn shell_dead_pid_is_not_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = test_manager(dir.path());
        manager
            .running
            .push(fake_container(dir.path(), "container-jjjjjjj", dead_pid()));

        let err = manager.shell("container-jjjjjjj").expect_err("dead init");
        let msg = format!("{err}");
        assert!(msg.contains("is not running"));
        assert!(msg.contains("not found"));
    }
}
