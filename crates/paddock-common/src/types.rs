//! Domain primitive types used across the Paddock workspace.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{NAME_PREFIX, NAME_SUFFIX_LEN};

/// Unique human identifier of a container, of the form `container-<7 alphanumerics>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerName(String);

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl ContainerName {
    /// Generates a fresh random container name.
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;

        let mut rng = rand::rng();
        let mut name = String::with_capacity(NAME_PREFIX.len() + NAME_SUFFIX_LEN);
        name.push_str(NAME_PREFIX);
        for _ in 0..NAME_SUFFIX_LEN {
            let idx = rng.random_range(0..SUFFIX_CHARSET.len());
            name.push(SUFFIX_CHARSET[idx] as char);
        }
        Self(name)
    }

    /// Wraps an existing name string without validation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns whether a string has the generated-name shape.
    #[must_use]
    pub fn is_well_formed(name: &str) -> bool {
        name.strip_prefix(NAME_PREFIX).is_some_and(|suffix| {
            suffix.len() == NAME_SUFFIX_LEN && suffix.chars().all(|c| c.is_ascii_alphanumeric())
        })
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record of a single container tracked by the manager.
///
/// Records are in-memory only; nothing survives a manager restart.
/// A record is never mutated after `namespace_pid` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    /// Unique human identifier.
    pub name: ContainerName,
    /// Per-container staging directory on the host (holds `hosts`,
    /// `hostname`, `resolv.conf`, and the rootfs subtree).
    pub location: PathBuf,
    /// Directory that becomes the container's `/`; nested under `location`.
    pub rootfs_location: PathBuf,
    /// Host-side PID of the init process; `0` means not yet launched.
    pub namespace_pid: i32,
}

/// Observed liveness of a container's init process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerStatus {
    /// The init PID is alive.
    Running,
    /// The init PID has exited.
    Stopped,
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_name_matches_expected_shape() {
        let name = ContainerName::generate();
        assert!(
            ContainerName::is_well_formed(name.as_str()),
            "bad name: {name}"
        );
    }

    #[test]
    fn generated_names_differ() {
        let a = ContainerName::generate();
        let b = ContainerName::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn well_formed_rejects_wrong_prefix_and_length() {
        assert!(ContainerName::is_well_formed("container-aB3xY9z"));
        assert!(!ContainerName::is_well_formed("box-aB3xY9z"));
        assert!(!ContainerName::is_well_formed("container-short"));
        assert!(!ContainerName::is_well_formed("container-toolong12"));
        assert!(!ContainerName::is_well_formed("container-ab!3456"));
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", ContainerStatus::Running), "running");
        assert_eq!(format!("{}", ContainerStatus::Stopped), "stopped");
    }
}
