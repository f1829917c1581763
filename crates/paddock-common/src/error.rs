//! Unified error types for the Paddock workspace.
//!
//! Every fallible operation in the workspace returns [`Result`]; the CLI
//! converts to `anyhow` at its outermost boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PaddockError {
    /// An I/O operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid or missing.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Creating the container directory or copying the base rootfs failed.
    #[error("failed to stage container filesystem: {message}")]
    Stage {
        /// Description of the failed staging step.
        message: String,
    },

    /// Copying the payload binary into the rootfs failed.
    #[error("failed to stage container binary: {message}")]
    BinaryStaging {
        /// Description of the failed copy or chmod.
        message: String,
    },

    /// An absolute path for the rootfs or container dir could not be determined.
    #[error("failed to resolve absolute path for {}: {message}", path.display())]
    PathResolution {
        /// The path that could not be resolved.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The container init process could not be started.
    #[error("failed to spawn container init: {message}")]
    Spawn {
        /// Description of the spawn failure.
        message: String,
    },

    /// A mount operation inside the container setup failed.
    #[error("mount failed at {}: {message}", target.display())]
    Mount {
        /// Mount target path.
        target: PathBuf,
        /// Underlying syscall error.
        message: String,
    },

    /// A non-mount step of the container setup failed.
    #[error("{message}")]
    Setup {
        /// Description of the failed step.
        message: String,
    },

    /// Replacing the init process with the payload failed.
    #[error("exec of {} failed: {message}", path.display())]
    Exec {
        /// Payload path that could not be executed.
        path: PathBuf,
        /// Underlying syscall error.
        message: String,
    },

    /// A process survived the full TERM/KILL escalation.
    #[error("process {pid} still exists after SIGKILL")]
    StillAliveAfterKill {
        /// PID that refused to die.
        pid: i32,
    },

    /// A lifecycle operation required a live init process.
    #[error("Container '{name}' is not running (PID {pid} not found)")]
    NotRunning {
        /// Name of the container.
        name: String,
        /// The dead init PID recorded for it.
        pid: i32,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PaddockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_message() {
        let err = PaddockError::Config {
            message: "CNTR_ROOTFS not set".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("CNTR_ROOTFS not set"));
    }

    #[test]
    fn not_found_error_display_kind_and_id() {
        let err = PaddockError::NotFound {
            kind: "container",
            id: "container-abc1234".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("container"));
        assert!(msg.contains("container-abc1234"));
    }

    #[test]
    fn still_alive_error_names_pid() {
        let err = PaddockError::StillAliveAfterKill { pid: 4242 };
        let msg = format!("{err}");
        assert!(msg.contains("4242"));
        assert!(msg.contains("SIGKILL"));
    }

    #[test]
    fn mount_error_names_target() {
        let err = PaddockError::Mount {
            target: "/tmp/rootfs/proc".into(),
            message: "EPERM".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("/tmp/rootfs/proc"));
    }
}
