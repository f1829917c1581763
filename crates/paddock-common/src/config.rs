//! Manager configuration model.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_ROOTFS, DEFAULT_STOP_TIMEOUT_SECS, DEFAULT_WORK_ROOT};
use crate::error::{PaddockError, Result};

/// Root configuration for the container manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Working-directory anchor holding one subdirectory per container.
    pub work_root: PathBuf,
    /// Prebuilt base rootfs copied into each new container.
    pub base_rootfs: PathBuf,
    /// Per-phase timeout for the TERM/KILL escalation, in seconds.
    pub stop_timeout_secs: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            work_root: PathBuf::from(DEFAULT_WORK_ROOT),
            base_rootfs: PathBuf::from(DEFAULT_BASE_ROOTFS),
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
        }
    }
}

impl ManagerConfig {
    /// Loads configuration from a JSON file.
    ///
    /// Returns the default configuration if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| PaddockError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Returns the TERM/KILL escalation timeout as a [`Duration`].
    #[must_use]
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}
