//! Path management for change-audit
//!
//! ## Path Resolution Order
//!
//! 1. `CHANGE_AUDIT_DATA_DIR` environment variable (if set)
//! 2. The platform configuration directory from `directories::ProjectDirs`
//!    (e.g. `~/.config/change-audit` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::AuditError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "CHANGE_AUDIT_DATA_DIR";

/// Manages all paths used by change-audit
#[derive(Debug, Clone)]
pub struct AuditPaths {
    /// Base directory for all change-audit data
    base_dir: PathBuf,
}

impl AuditPaths {
    /// Create a new AuditPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and the
    /// override variable is not set.
    pub fn new() -> Result<Self, AuditError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create AuditPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the database file holding entity tables and the audit log
    pub fn store_file(&self) -> PathBuf {
        self.data_dir().join("store.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), AuditError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| AuditError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| AuditError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, AuditError> {
    ProjectDirs::from("", "", "change-audit")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| AuditError::Config("Could not determine a home directory".into()))
}
