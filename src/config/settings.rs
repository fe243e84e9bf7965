//! User settings for change-audit
//!
//! Holds the sensitivity policy, the redaction token, the fallback actor
//! and logging preferences.

use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::audit::{SensitivityPolicy, DEFAULT_REDACTION_TOKEN};
use crate::error::AuditError;
use crate::logging::LogSettings;

/// User settings for change-audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// How type-level sensitive entities are treated
    #[serde(default)]
    pub sensitivity_policy: SensitivityPolicy,

    /// Token written in place of sensitive values
    #[serde(default = "default_redaction_token")]
    pub redaction_token: String,

    /// Actor recorded when neither `--actor` nor the environment supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_actor: Option<String>,

    /// Logging preferences
    #[serde(default)]
    pub log: LogSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_redaction_token() -> String {
    DEFAULT_REDACTION_TOKEN.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            sensitivity_policy: SensitivityPolicy::default(),
            redaction_token: default_redaction_token(),
            default_actor: None,
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &AuditPaths) -> Result<Self, AuditError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| AuditError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| AuditError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AuditError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| AuditError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
