//! Audit entry data structures
//!
//! Defines the kinds of audited mutations and the immutable audit log entry
//! persisted alongside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::diff::ChangeSet;
use crate::error::{AuditError, AuditResult};
use crate::models::AuditLogId;

/// Kind of mutation recorded by an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Created,
    Modified,
    Deleted,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Created => write!(f, "Created"),
            Action::Modified => write!(f, "Modified"),
            Action::Deleted => write!(f, "Deleted"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" | "create" => Ok(Action::Created),
            "modified" | "modify" | "updated" | "update" => Ok(Action::Modified),
            "deleted" | "delete" => Ok(Action::Deleted),
            _ => Err(AuditError::Validation(format!("Unknown action: {}", s))),
        }
    }
}

/// A single audit log entry
///
/// Created only by the record builder at commit time and never updated or
/// deleted afterwards. `details` holds the change list as compact JSON text
/// so its key order is exactly what was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditLogId,

    /// Name of the entity type, e.g. `Book`
    pub entity_name: String,

    pub entity_id: Uuid,

    pub action: Action,

    /// Actor identity, `Anonymous` when none was established
    pub changed_by: String,

    /// When the commit was audited (UTC)
    pub change_date: DateTime<Utc>,

    /// Serialized change list: `[{"Field":{"old_value":..,"new_value":..}}]`
    pub details: String,
}

impl AuditLogEntry {
    /// Parse the stored change details
    pub fn changes(&self) -> AuditResult<ChangeSet> {
        ChangeSet::from_json(&self.details)
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        format!(
            "[{}] {} {} {} by {}",
            self.change_date.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.entity_name,
            self.entity_id,
            self.changed_by
        )
    }
}
