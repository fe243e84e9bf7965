//! Audit log queries
//!
//! Read-only access to the audit trail. Entries are never edited or removed
//! through this service or any other.

use uuid::Uuid;

use crate::audit::{Action, AuditLogEntry};
use crate::error::{AuditError, AuditResult};
use crate::models::AuditLogId;
use crate::storage::Store;

/// Criteria for listing audit entries; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Entity type name, matched case-insensitively
    pub entity_name: Option<String>,
    pub entity_id: Option<Uuid>,
    pub action: Option<Action>,
    pub changed_by: Option<String>,
    /// Keep only the newest `limit` matches
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.entity_name
            .as_ref()
            .map_or(true, |name| entry.entity_name.eq_ignore_ascii_case(name))
            && self.entity_id.map_or(true, |id| entry.entity_id == id)
            && self.action.map_or(true, |action| entry.action == action)
            && self
                .changed_by
                .as_ref()
                .map_or(true, |actor| &entry.changed_by == actor)
    }
}

/// Service for reading the audit trail
pub struct AuditLogService<'a> {
    store: &'a Store,
}

impl<'a> AuditLogService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Matching entries, newest first
    pub fn list(&self, filter: &AuditFilter) -> AuditResult<Vec<AuditLogEntry>> {
        let entries = self
            .store
            .audit_log()?
            .into_iter()
            .rev()
            .filter(|entry| filter.matches(entry));

        Ok(match filter.limit {
            Some(limit) => entries.take(limit).collect(),
            None => entries.collect(),
        })
    }

    /// Full history of one entity, oldest first
    pub fn history(&self, entity_id: Uuid) -> AuditResult<Vec<AuditLogEntry>> {
        let filter = AuditFilter {
            entity_id: Some(entity_id),
            ..Default::default()
        };
        let mut entries = self.list(&filter)?;
        entries.reverse();
        Ok(entries)
    }

    /// One entry by full id or short id (`log-1a2b3c4d`)
    pub fn show(&self, identifier: &str) -> AuditResult<AuditLogEntry> {
        if let Ok(id) = identifier.parse::<AuditLogId>() {
            return self
                .store
                .audit_entry(id)?
                .ok_or_else(|| AuditError::audit_entry_not_found(identifier));
        }

        let needle = identifier.trim().to_lowercase();
        let mut matches = self
            .store
            .audit_log()?
            .into_iter()
            .filter(|entry| entry.id.to_string() == needle);

        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(entry),
            (Some(_), Some(_)) => Err(AuditError::Validation(format!(
                "Ambiguous audit entry id: {}",
                identifier
            ))),
            (None, _) => Err(AuditError::audit_entry_not_found(identifier)),
        }
    }
}
