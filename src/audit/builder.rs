//! Audit record builder
//!
//! Turns one classified mutation and its change list into an
//! [`AuditLogEntry`]. Always produces an entry, even for an empty change
//! list. Writes nothing; the commit hook stages the result.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::classifier::ClassifiedMutation;
use super::diff::ChangeSet;
use super::entry::AuditLogEntry;
use crate::error::AuditResult;
use crate::models::AuditLogId;

/// Assemble a complete entry with a fresh id
///
/// Fails only if the change list cannot be serialized, which must abort the
/// surrounding commit.
pub fn build_entry(
    classified: &ClassifiedMutation<'_>,
    entity_id: Uuid,
    changes: &ChangeSet,
    actor: &str,
    timestamp: DateTime<Utc>,
) -> AuditResult<AuditLogEntry> {
    Ok(AuditLogEntry {
        id: AuditLogId::new(),
        entity_name: classified.capability.type_name().to_string(),
        entity_id,
        action: classified.mutation.action,
        changed_by: actor.to_string(),
        change_date: timestamp,
        details: changes.to_json()?,
    })
}
