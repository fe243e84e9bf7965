//! Commit hook
//!
//! The single orchestration point of an audited commit: read the pending
//! batch from the unit of work, classify, diff and build entries, stage them
//! in the same unit of work and commit it exactly once.
//!
//! If auditing fails the unit of work is dropped uncommitted, so neither the
//! domain mutations nor any audit entry are persisted.

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::actor::{resolve_actor, ActorResolver, Clock};
use super::builder::build_entry;
use super::classifier::{classify, ClassifiedMutation, PendingMutation};
use super::diff::diff_snapshots;
use super::entry::AuditLogEntry;
use super::registry::CapabilityRegistry;
use super::value::FieldValue;
use crate::error::AuditResult;

/// The persistence side of an audited commit
///
/// `commit` consumes the unit of work, so it runs at most once per hook
/// call. Dropping a unit of work without committing discards its changes.
pub trait UnitOfWork {
    /// Whatever the underlying commit reports back
    type Committed;

    /// Pending mutations, in the order they were made
    fn pending_mutations(&self) -> AuditResult<Vec<PendingMutation>>;

    /// Add audit entries to the same write batch as the mutations
    fn stage_audit_entries(&mut self, entries: Vec<AuditLogEntry>) -> AuditResult<()>;

    /// Persist mutations and staged entries atomically
    fn commit(self) -> AuditResult<Self::Committed>;
}

/// Turns pending mutations into audit entries at commit time
///
/// Holds no state between calls; the actor and the timestamp are resolved
/// once per commit.
pub struct CommitHook<'a> {
    registry: &'a CapabilityRegistry,
    actor: &'a dyn ActorResolver,
    clock: &'a dyn Clock,
}

impl<'a> CommitHook<'a> {
    pub fn new(
        registry: &'a CapabilityRegistry,
        actor: &'a dyn ActorResolver,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            registry,
            actor,
            clock,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        self.registry
    }

    /// Build the audit entries for a batch without touching storage
    pub fn audit_batch(&self, batch: &[PendingMutation]) -> AuditResult<Vec<AuditLogEntry>> {
        if batch.is_empty() {
            debug!("empty mutation batch; nothing to audit");
            return Ok(Vec::new());
        }

        let classified = classify(self.registry, batch);
        debug!(
            pending = batch.len(),
            audited = classified.len(),
            "classified mutation batch"
        );
        if classified.is_empty() {
            return Ok(Vec::new());
        }

        let actor = resolve_actor(self.actor);
        let timestamp = self.clock.now();
        let mut entries = Vec::with_capacity(classified.len());

        for item in &classified {
            let Some(entity_id) = entity_id(item) else {
                warn!(
                    entity = item.capability.type_name(),
                    action = %item.mutation.action,
                    "entity has no recognizable identifier; audit entry skipped"
                );
                continue;
            };

            let changes = diff_snapshots(
                item.capability,
                &item.mutation.original,
                &item.mutation.current,
                self.registry.redaction_token(),
            )?;
            let entry = build_entry(item, entity_id, &changes, &actor, timestamp)?;

            info!(
                entity = %entry.entity_name,
                entity_id = %entry.entity_id,
                action = %entry.action,
                changed_fields = changes.len(),
                "adding audit entry"
            );
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Audit the unit of work's pending batch and commit it once
    pub fn commit<U: UnitOfWork>(&self, mut unit: U) -> AuditResult<U::Committed> {
        let batch = unit.pending_mutations()?;
        let span = info_span!("audited_commit", mutations = batch.len());
        let _guard = span.enter();

        let entries = self.audit_batch(&batch)?;
        if !entries.is_empty() {
            unit.stage_audit_entries(entries)?;
        }
        unit.commit()
    }
}

/// Identifier from the current snapshot, falling back to the original
///
/// Only a non-nil UUID counts as recognizable.
fn entity_id(item: &ClassifiedMutation<'_>) -> Option<Uuid> {
    let id_field = item.capability.id_field()?;
    let value = item
        .mutation
        .current
        .get(id_field)
        .or_else(|| item.mutation.original.get(id_field))?;

    match value {
        FieldValue::Uuid(id) if !id.is_nil() => Some(*id),
        _ => None,
    }
}
