//! Change-tracking session
//!
//! A session collects adds, updates and removes against a snapshot of the
//! store taken when it began. Nothing touches disk until it is committed
//! through the commit hook; dropping a session discards its changes.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::database::{decode_row, encode_row, Database};
use super::file_io::{lock_exclusive, read_json, write_json_atomic};
use crate::audit::{Action, AuditLogEntry, Entity, FieldSnapshot, PendingMutation, UnitOfWork};
use crate::error::{AuditError, AuditResult};

/// One tracked change, coalesced per entity
#[derive(Debug, Clone)]
struct TrackedChange {
    entity_type: &'static str,
    table: &'static str,
    key: Uuid,
    action: Action,
    original: FieldSnapshot,
    current: FieldSnapshot,
    /// Row to write; `None` for a deletion
    row: Option<Value>,
}

/// What a successful commit wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Store version after the commit
    pub version: u64,
    pub created: usize,
    pub modified: usize,
    pub deleted: usize,
    pub audit_entries: usize,
}

impl CommitSummary {
    pub fn is_empty(&self) -> bool {
        self.created + self.modified + self.deleted == 0
    }
}

/// Unit of work over the JSON store
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    snapshot: Database,
    changes: Vec<TrackedChange>,
    staged: Vec<AuditLogEntry>,
}

impl Session {
    pub(crate) fn new(path: PathBuf, snapshot: Database) -> Self {
        Self {
            path,
            snapshot,
            changes: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Whether anything is waiting to be committed
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    fn position(&self, table: &str, key: Uuid) -> Option<usize> {
        self.changes
            .iter()
            .position(|c| c.table == table && c.key == key)
    }

    /// Track a new entity
    pub fn add<T: Entity>(&mut self, entity: &T) -> AuditResult<()> {
        let descriptor = T::DESCRIPTOR;
        let key = entity.key();
        if key.is_nil() {
            return Err(AuditError::Validation(format!(
                "{} has no identifier",
                descriptor.type_name
            )));
        }

        let row = encode_row(entity)?;
        let current = entity.snapshot();

        if let Some(index) = self.position(descriptor.table, key) {
            let change = &mut self.changes[index];
            if change.action != Action::Deleted {
                return Err(duplicate::<T>(key));
            }
            // Removed then re-added in one session: a modification of the stored row
            change.action = Action::Modified;
            change.current = current;
            change.row = Some(row);
            return Ok(());
        }

        if self.snapshot.contains(descriptor.table, key) {
            return Err(duplicate::<T>(key));
        }

        debug!(entity = descriptor.type_name, %key, "tracking addition");
        self.changes.push(TrackedChange {
            entity_type: descriptor.type_name,
            table: descriptor.table,
            key,
            action: Action::Created,
            original: T::default().snapshot(),
            current,
            row: Some(row),
        });
        Ok(())
    }

    /// Track new values for an existing entity
    pub fn update<T: Entity>(&mut self, entity: &T) -> AuditResult<()> {
        let descriptor = T::DESCRIPTOR;
        let key = entity.key();
        let row = encode_row(entity)?;
        let current = entity.snapshot();

        if let Some(index) = self.position(descriptor.table, key) {
            let change = &mut self.changes[index];
            if change.action == Action::Deleted {
                return Err(not_found::<T>(key));
            }
            change.current = current;
            change.row = Some(row);
            return Ok(());
        }

        let stored: T = self
            .snapshot
            .row(key)?
            .ok_or_else(|| not_found::<T>(key))?;

        debug!(entity = descriptor.type_name, %key, "tracking modification");
        self.changes.push(TrackedChange {
            entity_type: descriptor.type_name,
            table: descriptor.table,
            key,
            action: Action::Modified,
            original: stored.snapshot(),
            current,
            row: Some(row),
        });
        Ok(())
    }

    /// Track the removal of an entity
    pub fn remove<T: Entity>(&mut self, key: Uuid) -> AuditResult<()> {
        let descriptor = T::DESCRIPTOR;

        if let Some(index) = self.position(descriptor.table, key) {
            match self.changes[index].action {
                Action::Created => {
                    // Never reached the store
                    self.changes.remove(index);
                }
                Action::Modified => {
                    let change = &mut self.changes[index];
                    change.action = Action::Deleted;
                    change.current = change.original.clone();
                    change.row = None;
                }
                Action::Deleted => return Err(not_found::<T>(key)),
            }
            return Ok(());
        }

        let stored: T = self
            .snapshot
            .row(key)?
            .ok_or_else(|| not_found::<T>(key))?;
        let values = stored.snapshot();

        debug!(entity = descriptor.type_name, %key, "tracking removal");
        self.changes.push(TrackedChange {
            entity_type: descriptor.type_name,
            table: descriptor.table,
            key,
            action: Action::Deleted,
            original: values.clone(),
            current: values,
            row: None,
        });
        Ok(())
    }

    /// Entity as seen by this session, pending changes included
    pub fn find<T: Entity>(&self, key: Uuid) -> AuditResult<Option<T>> {
        match self.position(T::DESCRIPTOR.table, key) {
            Some(index) => self.changes[index]
                .row
                .as_ref()
                .map(decode_row::<T>)
                .transpose(),
            None => self.snapshot.row(key),
        }
    }

    /// All entities of `T` as seen by this session
    pub fn list<T: Entity>(&self) -> AuditResult<Vec<T>> {
        let table = T::DESCRIPTOR.table;
        let mut rows = Vec::new();

        if let Some(stored) = self.snapshot.table(table) {
            for (key, row) in stored {
                match self.position(table, *key) {
                    Some(index) => {
                        if let Some(row) = &self.changes[index].row {
                            rows.push(decode_row::<T>(row)?);
                        }
                    }
                    None => rows.push(decode_row::<T>(row)?),
                }
            }
        }

        for change in &self.changes {
            if change.table == table && change.action == Action::Created {
                if let Some(row) = &change.row {
                    rows.push(decode_row::<T>(row)?);
                }
            }
        }

        Ok(rows)
    }
}

impl UnitOfWork for Session {
    type Committed = CommitSummary;

    fn pending_mutations(&self) -> AuditResult<Vec<PendingMutation>> {
        Ok(self
            .changes
            .iter()
            .map(|c| PendingMutation {
                entity_type: c.entity_type.to_string(),
                action: c.action,
                original: c.original.clone(),
                current: c.current.clone(),
            })
            .collect())
    }

    fn stage_audit_entries(&mut self, entries: Vec<AuditLogEntry>) -> AuditResult<()> {
        self.staged.extend(entries);
        Ok(())
    }

    fn commit(self) -> AuditResult<CommitSummary> {
        let mut summary = CommitSummary {
            version: self.snapshot.version,
            audit_entries: self.staged.len(),
            ..Default::default()
        };

        if self.changes.is_empty() && self.staged.is_empty() {
            debug!("nothing to commit");
            return Ok(summary);
        }

        // Held until the new file is in place, so no other commit can
        // slip in between the version check and the rename
        let _lock = lock_exclusive(&self.path)?;

        let mut db: Database = read_json(&self.path)?;
        if db.version != self.snapshot.version {
            return Err(AuditError::Conflict {
                expected: self.snapshot.version,
                found: db.version,
            });
        }

        for change in self.changes {
            match (change.action, change.row) {
                (Action::Deleted, _) | (_, None) => {
                    db.delete(change.table, change.key);
                    summary.deleted += 1;
                }
                (action, Some(row)) => {
                    db.put(change.table, change.key, row);
                    if action == Action::Created {
                        summary.created += 1;
                    } else {
                        summary.modified += 1;
                    }
                }
            }
        }

        db.audit_logs.extend(self.staged);
        db.version += 1;
        summary.version = db.version;

        write_json_atomic(&self.path, &db)?;

        info!(
            version = summary.version,
            created = summary.created,
            modified = summary.modified,
            deleted = summary.deleted,
            audit_entries = summary.audit_entries,
            "committed"
        );
        Ok(summary)
    }
}

fn not_found<T: Entity>(key: Uuid) -> AuditError {
    AuditError::NotFound {
        entity_type: T::DESCRIPTOR.type_name,
        identifier: key.to_string(),
    }
}

fn duplicate<T: Entity>(key: Uuid) -> AuditError {
    AuditError::Duplicate {
        entity_type: T::DESCRIPTOR.type_name,
        identifier: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::FieldValue;
    use crate::models::{Book, Car};
    use crate::storage::Store;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::at(temp_dir.path().join("store.json"));
        (temp_dir, store)
    }

    fn seed(store: &Store, book: &Book) {
        let mut session = store.begin().unwrap();
        session.add(book).unwrap();
        session.commit().unwrap();
    }

    #[test]
    fn test_add_tracks_creation_against_defaults() {
        let (_dir, store) = store();
        let mut session = store.begin().unwrap();
        let book = Book::new("Dune");
        session.add(&book).unwrap();

        let pending = session.pending_mutations().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].entity_type, "Book");
        assert_eq!(pending[0].action, Action::Created);
        assert_eq!(pending[0].original, Book::default().snapshot());
        assert_eq!(pending[0].current.get("Title"), Some(&FieldValue::from("Dune")));
    }

    #[test]
    fn test_add_then_update_stays_created() {
        let (_dir, store) = store();
        let mut session = store.begin().unwrap();
        let mut book = Book::new("Dune");
        session.add(&book).unwrap();
        book.pages = 412;
        session.update(&book).unwrap();

        let pending = session.pending_mutations().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, Action::Created);
        assert_eq!(pending[0].current.get("Pages"), Some(&412.into()));
    }

    #[test]
    fn test_add_then_remove_vanishes() {
        let (_dir, store) = store();
        let mut session = store.begin().unwrap();
        let book = Book::new("Dune");
        session.add(&book).unwrap();
        session.remove::<Book>(book.key()).unwrap();

        assert!(!session.has_changes());
        assert!(session.find::<Book>(book.key()).unwrap().is_none());
    }

    #[test]
    fn test_update_then_remove_is_deletion_of_stored_row() {
        let (_dir, store) = store();
        let mut book = Book::new("Dune");
        seed(&store, &book);

        let mut session = store.begin().unwrap();
        book.title = "Dune Messiah".into();
        session.update(&book).unwrap();
        session.remove::<Book>(book.key()).unwrap();

        let pending = session.pending_mutations().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, Action::Deleted);
        assert_eq!(pending[0].original.get("Title"), Some(&FieldValue::from("Dune")));
        assert_eq!(pending[0].original, pending[0].current);
    }

    #[test]
    fn test_remove_then_add_is_modification() {
        let (_dir, store) = store();
        let mut book = Book::new("Dune");
        seed(&store, &book);

        let mut session = store.begin().unwrap();
        session.remove::<Book>(book.key()).unwrap();
        book.edition = "2nd".into();
        session.add(&book).unwrap();

        let pending = session.pending_mutations().unwrap();
        assert_eq!(pending[0].action, Action::Modified);
        assert_eq!(pending[0].current.get("Edition"), Some(&FieldValue::from("2nd")));
    }

    #[test]
    fn test_duplicate_and_missing() {
        let (_dir, store) = store();
        let book = Book::new("Dune");
        seed(&store, &book);

        let mut session = store.begin().unwrap();
        assert!(matches!(
            session.add(&book),
            Err(AuditError::Duplicate { .. })
        ));
        let ghost = Book::new("Ghost");
        assert!(session.update(&ghost).unwrap_err().is_not_found());
        assert!(session.remove::<Book>(ghost.key()).unwrap_err().is_not_found());
        assert!(session.add(&Book::default()).is_err());
    }

    #[test]
    fn test_commit_writes_rows_and_bumps_version() {
        let (_dir, store) = store();
        let mut session = store.begin().unwrap();
        session.add(&Book::new("Dune")).unwrap();
        session.add(&Car::new("Volvo", "240")).unwrap();

        let summary = session.commit().unwrap();
        assert_eq!(summary.version, 1);
        assert_eq!(summary.created, 2);
        assert_eq!(store.list::<Book>().unwrap().len(), 1);
        assert_eq!(store.list::<Car>().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_commit_writes_nothing() {
        let (_dir, store) = store();
        let summary = store.begin().unwrap().commit().unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.version, 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_stale_session_conflicts() {
        let (_dir, store) = store();
        let mut stale = store.begin().unwrap();
        stale.add(&Book::new("Emma")).unwrap();

        seed(&store, &Book::new("Dune"));

        let err = stale.commit().unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.list::<Book>().unwrap().len(), 1);
    }

    #[test]
    fn test_dropped_session_discards_changes() {
        let (_dir, store) = store();
        {
            let mut session = store.begin().unwrap();
            session.add(&Book::new("Dune")).unwrap();
        }
        assert!(store.list::<Book>().unwrap().is_empty());
    }

    #[test]
    fn test_list_merges_pending_changes() {
        let (_dir, store) = store();
        let kept = Book::new("Dune");
        let removed = Book::new("Emma");
        seed(&store, &kept);
        seed(&store, &removed);

        let mut session = store.begin().unwrap();
        session.remove::<Book>(removed.key()).unwrap();
        session.add(&Book::new("Ulysses")).unwrap();

        let mut titles: Vec<_> = session
            .list::<Book>()
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["Dune", "Ulysses"]);
    }
}
