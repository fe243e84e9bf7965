//! On-disk database layout
//!
//! One JSON document holds every entity table, the append-only audit log and
//! a version counter bumped by each commit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::audit::{AuditLogEntry, Entity};
use crate::error::{AuditError, AuditResult};

/// Rows of one table keyed by entity key
pub type Table = BTreeMap<Uuid, Value>;

/// Serializable contents of `store.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Number of commits applied so far
    #[serde(default)]
    pub version: u64,

    /// Entity tables keyed by table name
    #[serde(default)]
    pub tables: BTreeMap<String, Table>,

    /// Audit log entries in commit order
    #[serde(default)]
    pub audit_logs: Vec<AuditLogEntry>,
}

impl Database {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Stored row for `key`, decoded as `T`
    pub fn row<T: Entity>(&self, key: Uuid) -> AuditResult<Option<T>> {
        self.table(T::DESCRIPTOR.table)
            .and_then(|table| table.get(&key))
            .map(decode_row::<T>)
            .transpose()
    }

    /// All stored rows of `T`, in key order
    pub fn rows<T: Entity>(&self) -> AuditResult<Vec<T>> {
        self.table(T::DESCRIPTOR.table)
            .map(|table| table.values().map(decode_row::<T>).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    pub fn contains(&self, table: &str, key: Uuid) -> bool {
        self.table(table).is_some_and(|t| t.contains_key(&key))
    }

    pub fn put(&mut self, table: &str, key: Uuid, row: Value) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(key, row);
    }

    /// Remove a row; returns whether it existed
    pub fn delete(&mut self, table: &str, key: Uuid) -> bool {
        self.tables
            .get_mut(table)
            .is_some_and(|t| t.remove(&key).is_some())
    }
}

pub(crate) fn encode_row<T: Entity>(entity: &T) -> AuditResult<Value> {
    serde_json::to_value(entity).map_err(|e| {
        AuditError::Storage(format!(
            "Failed to encode {} row: {}",
            T::DESCRIPTOR.type_name,
            e
        ))
    })
}

pub(crate) fn decode_row<T: Entity>(row: &Value) -> AuditResult<T> {
    T::deserialize(row).map_err(|e| {
        AuditError::Storage(format!(
            "Corrupt {} row: {}",
            T::DESCRIPTOR.type_name,
            e
        ))
    })
}
