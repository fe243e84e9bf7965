//! Field-level diff engine
//!
//! Compares the original and current snapshot of one entity in the type's
//! declared field order. Equality is always decided on the real values;
//! masking is applied afterwards, so an unchanged sensitive field never
//! appears and a changed one appears with both sides redacted.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::registry::Capability;
use super::value::{FieldSnapshot, FieldValue};
use crate::error::{AuditError, AuditResult};

/// Old and new value of a single changed field, possibly masked
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl ChangeRecord {
    pub fn new(field: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self {
            field: field.into(),
            old_value,
            new_value,
        }
    }

    /// A record whose values are both replaced by `token`
    pub fn masked(field: impl Into<String>, token: &str) -> Self {
        Self::new(
            field,
            Value::String(token.to_string()),
            Value::String(token.to_string()),
        )
    }
}

#[derive(Serialize)]
struct ValuePairRef<'a> {
    old_value: &'a Value,
    new_value: &'a Value,
}

#[derive(Deserialize)]
struct ValuePair {
    old_value: Value,
    new_value: Value,
}

/// Encoded as a one-entry object: `{"Field":{"old_value":..,"new_value":..}}`
impl Serialize for ChangeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.field,
            &ValuePairRef {
                old_value: &self.old_value,
                new_value: &self.new_value,
            },
        )?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChangeRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, ValuePair>::deserialize(deserializer)?;
        let mut entries = map.into_iter();
        match (entries.next(), entries.next()) {
            (Some((field, pair)), None) => Ok(ChangeRecord::new(field, pair.old_value, pair.new_value)),
            _ => Err(de::Error::custom(
                "a change record must name exactly one field",
            )),
        }
    }
}

/// Ordered list of change records for one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(Vec<ChangeRecord>);

impl ChangeSet {
    pub fn records(&self) -> &[ChangeRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&ChangeRecord> {
        self.0.iter().find(|r| r.field == field)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.field.as_str()).collect()
    }

    /// Compact JSON encoding used for stored change details
    pub fn to_json(&self) -> AuditResult<String> {
        serde_json::to_string(self)
            .map_err(|e| AuditError::Serialization(format!("Failed to encode change details: {}", e)))
    }

    pub fn from_json(json: &str) -> AuditResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AuditError::Json(format!("Failed to parse change details: {}", e)))
    }

    /// Short `Field: old -> new` summary for terminal output
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|r| format!("{}: {} -> {}", r.field, r.old_value, r.new_value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Vec<ChangeRecord>> for ChangeSet {
    fn from(records: Vec<ChangeRecord>) -> Self {
        Self(records)
    }
}

/// Compute the masked change list between two snapshots
///
/// A field missing from one snapshot is compared as `Null`; a field missing
/// from both is skipped, as is any field whose values are not comparable.
/// Fails only when a changed, unmasked value cannot be encoded.
pub fn diff_snapshots(
    capability: &Capability,
    original: &FieldSnapshot,
    current: &FieldSnapshot,
    redaction_token: &str,
) -> AuditResult<ChangeSet> {
    let null = FieldValue::Null;
    let mut records = Vec::new();

    for field in capability.diff_fields() {
        let (old, new) = match (original.get(field), current.get(field)) {
            (None, None) => continue,
            (old, new) => (old.unwrap_or(&null), new.unwrap_or(&null)),
        };

        match old.compare(new) {
            Some(true) => continue,
            Some(false) => {}
            None => {
                debug!(
                    entity = capability.type_name(),
                    field,
                    old_kind = old.kind(),
                    new_kind = new.kind(),
                    "skipping field that cannot be compared"
                );
                continue;
            }
        }

        let record = if capability.masks(field) {
            ChangeRecord::masked(field, redaction_token)
        } else {
            ChangeRecord::new(field, old.to_json()?, new.to_json()?)
        };
        records.push(record);
    }

    Ok(ChangeSet(records))
}
