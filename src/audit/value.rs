//! Field values and snapshots
//!
//! A snapshot is the full set of field values of one entity at a point in
//! time. The diff engine compares two of them field by field.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::error::{AuditError, AuditResult};
use crate::models::Money;

/// A single field value as captured in a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Money(Money),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    /// A value the diff engine cannot compare; carries a description of its type
    Unsupported(String),
}

impl FieldValue {
    /// Structural equality, or `None` when the pair is not comparable
    ///
    /// Unsupported values and NaN floats are never comparable. Values of
    /// different variants compare unequal.
    pub fn compare(&self, other: &FieldValue) -> Option<bool> {
        match (self, other) {
            (FieldValue::Unsupported(_), _) | (_, FieldValue::Unsupported(_)) => None,
            (FieldValue::Float(a), FieldValue::Float(b)) if a.is_nan() || b.is_nan() => None,
            (a, b) => Some(a == b),
        }
    }

    /// Render the value for change details
    ///
    /// An absent value renders as JSON `null`, not as an empty string, so
    /// a cleared field stays distinguishable from one set to `""`.
    pub fn to_json(&self) -> AuditResult<Value> {
        Ok(match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
                AuditError::Serialization(format!("non-finite number {} cannot be encoded", f))
            })?,
            FieldValue::Money(m) => Value::String(m.to_string()),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            FieldValue::Timestamp(t) => {
                Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            FieldValue::Unsupported(kind) => {
                return Err(AuditError::Serialization(format!(
                    "unsupported value of type {} cannot be encoded",
                    kind
                )))
            }
        })
    }

    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Money(_) => "money",
            FieldValue::Text(_) => "text",
            FieldValue::Uuid(_) => "uuid",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Unsupported(kind) => kind.as_str(),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<Money> for FieldValue {
    fn from(v: Money) -> Self {
        FieldValue::Money(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        FieldValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// Field name to value mapping for one entity at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSnapshot {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
