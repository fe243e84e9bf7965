//! Static entity declarations
//!
//! Every persisted type describes itself once with an [`EntityDescriptor`]:
//! its audit capability flags, its identifier field and its fields in
//! declaration order. The capability registry is built from these
//! descriptors at startup; nothing is discovered at mutation time.

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::value::FieldSnapshot;

/// One declared field of an entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    /// Value is replaced by the redaction token in change details
    pub sensitive: bool,
}

impl FieldDef {
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            sensitive: false,
        }
    }

    pub const fn sensitive(name: &'static str) -> Self {
        Self {
            name,
            sensitive: true,
        }
    }
}

/// Type-level audit metadata
///
/// `not_auditable` overrides `auditable`: a type that sets both is never
/// audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub type_name: &'static str,
    pub table: &'static str,
    pub id_field: Option<&'static str>,
    pub auditable: bool,
    pub not_auditable: bool,
    pub type_sensitive: bool,
    pub fields: &'static [FieldDef],
}

impl EntityDescriptor {
    /// A descriptor with no capabilities and no fields
    pub const fn new(type_name: &'static str, table: &'static str) -> Self {
        Self {
            type_name,
            table,
            id_field: None,
            auditable: false,
            not_auditable: false,
            type_sensitive: false,
            fields: &[],
        }
    }

    pub const fn auditable(mut self) -> Self {
        self.auditable = true;
        self
    }

    pub const fn not_auditable(mut self) -> Self {
        self.not_auditable = true;
        self
    }

    pub const fn type_sensitive(mut self) -> Self {
        self.type_sensitive = true;
        self
    }

    pub const fn id_field(mut self, name: &'static str) -> Self {
        self.id_field = Some(name);
        self
    }

    pub const fn fields(mut self, fields: &'static [FieldDef]) -> Self {
        self.fields = fields;
        self
    }
}

/// A persisted business object
///
/// `Default` is the type's default-initialized state, which serves as the
/// original snapshot of a creation.
pub trait Entity: Default + Clone + Serialize + DeserializeOwned {
    const DESCRIPTOR: EntityDescriptor;

    /// Storage key of this instance
    fn key(&self) -> Uuid;

    /// Current values of every declared field
    fn snapshot(&self) -> FieldSnapshot;
}
