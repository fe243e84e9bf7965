//! Capability registry
//!
//! Maps each entity type name to its resolved audit capability. Built once
//! from static [`EntityDescriptor`]s and read-only afterwards; every lookup is
//! a single hash-map access. Types that were never registered are not
//! audited.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::descriptor::{Entity, EntityDescriptor};
use crate::error::{AuditError, AuditResult};

/// Token written in place of sensitive values
pub const DEFAULT_REDACTION_TOKEN: &str = "****";

/// How a type-level sensitive marker is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityPolicy {
    /// Type-level sensitive types are not audited at all
    EntireTypeExclusion,
    /// Type-level sensitive types are audited with every field masked
    #[default]
    PerFieldMasking,
}

impl fmt::Display for SensitivityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityPolicy::EntireTypeExclusion => write!(f, "entire_type_exclusion"),
            SensitivityPolicy::PerFieldMasking => write!(f, "per_field_masking"),
        }
    }
}

impl FromStr for SensitivityPolicy {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "entire_type_exclusion" | "exclude" => Ok(SensitivityPolicy::EntireTypeExclusion),
            "per_field_masking" | "mask" => Ok(SensitivityPolicy::PerFieldMasking),
            _ => Err(AuditError::Config(format!(
                "Invalid sensitivity policy: {}",
                s
            ))),
        }
    }
}

/// Resolved audit capability of one entity type
#[derive(Debug, Clone)]
pub struct Capability {
    descriptor: EntityDescriptor,
    sensitive_fields: HashSet<&'static str>,
    audited: bool,
    mask_all: bool,
}

impl Capability {
    fn resolve(descriptor: EntityDescriptor, policy: SensitivityPolicy) -> Self {
        let sensitive_fields = descriptor
            .fields
            .iter()
            .filter(|f| f.sensitive)
            .map(|f| f.name)
            .collect();

        let excluded_as_sensitive =
            descriptor.type_sensitive && policy == SensitivityPolicy::EntireTypeExclusion;
        let audited = descriptor.auditable && !descriptor.not_auditable && !excluded_as_sensitive;
        let mask_all = descriptor.type_sensitive && policy == SensitivityPolicy::PerFieldMasking;

        Self {
            descriptor,
            sensitive_fields,
            audited,
            mask_all,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor.type_name
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    /// Whether mutations of this type produce audit entries
    pub fn is_audited(&self) -> bool {
        self.audited
    }

    pub fn id_field(&self) -> Option<&'static str> {
        self.descriptor.id_field
    }

    /// Fields compared by the diff engine, in declaration order
    ///
    /// The identifier is excluded; it is reported as the entry's entity id.
    pub fn diff_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        let id_field = self.descriptor.id_field;
        self.descriptor
            .fields
            .iter()
            .map(|f| f.name)
            .filter(move |name| Some(*name) != id_field)
    }

    /// Whether the value of `field` must be replaced by the redaction token
    pub fn masks(&self, field: &str) -> bool {
        self.mask_all || self.sensitive_fields.contains(field)
    }
}

/// Read-only map from entity type name to capability
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    entries: HashMap<&'static str, Capability>,
    policy: SensitivityPolicy,
    redaction_token: String,
}

impl CapabilityRegistry {
    /// Start building a registry under the given policy
    pub fn builder(policy: SensitivityPolicy) -> RegistryBuilder {
        RegistryBuilder {
            policy,
            redaction_token: DEFAULT_REDACTION_TOKEN.to_string(),
            descriptors: Vec::new(),
        }
    }

    pub fn policy(&self) -> SensitivityPolicy {
        self.policy
    }

    pub fn redaction_token(&self) -> &str {
        &self.redaction_token
    }

    pub fn capability(&self, type_name: &str) -> Option<&Capability> {
        self.entries.get(type_name)
    }

    /// Declared auditable flag; false for unknown types
    pub fn is_auditable(&self, type_name: &str) -> bool {
        self.capability(type_name)
            .is_some_and(|c| c.descriptor.auditable)
    }

    /// Declared not-auditable override; false for unknown types
    pub fn is_not_auditable_override(&self, type_name: &str) -> bool {
        self.capability(type_name)
            .is_some_and(|c| c.descriptor.not_auditable)
    }

    /// Field-level sensitive marker
    pub fn is_sensitive_field(&self, type_name: &str, field: &str) -> bool {
        self.capability(type_name)
            .is_some_and(|c| c.sensitive_fields.contains(field))
    }

    /// Type-level sensitive marker
    pub fn is_type_level_sensitive(&self, type_name: &str) -> bool {
        self.capability(type_name)
            .is_some_and(|c| c.descriptor.type_sensitive)
    }

    /// Final decision after override precedence and the sensitivity policy
    pub fn should_audit(&self, type_name: &str) -> bool {
        self.capability(type_name).is_some_and(Capability::is_audited)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects descriptors and validates them into a [`CapabilityRegistry`]
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    policy: SensitivityPolicy,
    redaction_token: String,
    descriptors: Vec<EntityDescriptor>,
}

impl RegistryBuilder {
    pub fn redaction_token(mut self, token: impl Into<String>) -> Self {
        self.redaction_token = token.into();
        self
    }

    pub fn register<T: Entity>(self) -> Self {
        self.register_descriptor(T::DESCRIPTOR)
    }

    pub fn register_descriptor(mut self, descriptor: EntityDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Validate every declaration and resolve the sensitivity policy
    pub fn build(self) -> AuditResult<CapabilityRegistry> {
        if self.redaction_token.is_empty() {
            return Err(AuditError::Config("Redaction token cannot be empty".into()));
        }

        let mut entries = HashMap::with_capacity(self.descriptors.len());
        for descriptor in self.descriptors {
            validate_descriptor(&descriptor)?;

            let capability = Capability::resolve(descriptor, self.policy);
            debug!(
                entity = descriptor.type_name,
                audited = capability.is_audited(),
                policy = %self.policy,
                "registered entity type"
            );

            if entries.insert(descriptor.type_name, capability).is_some() {
                return Err(AuditError::Config(format!(
                    "Entity type registered twice: {}",
                    descriptor.type_name
                )));
            }
        }

        Ok(CapabilityRegistry {
            entries,
            policy: self.policy,
            redaction_token: self.redaction_token,
        })
    }
}

fn validate_descriptor(descriptor: &EntityDescriptor) -> AuditResult<()> {
    if descriptor.type_name.trim().is_empty() {
        return Err(AuditError::Config("Entity type name cannot be empty".into()));
    }

    let mut seen = HashSet::new();
    for field in descriptor.fields {
        if !seen.insert(field.name) {
            return Err(AuditError::Config(format!(
                "Field {} declared twice on {}",
                field.name, descriptor.type_name
            )));
        }
    }

    if let Some(id_field) = descriptor.id_field {
        if !seen.contains(id_field) {
            return Err(AuditError::Config(format!(
                "Identifier field {} is not a declared field of {}",
                id_field, descriptor.type_name
            )));
        }
    }

    Ok(())
}
