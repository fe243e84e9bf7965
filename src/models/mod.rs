//! Core data models for change-audit
//!
//! The persisted entity types, their typed ids and the money amount used for
//! prices. Each entity declares its audit capabilities through
//! [`Entity::DESCRIPTOR`](crate::audit::Entity).

pub mod book;
pub mod car;
pub mod ids;
pub mod money;

pub use book::{Book, BookValidationError};
pub use car::{Car, CarValidationError};
pub use ids::{AuditLogId, BookId, CarId};
pub use money::Money;

use crate::audit::CapabilityRegistry;
use crate::config::Settings;
use crate::error::AuditResult;

/// Registry of every persisted entity type under the configured policy
pub fn default_registry(settings: &Settings) -> AuditResult<CapabilityRegistry> {
    CapabilityRegistry::builder(settings.sensitivity_policy)
        .redaction_token(settings.redaction_token.clone())
        .register::<Book>()
        .register::<Car>()
        .build()
}
