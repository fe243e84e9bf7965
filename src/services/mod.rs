//! Service layer for change-audit
//!
//! Validation and lookups on top of the store. Mutating calls commit through
//! the commit hook; the audit log service is read-only.

pub mod audit_log;
pub mod book;
pub mod car;

pub use audit_log::{AuditFilter, AuditLogService};
pub use book::{BookService, BookUpdate};
pub use car::{CarService, CarUpdate};
