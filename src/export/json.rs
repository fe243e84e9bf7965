//! JSON export of the audit log
//!
//! Wraps the entries with schema and provenance metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::audit::AuditLogEntry;
use crate::error::{AuditError, AuditResult};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Audit log export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditExport {
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Version of change-audit that wrote the export
    pub app_version: String,

    pub entry_count: usize,

    /// Entries in the order given to the exporter
    pub entries: Vec<AuditLogEntry>,
}

impl AuditExport {
    pub fn new(entries: Vec<AuditLogEntry>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            entry_count: entries.len(),
            entries,
        }
    }
}

/// Write the audit log as JSON
pub fn export_audit_json<W: Write>(
    entries: &[AuditLogEntry],
    writer: &mut W,
    pretty: bool,
) -> AuditResult<()> {
    let export = AuditExport::new(entries.to_vec());

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| AuditError::Export(e.to_string()))
}
