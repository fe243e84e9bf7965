//! CSV export of the audit log
//!
//! One row per entry; the change details column carries the stored JSON
//! text unchanged.

use std::io::Write;

use crate::audit::AuditLogEntry;
use crate::error::{AuditError, AuditResult};

const HEADER: [&str; 7] = [
    "ID",
    "EntityName",
    "EntityId",
    "Action",
    "ChangedBy",
    "ChangeDate",
    "Details",
];

/// Write the audit log as CSV
pub fn export_audit_csv<W: Write>(entries: &[AuditLogEntry], writer: W) -> AuditResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| AuditError::Export(e.to_string());

    csv_writer.write_record(HEADER).map_err(csv_err)?;

    for entry in entries {
        csv_writer
            .write_record([
                entry.id.as_uuid().to_string(),
                entry.entity_name.clone(),
                entry.entity_id.to_string(),
                entry.action.to_string(),
                entry.changed_by.clone(),
                entry.change_date.to_rfc3339(),
                entry.details.clone(),
            ])
            .map_err(csv_err)?;
    }

    csv_writer
        .flush()
        .map_err(|e| AuditError::Export(e.to_string()))
}
