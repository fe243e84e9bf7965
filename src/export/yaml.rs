//! YAML export of the audit log
//!
//! Same document as the JSON export, for human review.

use std::io::Write;

use crate::audit::AuditLogEntry;
use crate::error::{AuditError, AuditResult};
use crate::export::json::AuditExport;

/// Write the audit log as YAML with a short header comment
pub fn export_audit_yaml<W: Write>(entries: &[AuditLogEntry], writer: &mut W) -> AuditResult<()> {
    let export = AuditExport::new(entries.to_vec());
    let io_err = |e: std::io::Error| AuditError::Export(e.to_string());

    writeln!(writer, "# change-audit log export").map_err(io_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(io_err)?;
    writeln!(writer, "# Entries: {}", export.entry_count).map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| AuditError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Action;
    use crate::models::AuditLogId;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_yaml_export_round_trip() {
        let entries = vec![AuditLogEntry {
            id: AuditLogId::new(),
            entity_name: "Book".into(),
            entity_id: Uuid::new_v4(),
            action: Action::Deleted,
            changed_by: "Anonymous".into(),
            change_date: Utc::now(),
            details: "[]".into(),
        }];

        let mut buffer = Vec::new();
        export_audit_yaml(&entries, &mut buffer).unwrap();
        let yaml = String::from_utf8(buffer).unwrap();

        assert!(yaml.starts_with("# change-audit log export"));
        assert!(yaml.contains("entity_name: Book"));

        let export: AuditExport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(export.entry_count, 1);
        assert_eq!(export.entries, entries);
    }
}
