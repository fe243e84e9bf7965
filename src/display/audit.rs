//! Audit entry display formatting
//!
//! Table view for listings and a detail view showing every recorded field
//! change. Masked values are shown exactly as stored.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::AuditLogEntry;

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "When (UTC)")]
    when: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Entity ID")]
    entity_id: String,
    #[tabled(rename = "By")]
    changed_by: String,
    #[tabled(rename = "Fields")]
    fields: String,
}

impl From<&AuditLogEntry> for AuditRow {
    fn from(entry: &AuditLogEntry) -> Self {
        let fields = match entry.changes() {
            Ok(changes) if changes.is_empty() => "-".to_string(),
            Ok(changes) => changes.field_names().join(", "),
            Err(_) => "?".to_string(),
        };

        Self {
            id: entry.id.to_string(),
            when: entry.change_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: entry.action.to_string(),
            entity: entry.entity_name.clone(),
            entity_id: short_uuid(&entry.entity_id.to_string()),
            changed_by: entry.changed_by.clone(),
            fields,
        }
    }
}

fn short_uuid(uuid: &str) -> String {
    uuid.chars().take(8).collect()
}

/// Format audit entries as a table
pub fn format_audit_list(entries: &[AuditLogEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.\n".to_string();
    }

    let mut table = Table::new(entries.iter().map(AuditRow::from));
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format an entity's history, one line per entry with its changes below
pub fn format_audit_history(entries: &[AuditLogEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
        match entry.changes() {
            Ok(changes) if changes.is_empty() => {}
            Ok(changes) => output.push_str(&format!("    {}\n", changes.summary())),
            Err(_) => output.push_str(&format!("    {}\n", entry.details)),
        }
    }
    output
}

/// Format a single entry with its field changes
pub fn format_audit_details(entry: &AuditLogEntry) -> String {
    let mut output = String::new();

    output.push_str(&format!("Audit entry: {}\n", entry.id.as_uuid()));
    output.push_str(&format!("  Entity:     {} {}\n", entry.entity_name, entry.entity_id));
    output.push_str(&format!("  Action:     {}\n", entry.action));
    output.push_str(&format!("  Changed by: {}\n", entry.changed_by));
    output.push_str(&format!(
        "  When:       {}\n",
        entry.change_date.format("%Y-%m-%d %H:%M:%S%.3f UTC")
    ));
    output.push('\n');

    match entry.changes() {
        Ok(changes) if changes.is_empty() => output.push_str("  No field changes recorded.\n"),
        Ok(changes) => {
            let width = changes
                .records()
                .iter()
                .map(|r| r.field.len())
                .max()
                .unwrap_or(5)
                .max(5);

            output.push_str(&format!(
                "  {:<width$}  {}\n",
                "Field",
                "Old -> New",
                width = width
            ));
            for record in changes.records() {
                output.push_str(&format!(
                    "  {:<width$}  {} -> {}\n",
                    record.field,
                    record.old_value,
                    record.new_value,
                    width = width
                ));
            }
        }
        Err(_) => output.push_str(&format!("  Details: {}\n", entry.details)),
    }

    output
}
