//! Audit log CLI commands
//!
//! Read-only: the audit trail can be listed, inspected and exported, never
//! edited.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Subcommand;
use uuid::Uuid;

use crate::audit::Action;
use crate::display::{format_audit_details, format_audit_list};
use crate::error::{AuditError, AuditResult};
use crate::export::{export_audit_log, ExportFormat};
use crate::services::{AuditFilter, AuditLogService};
use crate::storage::Store;

/// Audit subcommands
#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// List audit entries, newest first
    List {
        /// Entity type (e.g. Book)
        #[arg(short, long)]
        entity: Option<String>,
        /// Entity ID (full UUID)
        #[arg(long)]
        entity_id: Option<Uuid>,
        /// created, modified or deleted
        #[arg(short, long)]
        action: Option<Action>,
        /// Only entries by this actor
        #[arg(long)]
        by: Option<String>,
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Show one audit entry with its field changes
    Show {
        /// Entry ID (full or short form)
        id: String,
    },
    /// Export the audit log
    Export {
        /// Output file (stdout when omitted)
        output: Option<PathBuf>,
        /// json, yaml or csv
        #[arg(short, long, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
}

/// Handle an audit command
pub fn handle_audit_command(store: &Store, cmd: AuditCommands) -> AuditResult<()> {
    let service = AuditLogService::new(store);

    match cmd {
        AuditCommands::List {
            entity,
            entity_id,
            action,
            by,
            limit,
        } => {
            let filter = AuditFilter {
                entity_name: entity,
                entity_id,
                action,
                changed_by: by,
                limit: Some(limit),
            };
            print!("{}", format_audit_list(&service.list(&filter)?));
        }

        AuditCommands::Show { id } => {
            let entry = service.show(&id)?;
            print!("{}", format_audit_details(&entry));
        }

        AuditCommands::Export { output, format } => {
            let mut entries = service.list(&AuditFilter::default())?;
            entries.reverse();

            match output {
                Some(path) => {
                    let file = File::create(&path).map_err(|e| {
                        AuditError::Export(format!("Failed to create {}: {}", path.display(), e))
                    })?;
                    let mut writer = BufWriter::new(file);
                    export_audit_log(&entries, format, &mut writer)?;
                    writer
                        .flush()
                        .map_err(|e| AuditError::Export(e.to_string()))?;
                    eprintln!(
                        "Exported {} audit entries to {} ({})",
                        entries.len(),
                        path.display(),
                        format
                    );
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    export_audit_log(&entries, format, &mut handle)?;
                    handle
                        .flush()
                        .map_err(|e| AuditError::Export(e.to_string()))?;
                }
            }
        }
    }

    Ok(())
}
