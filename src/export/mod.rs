//! Export module for change-audit
//!
//! Writes the audit log in one of three formats:
//! - CSV: one row per entry, spreadsheet-compatible
//! - JSON: machine-readable document with schema metadata
//! - YAML: the same document, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

pub use self::csv::export_audit_csv;
pub use self::json::{export_audit_json, AuditExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::export_audit_yaml;

use crate::audit::AuditLogEntry;
use crate::error::{AuditError, AuditResult};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "csv" => Ok(Self::Csv),
            _ => Err(AuditError::Export(format!("Unknown export format: {}", s))),
        }
    }
}

/// Write `entries` in the requested format
pub fn export_audit_log<W: Write>(
    entries: &[AuditLogEntry],
    format: ExportFormat,
    writer: &mut W,
) -> AuditResult<()> {
    match format {
        ExportFormat::Json => export_audit_json(entries, writer, true),
        ExportFormat::Yaml => export_audit_yaml(entries, writer),
        ExportFormat::Csv => export_audit_csv(entries, writer),
    }
}
