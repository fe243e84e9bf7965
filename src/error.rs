//! Custom error types for change-audit
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for change-audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration-related errors, including invalid entity registrations
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Change details could not be encoded; aborts the commit
    #[error("Audit serialization error: {0}")]
    Serialization(String),

    /// The actor resolver failed
    #[error("Actor resolution error: {0}")]
    Actor(String),

    /// Another commit advanced the store since this session began
    #[error("Commit conflict: expected store version {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl AuditError {
    /// Create a "not found" error for books
    pub fn book_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Book",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for cars
    pub fn car_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Car",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for audit log entries
    pub fn audit_entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "AuditLog",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a commit conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for change-audit operations
pub type AuditResult<T> = Result<T, AuditError>;
