//! Storage layer for change-audit
//!
//! A single JSON document (`data/store.json`) holds every entity table and
//! the audit log. Writes go through a [`Session`] committed by the commit
//! hook, so domain rows and their audit entries are replaced together.

pub mod database;
pub mod file_io;
pub mod session;

pub use database::Database;
pub use file_io::{lock_exclusive, read_json, write_json_atomic, FileLock};
pub use session::{CommitSummary, Session};

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::audit::{AuditLogEntry, Entity};
use crate::config::paths::AuditPaths;
use crate::error::AuditResult;
use crate::models::AuditLogId;

/// Handle on the store file
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open the store under the configured data directory
    pub fn open(paths: &AuditPaths) -> AuditResult<Self> {
        paths.ensure_directories()?;
        Ok(Self::at(paths.store_file()))
    }

    /// Store backed by an explicit file (useful for testing)
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole database; a missing file is an empty database
    pub fn load(&self) -> AuditResult<Database> {
        read_json(&self.path)
    }

    /// Start a session against the current contents
    pub fn begin(&self) -> AuditResult<Session> {
        Ok(Session::new(self.path.clone(), self.load()?))
    }

    /// Every audit entry, oldest first
    pub fn audit_log(&self) -> AuditResult<Vec<AuditLogEntry>> {
        Ok(self.load()?.audit_logs)
    }

    pub fn audit_entry(&self, id: AuditLogId) -> AuditResult<Option<AuditLogEntry>> {
        Ok(self
            .load()?
            .audit_logs
            .into_iter()
            .find(|entry| entry.id == id))
    }

    pub fn list<T: Entity>(&self) -> AuditResult<Vec<T>> {
        self.load()?.rows()
    }

    pub fn get<T: Entity>(&self, key: Uuid) -> AuditResult<Option<T>> {
        self.load()?.row(key)
    }
}
