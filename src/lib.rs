//! change-audit - data-change audit trail
//!
//! Records every create, modify and delete of an auditable entity as an
//! immutable audit log entry, written in the same atomic commit as the change.
//! Entries carry a field-level diff with sensitive values masked.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `audit`: capability registry, classifier, diff engine, record builder
//!   and the commit hook
//! - `config`: configuration and path management
//! - `error`: custom error types
//! - `logging`: tracing subscriber setup
//! - `models`: persisted entities (books, cars) and typed ids
//! - `storage`: JSON store with change-tracking sessions
//! - `services`: business logic layer
//! - `cli`, `display`, `export`: the command-line surface
//!
//! # Example
//!
//! ```rust,ignore
//! use change_audit::audit::{CommitHook, FixedActor, SystemClock};
//! use change_audit::config::{AuditPaths, Settings};
//! use change_audit::models::{default_registry, Book};
//! use change_audit::services::BookService;
//! use change_audit::storage::Store;
//!
//! let paths = AuditPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let registry = default_registry(&settings)?;
//! let store = Store::open(&paths)?;
//! let actor = FixedActor::new("alice");
//! let hook = CommitHook::new(&registry, &actor, &SystemClock);
//!
//! BookService::new(&store, &hook).create(Book::new("Dune"))?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{AuditError, AuditResult};
