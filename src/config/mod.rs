//! Configuration module for change-audit
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - Settings persistence (sensitivity policy, redaction token, logging)

pub mod paths;
pub mod settings;

pub use paths::AuditPaths;
pub use settings::Settings;
