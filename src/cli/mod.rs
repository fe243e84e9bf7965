//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer.

pub mod audit;
pub mod book;
pub mod car;
pub mod config;

pub use audit::{handle_audit_command, AuditCommands};
pub use book::{handle_book_command, BookCommands};
pub use car::{handle_car_command, CarCommands};
pub use config::{handle_config_command, ConfigCommands};
