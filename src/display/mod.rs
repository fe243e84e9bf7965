//! Display formatting for terminal output
//!
//! Tables for listings and aligned detail views for single records.

pub mod audit;
pub mod book;
pub mod car;

pub use audit::{format_audit_details, format_audit_history, format_audit_list};
pub use book::{format_book_details, format_book_list};
pub use car::{format_car_details, format_car_list};
