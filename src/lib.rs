//! EventDesk
//!
//! Back end of an event-management application: users and roles, the event
//! approval lifecycle, ticket types with transactional inventory accounting,
//! registrations, organizer announcements and per-role dashboards.

#![allow(non_snake_case)]

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventDeskError, ErrorKind, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::{RegistrationWorkflow, TicketLedger};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
