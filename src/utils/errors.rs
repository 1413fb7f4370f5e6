//! Error handling for EventDesk
//!
//! This module defines the main error type used throughout the application
//! and maps every variant onto the small set of outcome kinds the front end
//! displays to the user.

use thiserror::Error;

/// Main error type for EventDesk
#[derive(Error, Debug)]
pub enum EventDeskError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No tickets remaining for ticket {ticket_id}")]
    CapacityExceeded { ticket_id: i64 },

    #[error("Attendee {attendee_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i64, attendee_id: i64 },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: i64 },

    #[error("Registration not found: {registration_id}")]
    RegistrationNotFound { registration_id: i64 },

    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: i64 },

    #[error("Event {event_id} is not open for registration (status {status})")]
    EventNotOpen { event_id: i64, status: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for EventDesk operations
pub type Result<T> = std::result::Result<T, EventDeskError>;

/// Outcome kinds surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CapacityExceeded,
    AlreadyRegistered,
    NotFound,
    StoreUnavailable,
    Rejected,
}

impl EventDeskError {
    /// Map the error onto the outcome kind shown to the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            EventDeskError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            EventDeskError::AlreadyRegistered { .. } => ErrorKind::AlreadyRegistered,
            EventDeskError::UserNotFound { .. }
            | EventDeskError::EventNotFound { .. }
            | EventDeskError::TicketNotFound { .. }
            | EventDeskError::RegistrationNotFound { .. }
            | EventDeskError::MessageNotFound { .. } => ErrorKind::NotFound,
            EventDeskError::StoreUnavailable(_)
            | EventDeskError::Migration(_)
            | EventDeskError::Io(_) => ErrorKind::StoreUnavailable,
            _ => ErrorKind::Rejected,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventDeskError::StoreUnavailable(_) => true,
            EventDeskError::Migration(_) => false,
            EventDeskError::Config(_) => false,
            EventDeskError::CapacityExceeded { .. } => false,
            EventDeskError::AlreadyRegistered { .. } => false,
            EventDeskError::UserNotFound { .. } => false,
            EventDeskError::EventNotFound { .. } => false,
            EventDeskError::TicketNotFound { .. } => false,
            EventDeskError::RegistrationNotFound { .. } => false,
            EventDeskError::MessageNotFound { .. } => false,
            EventDeskError::EventNotOpen { .. } => false,
            EventDeskError::InvalidStateTransition { .. } => false,
            EventDeskError::PermissionDenied(_) => false,
            EventDeskError::Authentication(_) => false,
            EventDeskError::InvalidInput(_) => false,
            EventDeskError::Serialization(_) => false,
            EventDeskError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventDeskError::StoreUnavailable(_) => ErrorSeverity::Critical,
            EventDeskError::Migration(_) => ErrorSeverity::Critical,
            EventDeskError::Config(_) => ErrorSeverity::Critical,
            EventDeskError::PermissionDenied(_) => ErrorSeverity::Warning,
            EventDeskError::Authentication(_) => ErrorSeverity::Warning,
            EventDeskError::CapacityExceeded { .. } => ErrorSeverity::Info,
            EventDeskError::AlreadyRegistered { .. } => ErrorSeverity::Info,
            EventDeskError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Check whether a database error is a violation of the named constraint
    pub fn is_constraint_violation(error: &sqlx::Error, constraint: &str) -> bool {
        match error {
            sqlx::Error::Database(db_error) => db_error.constraint() == Some(constraint),
            _ => false,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
