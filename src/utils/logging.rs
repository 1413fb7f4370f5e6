//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the EventDesk application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{EventDeskError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer and must be held for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match &config.file_path {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "eventdesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| EventDeskError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log registration workflow actions
pub fn log_registration_action(registration_id: i64, action: &str, attendee_id: i64, remaining: i32) {
    info!(
        registration_id = registration_id,
        action = action,
        attendee_id = attendee_id,
        remaining = remaining,
        "Registration action performed"
    );
}

/// Log ticket ledger changes
pub fn log_ledger_change(ticket_id: i64, operation: &str, remaining: i32) {
    debug!(
        ticket_id = ticket_id,
        operation = operation,
        remaining = remaining,
        "Ticket ledger updated"
    );
}

/// Log a rejected ledger reservation
pub fn log_capacity_exceeded(ticket_id: i64, attendee_id: i64) {
    warn!(
        ticket_id = ticket_id,
        attendee_id = attendee_id,
        "Reservation rejected: ticket sold out"
    );
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
