//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_username};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_refresh_config(&settings.refresh)?;
    validate_tickets_config(&settings.tickets)?;
    validate_bootstrap_admin_config(&settings.bootstrap_admin)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventDeskError::Config(
            "Database URL is required".to_string()
        ));
    }

    if !(config.url.starts_with("postgres://") || config.url.starts_with("postgresql://")) {
        return Err(EventDeskError::Config(
            "Database URL must use the postgres:// or postgresql:// scheme".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EventDeskError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventDeskError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(EventDeskError::Config(
            "Acquire timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventDeskError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventDeskError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if matches!(config.file_path.as_deref(), Some("")) {
        return Err(EventDeskError::Config(
            "Log file path cannot be empty when set".to_string()
        ));
    }

    Ok(())
}

/// Validate dashboard refresh configuration
fn validate_refresh_config(config: &super::RefreshConfig) -> Result<()> {
    if config.interval_seconds == 0 {
        return Err(EventDeskError::Config(
            "Refresh interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate default ticket types
fn validate_tickets_config(config: &super::TicketsConfig) -> Result<()> {
    let mut seen = HashSet::new();

    for ticket in &config.default_types {
        if ticket.ticket_type.trim().is_empty() {
            return Err(EventDeskError::Config(
                "Default ticket type label cannot be empty".to_string()
            ));
        }

        if !seen.insert(ticket.ticket_type.to_lowercase()) {
            return Err(EventDeskError::Config(
                format!("Duplicate default ticket type: {}", ticket.ticket_type)
            ));
        }

        if ticket.price < Decimal::ZERO {
            return Err(EventDeskError::Config(
                format!("Default ticket type {} has a negative price", ticket.ticket_type)
            ));
        }

        if ticket.quantity <= 0 {
            return Err(EventDeskError::Config(
                format!("Default ticket type {} must have a positive quantity", ticket.ticket_type)
            ));
        }
    }

    Ok(())
}

/// Validate the bootstrap admin account; only checked when a password is set
fn validate_bootstrap_admin_config(config: &super::BootstrapAdminConfig) -> Result<()> {
    let Some(password) = config.password.as_deref() else {
        return Ok(());
    };

    if password.chars().count() < 6 {
        return Err(EventDeskError::Config(
            "Bootstrap admin password must be at least 6 characters".to_string()
        ));
    }

    if !is_valid_username(&config.username) {
        return Err(EventDeskError::Config(
            format!("Invalid bootstrap admin username: {}", config.username)
        ));
    }

    if !is_valid_email(&config.email) {
        return Err(EventDeskError::Config(
            format!("Invalid bootstrap admin email: {}", config.email)
        ));
    }

    if config.full_name.trim().is_empty() {
        return Err(EventDeskError::Config(
            "Bootstrap admin full name is required".to_string()
        ));
    }

    Ok(())
}
