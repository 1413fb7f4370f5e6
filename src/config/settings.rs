//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub refresh: RefreshConfig,
    pub registration: RegistrationConfig,
    pub tickets: TicketsConfig,
    pub bootstrap_admin: BootstrapAdminConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily rolling log file; stdout only when unset
    pub file_path: Option<String>,
    pub json: bool,
}

/// Dashboard auto refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

/// Registration workflow policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
    /// Simulated payment: new registrations start COMPLETED instead of PENDING
    pub auto_complete_payment: bool,
}

/// Ticket types created alongside every new event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketsConfig {
    pub default_types: Vec<DefaultTicketType>,
}

/// First admin account, created at startup when no active admin exists
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Nothing is created while unset
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DefaultTicketType {
    pub ticket_type: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        Self::load(config::File::with_name("config").required(false))
    }

    /// Load settings from an explicit TOML file, still honouring the environment
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load(config::File::from(path).required(true))
    }

    fn load(file: config::File<config::FileSourceFile, config::FileFormat>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(config::Environment::with_prefix("EVENTDESK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Render the settings as a TOML document
    pub fn to_toml(&self) -> Result<String, crate::utils::errors::EventDeskError> {
        toml::to_string_pretty(self).map_err(|e| crate::utils::errors::EventDeskError::Config(e.to_string()))
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EventDeskError> {
        super::validation::validate_settings(self)
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            refresh: RefreshConfig::default(),
            registration: RegistrationConfig::default(),
            tickets: TicketsConfig::default(),
            bootstrap_admin: BootstrapAdminConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/eventdesk".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json: false,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self { auto_complete_payment: true }
    }
}

impl Default for BootstrapAdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            full_name: "Administrator".to_string(),
            password: None,
        }
    }
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            default_types: vec![
                DefaultTicketType {
                    ticket_type: "General Admission".to_string(),
                    price: Decimal::new(5000, 2),
                    quantity: 100,
                },
                DefaultTicketType {
                    ticket_type: "VIP".to_string(),
                    price: Decimal::new(15000, 2),
                    quantity: 20,
                },
            ],
        }
    }
}
