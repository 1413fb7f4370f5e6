//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format a money amount with two decimal places
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Validate a login name: 3 to 64 characters of letters, digits, dot, dash or underscore
pub fn is_valid_username(username: &str) -> bool {
    static USERNAME: OnceLock<Option<Regex>> = OnceLock::new();
    USERNAME
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]{3,64}$").ok())
        .as_ref()
        .map(|re| re.is_match(username))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        let timestamp = DateTime::parse_from_rfc3339("2024-06-01T18:30:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(format_timestamp(timestamp), "2024-06-01 18:30:00 UTC");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(5000, 2)), "$50.00");
        assert_eq!(format_money(Decimal::new(15, 0)), "$15.00");
        assert_eq!(format_money(Decimal::new(12345, 3)), "$12.35");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a rather long event title", 10), "a rathe...");
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("organizer@example.com"));
        assert!(!is_valid_email("organizer@example"));
        assert!(!is_valid_email("not an email"));
    }

    #[test]
    fn test_username_validation() {
        assert!(is_valid_username("admin"));
        assert!(is_valid_username("jane.doe-01"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
    }
}
