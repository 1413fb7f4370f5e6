//! Registration model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Registration payment lifecycle
///
/// ```text
/// PENDING -> COMPLETED -> CANCELLED
///    \
///     -> FAILED
/// ```
///
/// `Pending` and `Completed` registrations are active and hold one unit of
/// their ticket's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 4] = [
        RegistrationStatus::Pending,
        RegistrationStatus::Completed,
        RegistrationStatus::Failed,
        RegistrationStatus::Cancelled,
    ];

    pub fn can_transition_to(self, next: RegistrationStatus) -> bool {
        matches!(
            (self, next),
            (RegistrationStatus::Pending, RegistrationStatus::Completed)
                | (RegistrationStatus::Pending, RegistrationStatus::Failed)
                | (RegistrationStatus::Completed, RegistrationStatus::Cancelled)
        )
    }

    pub fn is_active(self) -> bool {
        matches!(self, RegistrationStatus::Pending | RegistrationStatus::Completed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RegistrationStatus::Failed | RegistrationStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Completed => "COMPLETED",
            RegistrationStatus::Failed => "FAILED",
            RegistrationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub registration_id: i64,
    pub event_id: i64,
    pub attendee_id: i64,
    pub ticket_id: i64,
    pub payment_amount: Decimal,
    pub status: RegistrationStatus,
    pub registration_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub event_id: i64,
    pub attendee_id: i64,
    pub ticket_id: i64,
    pub amount: Decimal,
}

/// Outcome of a workflow operation, with the ticket's post-operation remaining count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub registration: Registration,
    pub remaining: i32,
}
