//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

/// Event lifecycle status
///
/// Events start `Pending`; an admin approves or rejects them, and the owning
/// organizer may cancel (soft delete) from any status except `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl EventStatus {
    pub const ALL: [EventStatus; 4] = [
        EventStatus::Pending,
        EventStatus::Approved,
        EventStatus::Rejected,
        EventStatus::Cancelled,
    ];

    pub fn can_transition_to(self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Pending, EventStatus::Approved)
                | (EventStatus::Pending, EventStatus::Rejected)
                | (EventStatus::Pending, EventStatus::Cancelled)
                | (EventStatus::Approved, EventStatus::Cancelled)
                | (EventStatus::Rejected, EventStatus::Cancelled)
        )
    }

    /// Attendees only see and register for approved events
    pub fn is_open_for_registration(self) -> bool {
        self == EventStatus::Approved
    }

    /// Organizers may edit details until the event is approved
    pub fn is_editable(self) -> bool {
        matches!(self, EventStatus::Pending | EventStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Pending => "PENDING",
            EventStatus::Approved => "APPROVED",
            EventStatus::Rejected => "REJECTED",
            EventStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub event_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub venue: String,
    pub organizer_id: i64,
    pub status: EventStatus,
    pub max_attendees: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub venue: String,
    pub organizer_id: i64,
    pub max_attendees: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub venue: Option<String>,
    pub max_attendees: Option<i32>,
}
