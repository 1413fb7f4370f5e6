//! Message model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Announcement sent by an organizer to the attendees of one event
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub message_id: i64,
    pub event_id: i64,
    pub sender_id: i64,
    pub title: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub event_id: i64,
    pub sender_id: i64,
    pub title: String,
    pub content: String,
}
