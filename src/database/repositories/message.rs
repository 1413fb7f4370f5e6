//! Message repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::message::{Message, CreateMessageRequest};
use crate::utils::errors::EventDeskError;

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new message
    pub async fn create(&self, request: CreateMessageRequest) -> Result<Message, EventDeskError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (event_id, sender_id, title, content, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING message_id, event_id, sender_id, title, content, sent_at
            "#
        )
        .bind(request.event_id)
        .bind(request.sender_id)
        .bind(request.title)
        .bind(request.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Find message by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Message>, EventDeskError> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT message_id, event_id, sender_id, title, content, sent_at FROM messages WHERE message_id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    /// List messages of an event, newest first
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Message>, EventDeskError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT message_id, event_id, sender_id, title, content, sent_at FROM messages WHERE event_id = $1 ORDER BY sent_at DESC, message_id DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// List messages of every event the attendee holds an active registration for
    pub async fn list_for_attendee(&self, attendee_id: i64) -> Result<Vec<Message>, EventDeskError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT m.message_id, m.event_id, m.sender_id, m.title, m.content, m.sent_at
            FROM messages m
            INNER JOIN registrations r ON m.event_id = r.event_id
            WHERE r.attendee_id = $1 AND r.status IN ('PENDING', 'COMPLETED')
            ORDER BY m.sent_at DESC, m.message_id DESC
            "#
        )
        .bind(attendee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Delete message
    pub async fn delete(&self, id: i64) -> Result<(), EventDeskError> {
        let result = sqlx::query("DELETE FROM messages WHERE message_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EventDeskError::MessageNotFound { message_id: id });
        }

        Ok(())
    }
}
