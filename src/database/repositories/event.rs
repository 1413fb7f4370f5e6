//! Event repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::{NaiveDate, Utc};
use crate::models::event::{Event, EventStatus, CreateEventRequest, UpdateEventRequest};
use crate::utils::errors::EventDeskError;

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event in PENDING status on an existing connection
    pub async fn create_in(conn: &mut PgConnection, request: CreateEventRequest) -> Result<Event, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'PENDING', $7, $8, $9)
            RETURNING event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at
            "#
        )
        .bind(request.title)
        .bind(request.description)
        .bind(request.event_date)
        .bind(request.event_time)
        .bind(request.venue)
        .bind(request.organizer_id)
        .bind(request.max_attendees.unwrap_or(100))
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventDeskError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    /// Find event by ID on an existing connection
    pub async fn find_by_id_in(conn: &mut PgConnection, id: i64) -> Result<Option<Event>, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at FROM events WHERE event_id = $1"
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(event)
    }

    /// Update event details while the event is PENDING or REJECTED
    ///
    /// Returns None when the event is missing or no longer editable.
    pub async fn update_editable(&self, id: i64, request: UpdateEventRequest) -> Result<Option<Event>, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                event_time = COALESCE($5, event_time),
                venue = COALESCE($6, venue),
                max_attendees = COALESCE($7, max_attendees),
                updated_at = $8
            WHERE event_id = $1 AND status IN ('PENDING', 'REJECTED')
            RETURNING event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.event_date)
        .bind(request.event_time)
        .bind(request.venue)
        .bind(request.max_attendees)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Move an event from `from` to `to`; returns None when the event is not in `from`
    pub async fn transition_status(&self, id: i64, from: EventStatus, to: EventStatus) -> Result<Option<Event>, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET status = $3, updated_at = $4
            WHERE event_id = $1 AND status = $2
            RETURNING event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// List all events, newest date first
    pub async fn list_all(&self) -> Result<Vec<Event>, EventDeskError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at FROM events ORDER BY event_date DESC, event_id DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events created by an organizer
    pub async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Event>, EventDeskError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at FROM events WHERE organizer_id = $1 ORDER BY event_date DESC, event_id DESC"
        )
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events with a given status
    pub async fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>, EventDeskError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at FROM events WHERE status = $1 ORDER BY event_date DESC, event_id DESC"
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List approved events on or after `from`, soonest first
    pub async fn list_upcoming(&self, from: NaiveDate) -> Result<Vec<Event>, EventDeskError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT event_id, title, description, event_date, event_time, venue, organizer_id, status, max_attendees, created_at, updated_at FROM events WHERE status = 'APPROVED' AND event_date >= $1 ORDER BY event_date ASC, event_time ASC"
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count events per status
    pub async fn count_by_status(&self) -> Result<Vec<(EventStatus, i64)>, EventDeskError> {
        let counts = sqlx::query_as::<_, (EventStatus, i64)>(
            "SELECT status, COUNT(*) FROM events GROUP BY status ORDER BY status"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
