//! Registration repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::models::registration::{Registration, RegistrationStatus, RegisterRequest};
use crate::utils::errors::EventDeskError;

/// Partial unique index allowing one active registration per attendee and event
pub const ACTIVE_REGISTRATION_INDEX: &str = "idx_registrations_active_attendee";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a registration row on an existing connection
    pub async fn insert_in(conn: &mut PgConnection, request: &RegisterRequest, status: RegistrationStatus) -> Result<Registration, EventDeskError> {
        let now = Utc::now();
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (event_id, attendee_id, ticket_id, payment_amount, status, registration_date, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING registration_id, event_id, attendee_id, ticket_id, payment_amount, status, registration_date, updated_at
            "#
        )
        .bind(request.event_id)
        .bind(request.attendee_id)
        .bind(request.ticket_id)
        .bind(request.amount)
        .bind(status)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if EventDeskError::is_constraint_violation(&e, ACTIVE_REGISTRATION_INDEX) {
                EventDeskError::AlreadyRegistered {
                    event_id: request.event_id,
                    attendee_id: request.attendee_id,
                }
            } else {
                e.into()
            }
        })?;

        Ok(registration)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, EventDeskError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT registration_id, event_id, attendee_id, ticket_id, payment_amount, status, registration_date, updated_at FROM registrations WHERE registration_id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by ID and lock its row until the transaction ends
    pub async fn find_for_update_in(conn: &mut PgConnection, id: i64) -> Result<Option<Registration>, EventDeskError> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT registration_id, event_id, attendee_id, ticket_id, payment_amount, status, registration_date, updated_at FROM registrations WHERE registration_id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(registration)
    }

    /// Check for an active registration on an existing connection
    pub async fn has_active_in(conn: &mut PgConnection, event_id: i64, attendee_id: i64) -> Result<bool, EventDeskError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE event_id = $1 AND attendee_id = $2 AND status IN ('PENDING', 'COMPLETED'))"
        )
        .bind(event_id)
        .bind(attendee_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Check if attendee holds an active registration for event
    pub async fn is_registered(&self, event_id: i64, attendee_id: i64) -> Result<bool, EventDeskError> {
        let mut conn = self.pool.acquire().await?;
        Self::has_active_in(&mut conn, event_id, attendee_id).await
    }

    /// Set registration status on an existing connection
    pub async fn update_status_in(conn: &mut PgConnection, id: i64, status: RegistrationStatus) -> Result<Registration, EventDeskError> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            UPDATE registrations
            SET status = $2, updated_at = $3
            WHERE registration_id = $1
            RETURNING registration_id, event_id, attendee_id, ticket_id, payment_amount, status, registration_date, updated_at
            "#
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;

        registration.ok_or(EventDeskError::RegistrationNotFound { registration_id: id })
    }

    /// List registrations of an attendee, newest first
    pub async fn list_by_attendee(&self, attendee_id: i64) -> Result<Vec<Registration>, EventDeskError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT registration_id, event_id, attendee_id, ticket_id, payment_amount, status, registration_date, updated_at FROM registrations WHERE attendee_id = $1 ORDER BY registration_date DESC, registration_id DESC"
        )
        .bind(attendee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// List registrations of an event, newest first
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Registration>, EventDeskError> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT registration_id, event_id, attendee_id, ticket_id, payment_amount, status, registration_date, updated_at FROM registrations WHERE event_id = $1 ORDER BY registration_date DESC, registration_id DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Count active registrations holding a unit of a ticket
    pub async fn count_active_for_ticket(&self, ticket_id: i64) -> Result<i64, EventDeskError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE ticket_id = $1 AND status IN ('PENDING', 'COMPLETED')"
        )
        .bind(ticket_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Sum of payments on completed registrations
    pub async fn total_revenue(&self) -> Result<Decimal, EventDeskError> {
        let revenue: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(payment_amount), 0) FROM registrations WHERE status = 'COMPLETED'"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(revenue)
    }

    /// Active registration count and completed revenue across an organizer's events
    pub async fn summary_for_organizer(&self, organizer_id: i64) -> Result<(i64, Decimal), EventDeskError> {
        let summary: (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE r.status IN ('PENDING', 'COMPLETED')),
                   COALESCE(SUM(r.payment_amount) FILTER (WHERE r.status = 'COMPLETED'), 0)
            FROM registrations r
            INNER JOIN events e ON r.event_id = e.event_id
            WHERE e.organizer_id = $1
            "#
        )
        .bind(organizer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}
