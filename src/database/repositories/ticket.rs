//! Ticket repository implementation
//!
//! Inventory counters are only read here; `quantity_sold` is changed
//! exclusively through [`crate::services::TicketLedger`].

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::ticket::{Ticket, CreateTicketRequest, UpdateTicketRequest};
use crate::utils::errors::EventDeskError;

const CAPACITY_CONSTRAINT: &str = "tickets_sold_within_capacity";
const REGISTRATION_TICKET_FK: &str = "registrations_ticket_id_fkey";

#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new ticket type
    pub async fn create(&self, request: CreateTicketRequest) -> Result<Ticket, EventDeskError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_in(&mut conn, request).await
    }

    /// Create a new ticket type on an existing connection
    pub async fn create_in(conn: &mut PgConnection, request: CreateTicketRequest) -> Result<Ticket, EventDeskError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (event_id, ticket_type, price, quantity_available, quantity_sold, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING ticket_id, event_id, ticket_type, price, quantity_available, quantity_sold, created_at
            "#
        )
        .bind(request.event_id)
        .bind(request.ticket_type)
        .bind(request.price)
        .bind(request.quantity_available)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if EventDeskError::is_constraint_violation(&e, CAPACITY_CONSTRAINT) {
                EventDeskError::InvalidInput("Ticket quantity cannot be negative".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(ticket)
    }

    /// Find ticket by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, EventDeskError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    /// Find ticket by ID on an existing connection
    pub async fn find_by_id_in(conn: &mut PgConnection, id: i64) -> Result<Option<Ticket>, EventDeskError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            "SELECT ticket_id, event_id, ticket_type, price, quantity_available, quantity_sold, created_at FROM tickets WHERE ticket_id = $1"
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(ticket)
    }

    /// Update ticket type, price or capacity
    ///
    /// Capacity cannot drop below the number of units already sold.
    pub async fn update(&self, id: i64, request: UpdateTicketRequest) -> Result<Ticket, EventDeskError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets
            SET ticket_type = COALESCE($2, ticket_type),
                price = COALESCE($3, price),
                quantity_available = COALESCE($4, quantity_available)
            WHERE ticket_id = $1
            RETURNING ticket_id, event_id, ticket_type, price, quantity_available, quantity_sold, created_at
            "#
        )
        .bind(id)
        .bind(request.ticket_type)
        .bind(request.price)
        .bind(request.quantity_available)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if EventDeskError::is_constraint_violation(&e, CAPACITY_CONSTRAINT) {
                EventDeskError::InvalidInput(format!("Capacity of ticket {} cannot drop below the units already sold", id))
            } else {
                e.into()
            }
        })?;

        ticket.ok_or(EventDeskError::TicketNotFound { ticket_id: id })
    }

    /// Delete ticket type; refused while registrations reference it
    pub async fn delete(&self, id: i64) -> Result<(), EventDeskError> {
        let result = sqlx::query("DELETE FROM tickets WHERE ticket_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if EventDeskError::is_constraint_violation(&e, REGISTRATION_TICKET_FK) {
                    EventDeskError::InvalidInput(format!("Ticket {} has registrations and cannot be deleted", id))
                } else {
                    e.into()
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(EventDeskError::TicketNotFound { ticket_id: id });
        }

        Ok(())
    }

    /// List ticket types of an event, cheapest first
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Ticket>, EventDeskError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT ticket_id, event_id, ticket_type, price, quantity_available, quantity_sold, created_at FROM tickets WHERE event_id = $1 ORDER BY price ASC, ticket_id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// List ticket types of an event that still have units left
    pub async fn list_available_by_event(&self, event_id: i64) -> Result<Vec<Ticket>, EventDeskError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT ticket_id, event_id, ticket_type, price, quantity_available, quantity_sold, created_at FROM tickets WHERE event_id = $1 AND quantity_available > quantity_sold ORDER BY price ASC, ticket_id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }
}
