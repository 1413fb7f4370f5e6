//! Ticket inventory ledger
//!
//! The ledger owns the `quantity_sold` counter of every ticket. Each update
//! is a single conditional statement, so the read-check-write happens inside
//! the database under the row lock the `UPDATE` takes:
//!
//! - `reserve` only increments while `quantity_sold < quantity_available`,
//!   so two concurrent reservations of the last unit cannot both succeed.
//! - `release` floors the counter at zero.
//!
//! The `*_in` variants run on a caller-supplied connection so the
//! registration workflow can include them in its transaction.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::log_ledger_change;

#[derive(Debug, Clone)]
pub struct TicketLedger {
    pool: PgPool,
}

impl TicketLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Take one unit of a ticket; returns the remaining count
    pub async fn reserve(&self, ticket_id: i64) -> Result<i32> {
        let mut conn = self.pool.acquire().await?;
        Self::reserve_in(&mut conn, ticket_id).await
    }

    /// Return one unit of a ticket; returns the remaining count
    pub async fn release(&self, ticket_id: i64) -> Result<i32> {
        let mut conn = self.pool.acquire().await?;
        Self::release_in(&mut conn, ticket_id).await
    }

    /// Units of a ticket still available
    pub async fn remaining(&self, ticket_id: i64) -> Result<i32> {
        let mut conn = self.pool.acquire().await?;
        Self::remaining_in(&mut conn, ticket_id).await
    }

    #[instrument(skip(conn))]
    pub async fn reserve_in(conn: &mut PgConnection, ticket_id: i64) -> Result<i32> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE tickets
            SET quantity_sold = quantity_sold + 1
            WHERE ticket_id = $1 AND quantity_sold < quantity_available
            RETURNING quantity_available - quantity_sold
            "#
        )
        .bind(ticket_id)
        .fetch_optional(&mut *conn)
        .await?;

        match remaining {
            Some(remaining) => {
                log_ledger_change(ticket_id, "reserve", remaining);
                Ok(remaining)
            }
            // Nothing updated: either the ticket is full or it does not exist
            None => match Self::remaining_in(conn, ticket_id).await {
                Ok(_) => Err(EventDeskError::CapacityExceeded { ticket_id }),
                Err(e) => Err(e),
            },
        }
    }

    #[instrument(skip(conn))]
    pub async fn release_in(conn: &mut PgConnection, ticket_id: i64) -> Result<i32> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE tickets
            SET quantity_sold = GREATEST(quantity_sold - 1, 0)
            WHERE ticket_id = $1
            RETURNING quantity_available - quantity_sold
            "#
        )
        .bind(ticket_id)
        .fetch_optional(conn)
        .await?;

        let remaining = remaining.ok_or(EventDeskError::TicketNotFound { ticket_id })?;
        log_ledger_change(ticket_id, "release", remaining);
        Ok(remaining)
    }

    pub async fn remaining_in(conn: &mut PgConnection, ticket_id: i64) -> Result<i32> {
        let remaining: Option<i32> = sqlx::query_scalar(
            "SELECT quantity_available - quantity_sold FROM tickets WHERE ticket_id = $1"
        )
        .bind(ticket_id)
        .fetch_optional(conn)
        .await?;

        remaining
            .map(|r| r.max(0))
            .ok_or(EventDeskError::TicketNotFound { ticket_id })
    }
}
