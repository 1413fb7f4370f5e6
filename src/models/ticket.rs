//! Ticket model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// A ticket type of one event together with its inventory counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub ticket_id: i64,
    pub event_id: i64,
    pub ticket_type: String,
    pub price: Decimal,
    pub quantity_available: i32,
    pub quantity_sold: i32,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Units still available for sale, never negative
    pub fn remaining(&self) -> i32 {
        (self.quantity_available - self.quantity_sold).max(0)
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining() == 0
    }

    /// Gross revenue of the units sold so far
    pub fn revenue(&self) -> Decimal {
        self.price * Decimal::from(self.quantity_sold)
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - ${:.2} ({} available)", self.ticket_type, self.price, self.remaining())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub event_id: i64,
    pub ticket_type: String,
    pub price: Decimal,
    pub quantity_available: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicketRequest {
    pub ticket_type: Option<String>,
    pub price: Option<Decimal>,
    pub quantity_available: Option<i32>,
}
