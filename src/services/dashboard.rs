//! Dashboard snapshots
//!
//! Read-only aggregates shown after login, one per role. The refresher
//! rebuilds them periodically.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::database::repositories::{
    EventRepository, MessageRepository, RegistrationRepository, TicketRepository, UserRepository,
};
use crate::models::event::{Event, EventStatus};
use crate::models::message::Message;
use crate::models::registration::Registration;
use crate::models::user::{DashboardKind, Role, User};
use crate::utils::errors::Result;

#[derive(Debug, Clone, Serialize)]
pub struct AdminSnapshot {
    pub users_by_role: Vec<(Role, i64)>,
    pub events_by_status: Vec<(EventStatus, i64)>,
    pub pending_events: Vec<Event>,
    pub total_revenue: Decimal,
    pub generated_at: DateTime<Utc>,
}

impl AdminSnapshot {
    pub fn total_users(&self) -> i64 {
        self.users_by_role.iter().map(|(_, count)| count).sum()
    }

    pub fn total_events(&self) -> i64 {
        self.events_by_status.iter().map(|(_, count)| count).sum()
    }
}

/// Sales of one ticket type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketSales {
    pub event_id: i64,
    pub ticket_id: i64,
    pub ticket_type: String,
    pub sold: i32,
    pub available: i32,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizerSnapshot {
    pub organizer_id: i64,
    pub events: Vec<Event>,
    pub approved_events: usize,
    pub pending_events: usize,
    pub active_registrations: i64,
    pub revenue: Decimal,
    pub ticket_sales: Vec<TicketSales>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeSnapshot {
    pub attendee_id: i64,
    pub upcoming_events: Vec<Event>,
    pub registrations: Vec<Registration>,
    pub messages: Vec<Message>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "dashboard", rename_all = "snake_case")]
pub enum DashboardSnapshot {
    Admin(AdminSnapshot),
    Organizer(OrganizerSnapshot),
    Attendee(AttendeeSnapshot),
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    users: UserRepository,
    events: EventRepository,
    tickets: TicketRepository,
    registrations: RegistrationRepository,
    messages: MessageRepository,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            tickets: TicketRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
        }
    }

    /// Snapshot of the dashboard the user's role lands on
    pub async fn snapshot_for(&self, user: &User, today: NaiveDate) -> Result<DashboardSnapshot> {
        let snapshot = match user.role.dashboard() {
            DashboardKind::Admin => DashboardSnapshot::Admin(self.admin_snapshot().await?),
            DashboardKind::Organizer => DashboardSnapshot::Organizer(self.organizer_snapshot(user.user_id).await?),
            DashboardKind::Attendee => DashboardSnapshot::Attendee(self.attendee_snapshot(user.user_id, today).await?),
        };
        Ok(snapshot)
    }

    pub async fn admin_snapshot(&self) -> Result<AdminSnapshot> {
        Ok(AdminSnapshot {
            users_by_role: self.users.count_by_role().await?,
            events_by_status: self.events.count_by_status().await?,
            pending_events: self.events.list_by_status(EventStatus::Pending).await?,
            total_revenue: self.registrations.total_revenue().await?,
            generated_at: Utc::now(),
        })
    }

    pub async fn organizer_snapshot(&self, organizer_id: i64) -> Result<OrganizerSnapshot> {
        let events = self.events.list_by_organizer(organizer_id).await?;

        let mut ticket_sales = Vec::new();
        for event in &events {
            for ticket in self.tickets.list_by_event(event.event_id).await? {
                ticket_sales.push(TicketSales {
                    event_id: ticket.event_id,
                    ticket_id: ticket.ticket_id,
                    revenue: ticket.revenue(),
                    sold: ticket.quantity_sold,
                    available: ticket.quantity_available,
                    ticket_type: ticket.ticket_type,
                });
            }
        }

        let (active_registrations, revenue) = self.registrations.summary_for_organizer(organizer_id).await?;

        Ok(OrganizerSnapshot {
            organizer_id,
            approved_events: count_status(&events, EventStatus::Approved),
            pending_events: count_status(&events, EventStatus::Pending),
            events,
            active_registrations,
            revenue,
            ticket_sales,
            generated_at: Utc::now(),
        })
    }

    pub async fn attendee_snapshot(&self, attendee_id: i64, today: NaiveDate) -> Result<AttendeeSnapshot> {
        Ok(AttendeeSnapshot {
            attendee_id,
            upcoming_events: self.events.list_upcoming(today).await?,
            registrations: self.registrations.list_by_attendee(attendee_id).await?,
            messages: self.messages.list_for_attendee(attendee_id).await?,
            generated_at: Utc::now(),
        })
    }
}

fn count_status(events: &[Event], status: EventStatus) -> usize {
    events.iter().filter(|e| e.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_totals() {
        let snapshot = AdminSnapshot {
            users_by_role: vec![(Role::Admin, 1), (Role::Organizer, 3), (Role::Attendee, 12)],
            events_by_status: vec![(EventStatus::Pending, 2), (EventStatus::Approved, 5)],
            pending_events: Vec::new(),
            total_revenue: Decimal::ZERO,
            generated_at: Utc::now(),
        };

        assert_eq!(snapshot.total_users(), 16);
        assert_eq!(snapshot.total_events(), 7);
    }

    #[test]
    fn test_snapshot_serializes_with_dashboard_tag() {
        let snapshot = DashboardSnapshot::Attendee(AttendeeSnapshot {
            attendee_id: 4,
            upcoming_events: Vec::new(),
            registrations: Vec::new(),
            messages: Vec::new(),
            generated_at: Utc::now(),
        });

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["dashboard"], "attendee");
        assert_eq!(json["attendee_id"], 4);
    }
}
