//! Database service layer
//!
//! This module provides a high-level interface to database operations

use chrono::Utc;

use crate::config::Settings;
use crate::database::{DatabasePool, EventRepository, MessageRepository, RegistrationRepository, TicketRepository, UserRepository};
use crate::models::registration::{RegisterRequest, RegistrationReceipt};
use crate::services::{
    AuthContext, AuthService, DashboardService, DashboardSnapshot, EventService, Permission, RegistrationWorkflow,
    TicketLedger,
};
use crate::utils::errors::{EventDeskError, Result};

/// Repositories and services sharing one connection pool
#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub pool: DatabasePool,
    pub users: UserRepository,
    pub events: EventRepository,
    pub tickets: TicketRepository,
    pub registrations: RegistrationRepository,
    pub messages: MessageRepository,
    pub ledger: TicketLedger,
    pub workflow: RegistrationWorkflow,
    pub auth: AuthService,
    pub event_service: EventService,
    pub dashboards: DashboardService,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool, settings: &Settings) -> Self {
        let users = UserRepository::new(pool.clone());

        Self {
            events: EventRepository::new(pool.clone()),
            tickets: TicketRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            ledger: TicketLedger::new(pool.clone()),
            workflow: RegistrationWorkflow::new(pool.clone(), &settings.registration),
            auth: AuthService::new(users.clone()),
            event_service: EventService::new(pool.clone(), settings.tickets.default_types.clone()),
            dashboards: DashboardService::new(pool.clone()),
            users,
            pool,
        }
    }

    /// Register the acting attendee for an event
    pub async fn register_attendee(&self, actor: &AuthContext, event_id: i64, ticket_id: i64) -> Result<RegistrationReceipt> {
        actor.require_permission(Permission::RegisterForEvents)?;

        let ticket = self.event_service.find_ticket(ticket_id).await?;
        self.workflow
            .register(RegisterRequest {
                event_id,
                attendee_id: actor.user.user_id,
                ticket_id,
                amount: ticket.price,
            })
            .await
    }

    /// Cancel one of the acting attendee's own registrations
    pub async fn cancel_attendee_registration(&self, actor: &AuthContext, registration_id: i64) -> Result<RegistrationReceipt> {
        actor.require_permission(Permission::RegisterForEvents)?;

        let registration = self.workflow.find_by_id(registration_id).await?;
        if registration.attendee_id != actor.user.user_id {
            return Err(EventDeskError::PermissionDenied(format!(
                "Registration {} does not belong to user {}",
                registration_id, actor.user.user_id
            )));
        }

        self.workflow.cancel(registration_id).await
    }

    /// Dashboard of the acting user, as of today
    pub async fn dashboard(&self, actor: &AuthContext) -> Result<DashboardSnapshot> {
        self.dashboards.snapshot_for(&actor.user, Utc::now().date_naive()).await
    }
}
