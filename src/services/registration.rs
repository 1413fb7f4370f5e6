//! Registration workflow
//!
//! Keeps registration rows and the ticket ledger consistent. Every operation
//! that changes both runs in one transaction; if any step fails the
//! transaction is dropped and sqlx rolls it back, leaving the pre-state.

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument};

use crate::config::RegistrationConfig;
use crate::database::repositories::{EventRepository, RegistrationRepository, TicketRepository, UserRepository};
use crate::models::registration::{Registration, RegistrationReceipt, RegistrationStatus, RegisterRequest};
use crate::services::ledger::TicketLedger;
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::{log_capacity_exceeded, log_registration_action};

#[derive(Debug, Clone)]
pub struct RegistrationWorkflow {
    pool: PgPool,
    registrations: RegistrationRepository,
    initial_status: RegistrationStatus,
}

impl RegistrationWorkflow {
    pub fn new(pool: PgPool, config: &RegistrationConfig) -> Self {
        let initial_status = if config.auto_complete_payment {
            RegistrationStatus::Completed
        } else {
            RegistrationStatus::Pending
        };

        Self {
            registrations: RegistrationRepository::new(pool.clone()),
            pool,
            initial_status,
        }
    }

    /// Status given to new registrations
    pub fn initial_status(&self) -> RegistrationStatus {
        self.initial_status
    }

    /// Register an attendee for an event, taking one unit of the ticket
    pub async fn register(&self, request: RegisterRequest) -> Result<RegistrationReceipt> {
        let mut tx = self.pool.begin().await?;
        let receipt = Self::register_in(&mut tx, &request, self.initial_status).await?;
        tx.commit().await?;

        log_registration_action(receipt.registration.registration_id, "register", request.attendee_id, receipt.remaining);
        Ok(receipt)
    }

    /// Cancel a completed registration and return its unit to the ticket
    pub async fn cancel(&self, registration_id: i64) -> Result<RegistrationReceipt> {
        let mut tx = self.pool.begin().await?;
        let receipt = Self::cancel_in(&mut tx, registration_id).await?;
        tx.commit().await?;

        log_registration_action(registration_id, "cancel", receipt.registration.attendee_id, receipt.remaining);
        Ok(receipt)
    }

    /// Confirm payment of a pending registration
    pub async fn complete_payment(&self, registration_id: i64) -> Result<RegistrationReceipt> {
        self.settle(registration_id, RegistrationStatus::Completed).await
    }

    /// Mark payment of a pending registration as failed; the held unit is released
    pub async fn fail_payment(&self, registration_id: i64) -> Result<RegistrationReceipt> {
        self.settle(registration_id, RegistrationStatus::Failed).await
    }

    async fn settle(&self, registration_id: i64, to: RegistrationStatus) -> Result<RegistrationReceipt> {
        let mut tx = self.pool.begin().await?;
        let receipt = Self::transition_in(&mut tx, registration_id, to).await?;
        tx.commit().await?;

        log_registration_action(registration_id, to.as_str(), receipt.registration.attendee_id, receipt.remaining);
        Ok(receipt)
    }

    /// Register on a caller-owned connection or transaction
    ///
    /// # Errors
    ///
    /// - `EventNotFound` / `EventNotOpen` when the event is unknown or not approved
    /// - `UserNotFound` when the attendee is unknown or deactivated
    /// - `TicketNotFound` when the ticket is unknown or belongs to another event
    /// - `AlreadyRegistered` when the attendee already holds an active registration
    /// - `CapacityExceeded` when the ticket is sold out
    #[instrument(skip(conn, request), fields(event_id = request.event_id, attendee_id = request.attendee_id, ticket_id = request.ticket_id))]
    pub async fn register_in(
        conn: &mut PgConnection,
        request: &RegisterRequest,
        initial_status: RegistrationStatus,
    ) -> Result<RegistrationReceipt> {
        if request.amount.is_sign_negative() {
            return Err(EventDeskError::InvalidInput("Payment amount cannot be negative".to_string()));
        }

        let event = EventRepository::find_by_id_in(conn, request.event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id: request.event_id })?;
        if !event.status.is_open_for_registration() {
            return Err(EventDeskError::EventNotOpen {
                event_id: event.event_id,
                status: event.status.to_string(),
            });
        }

        UserRepository::find_active_in(conn, request.attendee_id)
            .await?
            .ok_or(EventDeskError::UserNotFound { user_id: request.attendee_id })?;

        match TicketRepository::find_by_id_in(conn, request.ticket_id).await? {
            Some(ticket) if ticket.event_id == request.event_id => {}
            _ => return Err(EventDeskError::TicketNotFound { ticket_id: request.ticket_id }),
        }

        if RegistrationRepository::has_active_in(conn, request.event_id, request.attendee_id).await? {
            return Err(EventDeskError::AlreadyRegistered {
                event_id: request.event_id,
                attendee_id: request.attendee_id,
            });
        }

        let remaining = match TicketLedger::reserve_in(conn, request.ticket_id).await {
            Ok(remaining) => remaining,
            Err(e @ EventDeskError::CapacityExceeded { .. }) => {
                log_capacity_exceeded(request.ticket_id, request.attendee_id);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        // The partial unique index catches a concurrent registration of the same attendee
        let registration = RegistrationRepository::insert_in(conn, request, initial_status).await?;
        debug!(registration_id = registration.registration_id, status = %registration.status, "Registration row inserted");

        Ok(RegistrationReceipt { registration, remaining })
    }

    /// Cancel on a caller-owned connection or transaction
    pub async fn cancel_in(conn: &mut PgConnection, registration_id: i64) -> Result<RegistrationReceipt> {
        Self::transition_in(conn, registration_id, RegistrationStatus::Cancelled).await
    }

    /// Move a registration to `to`, releasing its unit when it stops being active
    #[instrument(skip(conn))]
    pub async fn transition_in(
        conn: &mut PgConnection,
        registration_id: i64,
        to: RegistrationStatus,
    ) -> Result<RegistrationReceipt> {
        let current = RegistrationRepository::find_for_update_in(conn, registration_id)
            .await?
            .ok_or(EventDeskError::RegistrationNotFound { registration_id })?;

        if !current.status.can_transition_to(to) {
            return Err(EventDeskError::InvalidStateTransition {
                from: current.status.to_string(),
                to: to.to_string(),
            });
        }

        let registration = RegistrationRepository::update_status_in(conn, registration_id, to).await?;

        let remaining = if current.status.is_active() && !to.is_active() {
            TicketLedger::release_in(conn, registration.ticket_id).await?
        } else {
            TicketLedger::remaining_in(conn, registration.ticket_id).await?
        };

        info!(registration_id, from = %current.status, to = %to, remaining, "Registration status changed");
        Ok(RegistrationReceipt { registration, remaining })
    }

    pub async fn find_by_id(&self, registration_id: i64) -> Result<Registration> {
        self.registrations
            .find_by_id(registration_id)
            .await?
            .ok_or(EventDeskError::RegistrationNotFound { registration_id })
    }

    pub async fn list_by_attendee(&self, attendee_id: i64) -> Result<Vec<Registration>> {
        self.registrations.list_by_attendee(attendee_id).await
    }

    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Registration>> {
        self.registrations.list_by_event(event_id).await
    }

    pub async fn is_registered(&self, event_id: i64, attendee_id: i64) -> Result<bool> {
        self.registrations.is_registered(event_id, attendee_id).await
    }
}
