//! Event service implementation
//!
//! Event lifecycle (create, edit, review, cancel) plus the ticket types and
//! announcements an organizer attaches to their events.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::DefaultTicketType;
use crate::database::repositories::{EventRepository, MessageRepository, TicketRepository};
use crate::models::event::{CreateEventRequest, Event, EventStatus, UpdateEventRequest};
use crate::models::message::{CreateMessageRequest, Message};
use crate::models::ticket::{CreateTicketRequest, Ticket, UpdateTicketRequest};
use crate::services::auth::{AuthContext, Permission};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::truncate_text;
use crate::utils::logging::{log_admin_action, log_event_action};

#[derive(Debug, Clone)]
pub struct EventService {
    pool: PgPool,
    events: EventRepository,
    tickets: TicketRepository,
    messages: MessageRepository,
    default_tickets: Vec<DefaultTicketType>,
}

impl EventService {
    pub fn new(pool: PgPool, default_tickets: Vec<DefaultTicketType>) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            tickets: TicketRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            pool,
            default_tickets,
        }
    }

    /// Create an event in PENDING status together with the default ticket types
    pub async fn create_event(&self, actor: &AuthContext, request: CreateEventRequest) -> Result<(Event, Vec<Ticket>)> {
        actor.require_permission(Permission::ManageOwnEvents)?;
        if request.organizer_id != actor.user.user_id {
            return Err(EventDeskError::PermissionDenied(format!(
                "User {} cannot create events for organizer {}",
                actor.user.user_id, request.organizer_id
            )));
        }
        validate_event_fields(Some(&request.title), Some(&request.venue), request.max_attendees)?;

        let mut tx = self.pool.begin().await?;
        let event = EventRepository::create_in(&mut tx, request).await?;

        let mut tickets = Vec::with_capacity(self.default_tickets.len());
        for default in &self.default_tickets {
            let ticket = TicketRepository::create_in(&mut tx, CreateTicketRequest {
                event_id: event.event_id,
                ticket_type: default.ticket_type.clone(),
                price: default.price,
                quantity_available: default.quantity,
            })
            .await?;
            tickets.push(ticket);
        }
        tx.commit().await?;

        log_event_action(event.event_id, "create", actor.user.user_id, Some(&event.title));
        Ok((event, tickets))
    }

    /// Edit event details; approved and cancelled events are frozen
    pub async fn update_event(&self, actor: &AuthContext, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        let event = self.owned_event(actor, event_id).await?;
        if !event.status.is_editable() {
            return Err(EventDeskError::InvalidStateTransition {
                from: event.status.to_string(),
                to: "edited".to_string(),
            });
        }
        validate_event_fields(request.title.as_deref(), request.venue.as_deref(), request.max_attendees)?;

        match self.events.update_editable(event_id, request).await? {
            Some(event) => {
                log_event_action(event_id, "update", actor.user.user_id, None);
                Ok(event)
            }
            // Reviewed or cancelled since it was read
            None => {
                let current = self.find_event(event_id).await?;
                Err(EventDeskError::InvalidStateTransition {
                    from: current.status.to_string(),
                    to: "edited".to_string(),
                })
            }
        }
    }

    pub async fn approve_event(&self, actor: &AuthContext, event_id: i64) -> Result<Event> {
        self.review(actor, event_id, EventStatus::Approved).await
    }

    pub async fn reject_event(&self, actor: &AuthContext, event_id: i64) -> Result<Event> {
        self.review(actor, event_id, EventStatus::Rejected).await
    }

    async fn review(&self, actor: &AuthContext, event_id: i64, to: EventStatus) -> Result<Event> {
        actor.require_permission(Permission::ReviewEvents)?;
        let event = self.transition(event_id, EventStatus::Pending, to).await?;

        log_admin_action(actor.user.user_id, "review_event", Some(&event_id.to_string()), Some(to.as_str()));
        Ok(event)
    }

    /// Soft delete by the owning organizer
    pub async fn cancel_event(&self, actor: &AuthContext, event_id: i64) -> Result<Event> {
        let event = self.owned_event(actor, event_id).await?;
        let event = self.transition(event_id, event.status, EventStatus::Cancelled).await?;

        log_event_action(event_id, "cancel", actor.user.user_id, None);
        Ok(event)
    }

    async fn transition(&self, event_id: i64, from: EventStatus, to: EventStatus) -> Result<Event> {
        if !from.can_transition_to(to) {
            return Err(EventDeskError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        match self.events.transition_status(event_id, from, to).await? {
            Some(event) => {
                info!(event_id, from = %from, to = %to, "Event status changed");
                Ok(event)
            }
            // The row either vanished or moved on since it was read
            None => {
                let current = self.find_event(event_id).await?;
                Err(EventDeskError::InvalidStateTransition {
                    from: current.status.to_string(),
                    to: to.to_string(),
                })
            }
        }
    }

    async fn owned_event(&self, actor: &AuthContext, event_id: i64) -> Result<Event> {
        let event = self.find_event(event_id).await?;
        actor.require_event_owner(&event)?;
        Ok(event)
    }

    pub async fn find_event(&self, event_id: i64) -> Result<Event> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })
    }

    pub async fn list_all_events(&self, actor: &AuthContext) -> Result<Vec<Event>> {
        actor.require_permission(Permission::ViewAllEvents)?;
        self.events.list_all().await
    }

    pub async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Event>> {
        self.events.list_by_organizer(organizer_id).await
    }

    pub async fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        self.events.list_by_status(status).await
    }

    /// Approved events on or after `today`
    pub async fn list_upcoming(&self, today: NaiveDate) -> Result<Vec<Event>> {
        self.events.list_upcoming(today).await
    }

    pub async fn count_by_status(&self) -> Result<Vec<(EventStatus, i64)>> {
        self.events.count_by_status().await
    }

    // Tickets

    pub async fn add_ticket(&self, actor: &AuthContext, request: CreateTicketRequest) -> Result<Ticket> {
        let event = self.owned_event(actor, request.event_id).await?;
        if event.status == EventStatus::Cancelled {
            return Err(EventDeskError::InvalidStateTransition {
                from: event.status.to_string(),
                to: "ticket added".to_string(),
            });
        }
        validate_ticket_fields(Some(&request.ticket_type), request.price, Some(request.quantity_available))?;

        let ticket = self.tickets.create(request).await?;
        debug!(ticket_id = ticket.ticket_id, event_id = ticket.event_id, "Ticket type added");
        Ok(ticket)
    }

    pub async fn update_ticket(&self, actor: &AuthContext, ticket_id: i64, request: UpdateTicketRequest) -> Result<Ticket> {
        let ticket = self.find_ticket(ticket_id).await?;
        self.owned_event(actor, ticket.event_id).await?;
        validate_ticket_fields(
            request.ticket_type.as_deref(),
            request.price.unwrap_or(ticket.price),
            request.quantity_available,
        )?;

        self.tickets.update(ticket_id, request).await
    }

    pub async fn delete_ticket(&self, actor: &AuthContext, ticket_id: i64) -> Result<()> {
        let ticket = self.find_ticket(ticket_id).await?;
        self.owned_event(actor, ticket.event_id).await?;

        self.tickets.delete(ticket_id).await
    }

    pub async fn find_ticket(&self, ticket_id: i64) -> Result<Ticket> {
        self.tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or(EventDeskError::TicketNotFound { ticket_id })
    }

    pub async fn list_tickets(&self, event_id: i64) -> Result<Vec<Ticket>> {
        self.tickets.list_by_event(event_id).await
    }

    pub async fn list_available_tickets(&self, event_id: i64) -> Result<Vec<Ticket>> {
        self.tickets.list_available_by_event(event_id).await
    }

    // Messages

    /// Broadcast an announcement to an event's attendees
    pub async fn send_message(&self, actor: &AuthContext, request: CreateMessageRequest) -> Result<Message> {
        if request.sender_id != actor.user.user_id {
            return Err(EventDeskError::PermissionDenied(format!(
                "User {} cannot send messages as user {}",
                actor.user.user_id, request.sender_id
            )));
        }
        self.owned_event(actor, request.event_id).await?;
        if request.title.trim().is_empty() || request.content.trim().is_empty() {
            return Err(EventDeskError::InvalidInput("Message title and content are required".to_string()));
        }

        let message = self.messages.create(request).await?;
        log_event_action(message.event_id, "message", actor.user.user_id, Some(&truncate_text(&message.title, 60)));
        Ok(message)
    }

    pub async fn list_messages(&self, event_id: i64) -> Result<Vec<Message>> {
        self.messages.list_by_event(event_id).await
    }

    pub async fn messages_for_attendee(&self, attendee_id: i64) -> Result<Vec<Message>> {
        self.messages.list_for_attendee(attendee_id).await
    }

    pub async fn find_message(&self, message_id: i64) -> Result<Message> {
        self.messages
            .find_by_id(message_id)
            .await?
            .ok_or(EventDeskError::MessageNotFound { message_id })
    }

    pub async fn delete_message(&self, actor: &AuthContext, message_id: i64) -> Result<()> {
        let message = self.find_message(message_id).await?;
        self.owned_event(actor, message.event_id).await?;

        self.messages.delete(message_id).await
    }
}

fn validate_event_fields(title: Option<&str>, venue: Option<&str>, max_attendees: Option<i32>) -> Result<()> {
    if title.is_some_and(|t| t.trim().is_empty()) {
        return Err(EventDeskError::InvalidInput("Event title cannot be empty".to_string()));
    }
    if venue.is_some_and(|v| v.trim().is_empty()) {
        return Err(EventDeskError::InvalidInput("Event venue cannot be empty".to_string()));
    }
    if max_attendees.is_some_and(|m| m <= 0) {
        return Err(EventDeskError::InvalidInput("Maximum attendees must be positive".to_string()));
    }
    Ok(())
}

fn validate_ticket_fields(ticket_type: Option<&str>, price: rust_decimal::Decimal, quantity: Option<i32>) -> Result<()> {
    if ticket_type.is_some_and(|t| t.trim().is_empty()) {
        return Err(EventDeskError::InvalidInput("Ticket type cannot be empty".to_string()));
    }
    if price.is_sign_negative() {
        return Err(EventDeskError::InvalidInput("Ticket price cannot be negative".to_string()));
    }
    if quantity.is_some_and(|q| q < 0) {
        return Err(EventDeskError::InvalidInput("Ticket quantity cannot be negative".to_string()));
    }
    Ok(())
}
