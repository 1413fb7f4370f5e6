//! Event management integration tests
//!
//! Event lifecycle, ticket administration, announcements and the
//! attendee-facing entry points of `DatabaseService`.

#[macro_use]
mod helpers;

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal::Decimal;
use serial_test::serial;

use EventDesk::models::event::{EventStatus, UpdateEventRequest};
use EventDesk::models::message::CreateMessageRequest;
use EventDesk::models::ticket::{CreateTicketRequest, UpdateTicketRequest};
use EventDesk::models::user::Role;
use EventDesk::EventDeskError;

use helpers::*;

#[tokio::test]
#[serial]
async fn test_create_event_adds_default_tickets() {
    let db = require_db!();
    let users = seed_users(&db, 0).await;
    let events = db.service().event_service;

    let (event, tickets) = events
        .create_event(&users.organizer, event_request(users.organizer.user.user_id, "Tech Conference"))
        .await
        .unwrap();

    assert_eq!(event.status, EventStatus::Pending);
    assert_eq!(event.max_attendees, 100);
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].ticket_type, "General Admission");
    assert_eq!(tickets[0].price, Decimal::new(5000, 2));
    assert_eq!(tickets[0].quantity_available, 100);
    assert_eq!(tickets[1].ticket_type, "VIP");
    assert_eq!(tickets[1].quantity_available, 20);
    assert!(tickets.iter().all(|t| t.quantity_sold == 0));
}

#[tokio::test]
#[serial]
async fn test_only_organizers_create_their_own_events() {
    let db = require_db!();
    let users = seed_users(&db, 1).await;
    let events = db.service().event_service;

    assert_matches!(
        events
            .create_event(users.attendee(0), event_request(users.attendee(0).user.user_id, "Party"))
            .await,
        Err(EventDeskError::PermissionDenied(_))
    );
    assert_matches!(
        events
            .create_event(&users.organizer, event_request(users.admin.user.user_id, "Party"))
            .await,
        Err(EventDeskError::PermissionDenied(_))
    );
    assert_eq!(db.count_records("events").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_review_lifecycle() {
    let db = require_db!();
    let users = seed_users(&db, 0).await;
    let events = db.service().event_service;
    let organizer_id = users.organizer.user.user_id;

    let (event, _) = events.create_event(&users.organizer, event_request(organizer_id, "Workshop")).await.unwrap();

    assert_matches!(
        events.approve_event(&users.organizer, event.event_id).await,
        Err(EventDeskError::PermissionDenied(_))
    );

    let approved = events.approve_event(&users.admin, event.event_id).await.unwrap();
    assert_eq!(approved.status, EventStatus::Approved);

    // Review happens once
    assert_matches!(
        events.reject_event(&users.admin, event.event_id).await,
        Err(EventDeskError::InvalidStateTransition { ref from, .. }) if from == "APPROVED"
    );

    // Approved events are frozen for the organizer
    let edit = UpdateEventRequest {
        venue: Some("Room 2".to_string()),
        ..Default::default()
    };
    assert_matches!(
        events.update_event(&users.organizer, event.event_id, edit).await,
        Err(EventDeskError::InvalidStateTransition { .. })
    );

    let cancelled = events.cancel_event(&users.organizer, event.event_id).await.unwrap();
    assert_eq!(cancelled.status, EventStatus::Cancelled);
    assert_matches!(
        events.cancel_event(&users.organizer, event.event_id).await,
        Err(EventDeskError::InvalidStateTransition { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_rejected_event_can_still_be_edited() {
    let db = require_db!();
    let users = seed_users(&db, 0).await;
    let events = db.service().event_service;

    let (event, _) = events
        .create_event(&users.organizer, event_request(users.organizer.user.user_id, "Meetup"))
        .await
        .unwrap();
    events.reject_event(&users.admin, event.event_id).await.unwrap();

    let updated = events
        .update_event(
            &users.organizer,
            event.event_id,
            UpdateEventRequest {
                title: Some("Rust Meetup".to_string()),
                max_attendees: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Rust Meetup");
    assert_eq!(updated.max_attendees, 40);
    assert_eq!(updated.venue, "Main Hall");
    assert_eq!(updated.status, EventStatus::Rejected);
}

#[tokio::test]
#[serial]
async fn test_edit_racing_approval_never_lands_on_approved_event() {
    let db = require_db!();
    let users = seed_users(&db, 0).await;
    let events = db.service().event_service;
    let organizer_id = users.organizer.user.user_id;

    for round in 0..50 {
        let (event, _) = events
            .create_event(&users.organizer, event_request(organizer_id, &format!("Race {}", round)))
            .await
            .unwrap();
        let edit = UpdateEventRequest {
            title: Some("EDITED".to_string()),
            ..Default::default()
        };

        let (edited, approved) = tokio::join!(
            events.update_event(&users.organizer, event.event_id, edit),
            events.approve_event(&users.admin, event.event_id),
        );
        assert_eq!(approved.unwrap().status, EventStatus::Approved);

        match edited {
            Ok(updated) => assert_eq!(updated.status, EventStatus::Pending),
            Err(e) => assert_matches!(
                e,
                EventDeskError::InvalidStateTransition { ref from, .. } if from == "APPROVED"
            ),
        }
    }
}

#[tokio::test]
#[serial]
async fn test_cancelled_event_takes_no_new_tickets() {
    let db = require_db!();
    let users = seed_users(&db, 0).await;
    let events = db.service().event_service;

    let (event, tickets) = events
        .create_event(&users.organizer, event_request(users.organizer.user.user_id, "Called Off"))
        .await
        .unwrap();
    events.cancel_event(&users.organizer, event.event_id).await.unwrap();

    assert_matches!(
        events
            .add_ticket(
                &users.organizer,
                CreateTicketRequest {
                    event_id: event.event_id,
                    ticket_type: "Late Bird".to_string(),
                    price: Decimal::new(1000, 2),
                    quantity_available: 5,
                },
            )
            .await,
        Err(EventDeskError::InvalidStateTransition { ref from, .. }) if from == "CANCELLED"
    );
    assert_eq!(events.list_tickets(event.event_id).await.unwrap().len(), tickets.len());
}

#[tokio::test]
#[serial]
async fn test_other_organizers_cannot_touch_event() {
    let db = require_db!();
    let users = seed_users(&db, 0).await;
    let rival = EventDesk::services::AuthContext::new(create_user(&db, "rival", Role::Organizer).await);
    let events = db.service().event_service;

    let (event, tickets) = events
        .create_event(&users.organizer, event_request(users.organizer.user.user_id, "Gala"))
        .await
        .unwrap();

    assert_matches!(events.cancel_event(&rival, event.event_id).await, Err(EventDeskError::PermissionDenied(_)));
    assert_matches!(
        events.delete_ticket(&rival, tickets[0].ticket_id).await,
        Err(EventDeskError::PermissionDenied(_))
    );
}

#[tokio::test]
#[serial]
async fn test_upcoming_lists_only_approved_future_events() {
    let db = require_db!();
    let users = seed_users(&db, 0).await;
    let organizer_id = users.organizer.user.user_id;
    let (approved, _) = approved_event(&db, organizer_id, 10).await;
    create_event_with_tickets(&db, organizer_id, EventStatus::Pending, &[]).await;
    create_event_with_tickets(&db, organizer_id, EventStatus::Rejected, &[]).await;
    let events = db.service().event_service;

    let upcoming = events.list_upcoming(Utc::now().date_naive()).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].event_id, approved.event_id);

    assert_eq!(events.list_by_organizer(organizer_id).await.unwrap().len(), 3);
    assert_eq!(events.list_by_status(EventStatus::Pending).await.unwrap().len(), 1);
    assert_eq!(events.list_all_events(&users.admin).await.unwrap().len(), 3);
    assert_matches!(events.list_all_events(&users.organizer).await, Err(EventDeskError::PermissionDenied(_)));
}

#[tokio::test]
#[serial]
async fn test_ticket_administration() {
    let db = require_db!();
    let users = seed_users(&db, 1).await;
    let service = db.service();
    let (event, ticket) = approved_event(&db, users.organizer.user.user_id, 2).await;

    let student = service
        .event_service
        .add_ticket(
            &users.organizer,
            CreateTicketRequest {
                event_id: event.event_id,
                ticket_type: "Student".to_string(),
                price: Decimal::new(2500, 2),
                quantity_available: 10,
            },
        )
        .await
        .unwrap();
    let tickets = service.event_service.list_tickets(event.event_id).await.unwrap();
    assert_eq!(tickets.first().map(|t| t.ticket_id), Some(student.ticket_id));

    service.register_attendee(users.attendee(0), event.event_id, ticket.ticket_id).await.unwrap();
    service.ledger.reserve(ticket.ticket_id).await.unwrap();

    // Capacity cannot drop below what was sold
    assert_matches!(
        service
            .event_service
            .update_ticket(
                &users.organizer,
                ticket.ticket_id,
                UpdateTicketRequest {
                    quantity_available: Some(1),
                    ..Default::default()
                },
            )
            .await,
        Err(EventDeskError::InvalidInput(_))
    );

    let available = service.event_service.list_available_tickets(event.event_id).await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].ticket_id, student.ticket_id);

    // Tickets with registrations are kept
    assert_matches!(
        service.event_service.delete_ticket(&users.organizer, ticket.ticket_id).await,
        Err(EventDeskError::InvalidInput(_))
    );
    service.event_service.delete_ticket(&users.organizer, student.ticket_id).await.unwrap();
    assert_matches!(
        service.event_service.find_ticket(student.ticket_id).await,
        Err(EventDeskError::TicketNotFound { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_messages_reach_registered_attendees() {
    let db = require_db!();
    let users = seed_users(&db, 2).await;
    let service = db.service();
    let organizer_id = users.organizer.user.user_id;
    let (event, ticket) = approved_event(&db, organizer_id, 10).await;

    let receipt = service.register_attendee(users.attendee(0), event.event_id, ticket.ticket_id).await.unwrap();
    assert_eq!(receipt.registration.payment_amount, ticket.price);

    let message = service
        .event_service
        .send_message(
            &users.organizer,
            CreateMessageRequest {
                event_id: event.event_id,
                sender_id: organizer_id,
                title: "Venue change".to_string(),
                content: "We moved to Hall B".to_string(),
            },
        )
        .await
        .unwrap();

    let inbox = service.event_service.messages_for_attendee(users.attendee(0).user.user_id).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].message_id, message.message_id);
    assert!(service
        .event_service
        .messages_for_attendee(users.attendee(1).user.user_id)
        .await
        .unwrap()
        .is_empty());

    // Cancelling the registration hides the event's messages
    service
        .cancel_attendee_registration(users.attendee(0), receipt.registration.registration_id)
        .await
        .unwrap();
    assert!(service
        .event_service
        .messages_for_attendee(users.attendee(0).user.user_id)
        .await
        .unwrap()
        .is_empty());

    assert_matches!(
        service
            .event_service
            .send_message(
                users.attendee(1),
                CreateMessageRequest {
                    event_id: event.event_id,
                    sender_id: users.attendee(1).user.user_id,
                    title: "Hi".to_string(),
                    content: "Spam".to_string(),
                },
            )
            .await,
        Err(EventDeskError::PermissionDenied(_))
    );

    service.event_service.delete_message(&users.organizer, message.message_id).await.unwrap();
    assert!(service.event_service.list_messages(event.event_id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_attendees_cancel_only_their_own_registrations() {
    let db = require_db!();
    let users = seed_users(&db, 2).await;
    let service = db.service();
    let (event, ticket) = approved_event(&db, users.organizer.user.user_id, 10).await;

    let receipt = service.register_attendee(users.attendee(0), event.event_id, ticket.ticket_id).await.unwrap();

    assert_matches!(
        service.cancel_attendee_registration(users.attendee(1), receipt.registration.registration_id).await,
        Err(EventDeskError::PermissionDenied(_))
    );
    assert_matches!(
        service.register_attendee(&users.organizer, event.event_id, ticket.ticket_id).await,
        Err(EventDeskError::PermissionDenied(_))
    );
    assert_eq!(service.ledger.remaining(ticket.ticket_id).await.unwrap(), 9);
}
