//! Test data helpers
//!
//! Seeds users, events and ticket types straight through the repositories so
//! each test starts from a known state.

use std::sync::OnceLock;

use chrono::{Duration, NaiveTime, Utc};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;

use EventDesk::database::repositories::{EventRepository, TicketRepository, UserRepository};
use EventDesk::models::event::{CreateEventRequest, Event, EventStatus};
use EventDesk::models::ticket::{CreateTicketRequest, Ticket};
use EventDesk::models::user::{Role, User};
use EventDesk::services::auth::{hash_password, AuthContext};

use super::TestDatabase;

pub const TEST_PASSWORD: &str = "password123";

/// Argon2 is slow in debug builds; hash the shared test password once
fn test_password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).expect("hash test password"))
}

/// Users of every role
pub struct TestUsers {
    pub admin: AuthContext,
    pub organizer: AuthContext,
    pub attendees: Vec<AuthContext>,
}

impl TestUsers {
    pub fn attendee(&self, index: usize) -> &AuthContext {
        &self.attendees[index]
    }
}

pub async fn create_user(db: &TestDatabase, username: &str, role: Role) -> User {
    let full_name: String = Name().fake();
    UserRepository::new(db.pool.clone())
        .create(username, test_password_hash(), &format!("{}@example.com", username), &full_name, role)
        .await
        .expect("create test user")
}

pub async fn seed_users(db: &TestDatabase, attendee_count: usize) -> TestUsers {
    let admin = create_user(db, "admin", Role::Admin).await;
    let organizer = create_user(db, "organizer", Role::Organizer).await;

    let mut attendees = Vec::with_capacity(attendee_count);
    for i in 0..attendee_count {
        let attendee = create_user(db, &format!("attendee{}", i + 1), Role::Attendee).await;
        attendees.push(AuthContext::new(attendee));
    }

    TestUsers {
        admin: AuthContext::new(admin),
        organizer: AuthContext::new(organizer),
        attendees,
    }
}

pub fn event_request(organizer_id: i64, title: &str) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: Some("Integration test event".to_string()),
        event_date: (Utc::now() + Duration::days(30)).date_naive(),
        event_time: NaiveTime::from_hms_opt(18, 30, 0).expect("valid time"),
        venue: "Main Hall".to_string(),
        organizer_id,
        max_attendees: None,
    }
}

/// Event in the given status with the listed `(type, price in cents, capacity)` tickets
pub async fn create_event_with_tickets(
    db: &TestDatabase,
    organizer_id: i64,
    status: EventStatus,
    tickets: &[(&str, i64, i32)],
) -> (Event, Vec<Ticket>) {
    let mut conn = db.pool.acquire().await.expect("acquire connection");
    let mut event = EventRepository::create_in(&mut conn, event_request(organizer_id, "Tech Conference"))
        .await
        .expect("create test event");
    drop(conn);

    if status != EventStatus::Pending {
        event = EventRepository::new(db.pool.clone())
            .transition_status(event.event_id, EventStatus::Pending, status)
            .await
            .expect("transition test event")
            .expect("event was pending");
    }

    let repo = TicketRepository::new(db.pool.clone());
    let mut created = Vec::with_capacity(tickets.len());
    for (ticket_type, cents, capacity) in tickets {
        let ticket = repo
            .create(CreateTicketRequest {
                event_id: event.event_id,
                ticket_type: ticket_type.to_string(),
                price: Decimal::new(*cents, 2),
                quantity_available: *capacity,
            })
            .await
            .expect("create test ticket");
        created.push(ticket);
    }

    (event, created)
}

/// Approved event with a single ticket type of the given capacity
pub async fn approved_event(db: &TestDatabase, organizer_id: i64, capacity: i32) -> (Event, Ticket) {
    let (event, mut tickets) =
        create_event_with_tickets(db, organizer_id, EventStatus::Approved, &[("General Admission", 5000, capacity)]).await;
    (event, tickets.remove(0))
}
