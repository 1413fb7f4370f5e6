//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod ticket;
pub mod registration;
pub mod message;

// Re-export commonly used models
pub use user::{User, Role, DashboardKind, CreateUserRequest, UpdateUserRequest};
pub use event::{Event, EventStatus, CreateEventRequest, UpdateEventRequest};
pub use ticket::{Ticket, CreateTicketRequest, UpdateTicketRequest};
pub use registration::{Registration, RegistrationStatus, RegisterRequest, RegistrationReceipt};
pub use message::{Message, CreateMessageRequest};
