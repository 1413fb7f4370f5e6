//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod ticket;
pub mod registration;
pub mod message;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use ticket::TicketRepository;
pub use registration::RegistrationRepository;
pub use message::MessageRepository;
