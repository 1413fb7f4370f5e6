//! Services module
//!
//! Business logic on top of the repositories: the ticket ledger, the
//! registration workflow, authentication, event management and dashboards.

pub mod auth;
pub mod dashboard;
pub mod events;
pub mod ledger;
pub mod refresher;
pub mod registration;

// Re-export commonly used services
pub use auth::{AuthContext, AuthService, Permission};
pub use dashboard::{AdminSnapshot, AttendeeSnapshot, DashboardService, DashboardSnapshot, OrganizerSnapshot, TicketSales};
pub use events::EventService;
pub use ledger::TicketLedger;
pub use refresher::{DashboardRefresher, RefreshHandle};
pub use registration::RegistrationWorkflow;
