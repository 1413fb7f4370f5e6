//! Test helpers module
//!
//! Database setup and seeded domain data shared by the integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn,EventDesk=debug")
            .with_test_writer()
            .try_init();
    });
}
