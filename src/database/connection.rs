//! Database connection management

use std::time::{Duration, Instant};

use sqlx::{Pool, Postgres};
use crate::config::DatabaseConfig;
use crate::utils::errors::EventDeskError;
use crate::utils::logging::log_database_operation;

pub type DatabasePool = Pool<Postgres>;

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, EventDeskError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(Some(Duration::from_secs(600)))
        .max_lifetime(Some(Duration::from_secs(1800)))
        .connect(&config.url)
        .await?;

    // Test the connection
    health_check(&pool).await?;

    tracing::info!(max_connections = config.max_connections, "Database connection pool created successfully");
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), EventDeskError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &DatabasePool) -> Result<(), EventDeskError> {
    let started = Instant::now();
    let result = sqlx::query("SELECT 1")
        .execute(pool)
        .await;

    log_database_operation("health_check", "-", started.elapsed().as_millis() as u64, result.is_ok());
    result?;

    Ok(())
}
