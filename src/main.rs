//! EventDesk service
//!
//! Main application entry point

use anyhow::{Context, Result};
use futures::FutureExt;
use tokio::signal;
use tracing::{error, info};

use EventDesk::{
    config::Settings,
    database::{create_pool, run_migrations, DatabaseService},
    services::{AdminSnapshot, DashboardRefresher, RefreshHandle},
    utils::{helpers::{format_money, format_timestamp}, logging},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", EventDesk::info());

    info!("Connecting to database...");
    let pool = create_pool(&settings.database)
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool).await?;

    let service = DatabaseService::new(pool.clone(), &settings);

    if let Some(admin) = service
        .auth
        .bootstrap_admin(&settings.bootstrap_admin)
        .await
        .context("failed to create the bootstrap admin")?
    {
        info!(user_id = admin.user_id, username = %admin.username, "Bootstrap admin ready");
    }

    let refresher = if settings.refresh.enabled {
        Some(start_admin_refresher(&service, &settings).await)
    } else {
        info!("Dashboard refresh disabled");
        None
    };

    info!("EventDesk is ready");
    shutdown_signal().await;

    if let Some(handle) = refresher {
        handle.stop().await;
    }
    pool.close().await;

    info!("EventDesk has been shut down.");
    Ok(())
}

async fn start_admin_refresher(service: &DatabaseService, settings: &Settings) -> RefreshHandle<AdminSnapshot> {
    let dashboards = service.dashboards.clone();
    let refresher = DashboardRefresher::new(settings.refresh.interval(), move || {
        let dashboards = dashboards.clone();
        async move { dashboards.admin_snapshot().await }.boxed()
    });

    match refresher.refresh_now().await {
        Ok(snapshot) => log_admin_snapshot(&snapshot),
        Err(e) => error!(error = %e, "Initial dashboard refresh failed"),
    }

    let handle = refresher.start();
    let mut snapshots = handle.subscribe();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let latest = snapshots.borrow_and_update().clone();
            if let Some(snapshot) = latest {
                log_admin_snapshot(&snapshot);
            }
        }
    });

    handle
}

fn log_admin_snapshot(snapshot: &AdminSnapshot) {
    info!(
        total_users = snapshot.total_users(),
        total_events = snapshot.total_events(),
        pending_approvals = snapshot.pending_events.len(),
        total_revenue = %format_money(snapshot.total_revenue),
        generated_at = %format_timestamp(snapshot.generated_at),
        "Admin dashboard"
    );
}

/// Wait for Ctrl+C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        () = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
