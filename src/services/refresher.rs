//! Periodic dashboard refresh
//!
//! A background task re-runs a refresh action on a fixed interval and
//! publishes each result through a `watch` channel. Ticks run one after the
//! other and missed ticks are skipped, so refreshes never overlap. A failed
//! refresh is logged and the timer keeps going.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::utils::errors::Result;

pub type RefreshAction<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

pub struct DashboardRefresher<T> {
    action: RefreshAction<T>,
    interval: Duration,
}

impl<T> DashboardRefresher<T>
where
    T: Send + Sync + 'static,
{
    pub fn new<F>(interval: Duration, action: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T>> + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            interval,
        }
    }

    /// Run the action once, outside the schedule
    pub async fn refresh_now(&self) -> Result<T> {
        (self.action)().await
    }

    /// Spawn the refresh loop; the first refresh happens one interval from now
    pub fn start(self) -> RefreshHandle<T> {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn(run(self.action, self.interval, snapshot_tx, stop_rx));
        info!(interval_secs = self.interval.as_secs(), "Dashboard refresher started");

        RefreshHandle {
            snapshots: snapshot_rx,
            stop: stop_tx,
            task,
        }
    }
}

async fn run<T>(
    action: RefreshAction<T>,
    period: Duration,
    snapshots: watch::Sender<Option<Arc<T>>>,
    mut stop: watch::Receiver<bool>,
) where
    T: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                match action().await {
                    Ok(snapshot) => {
                        debug!("Dashboard snapshot refreshed");
                        snapshots.send_replace(Some(Arc::new(snapshot)));
                    }
                    Err(e) => warn!(error = %e, "Dashboard refresh failed"),
                }
            }
        }
    }

    info!("Dashboard refresher stopped");
}

/// Running refresher; dropping the handle also ends the loop
pub struct RefreshHandle<T> {
    snapshots: watch::Receiver<Option<Arc<T>>>,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<T> RefreshHandle<T> {
    /// Receiver of published snapshots; `None` until the first refresh succeeds
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Option<Arc<T>> {
        self.snapshots.borrow().clone()
    }

    /// Cancel the schedule and wait for the loop to exit
    pub async fn stop(self) {
        self.stop.send_replace(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Dashboard refresher task ended abnormally");
        }
    }
}
