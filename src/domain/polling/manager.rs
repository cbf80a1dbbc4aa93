use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::error::PollingError;
use super::model::AppConfig;
use super::PollerStatus;
use crate::infrastructure::feed::ReviewFetcher;
use crate::infrastructure::repositories::ReviewStore;

/// Hard bound on one fetch-and-store cycle so a hung fetch cannot block the
/// next scheduled tick indefinitely or leak the worker.
const CYCLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Fetch attempts per cycle before the cycle is abandoned.
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// One schedulable unit of periodic work, bound to a single app id.
///
/// At most one instance exists per app id at any time; replacing a poller
/// stops the old instance before the new one is installed.
struct AppPoller {
    interval: Duration,
    stop: CancellationToken,
}

impl AppPoller {
    fn stop(&self) {
        self.stop.cancel();
    }
}

/// Single authority over which applications are polled and at what cadence.
///
/// Structural changes to the poller set (create, replace, remove) serialize
/// on the write lock; status snapshots take the read lock. Workers never
/// touch the set, so no lock is held across a suspension point.
pub struct PollingManager {
    store: Arc<dyn ReviewStore>,
    fetcher: Arc<dyn ReviewFetcher>,
    pollers: RwLock<HashMap<String, AppPoller>>,
    shutdown: CancellationToken,
}

impl PollingManager {
    pub fn new(store: Arc<dyn ReviewStore>, fetcher: Arc<dyn ReviewFetcher>) -> Self {
        Self {
            store,
            fetcher,
            pollers: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start a poller for every active app with a valid persisted config.
    ///
    /// Per-app problems (missing config, invalid interval, inactive flag)
    /// are logged and skipped; only a failure to list the active apps
    /// themselves aborts startup.
    pub async fn start_all(&self) -> Result<(), PollingError> {
        let active_apps = self.store.get_active_apps().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to get active apps");
            PollingError::Store(e.to_string())
        })?;

        tracing::info!(count = active_apps.len(), "Starting polling for active apps");

        if active_apps.is_empty() {
            tracing::info!("No active apps found, skipping polling startup");
            return Ok(());
        }

        for app_id in active_apps {
            match self.store.get_app_config(&app_id).await {
                Ok(Some(config)) if config.is_active => match config.poll_interval() {
                    Some(interval) => {
                        tracing::info!(
                            app_id = %app_id,
                            interval_secs = interval.as_secs(),
                            "Starting polling for app"
                        );
                        self.start_polling(&app_id, interval).await;
                    }
                    None => {
                        tracing::warn!(
                            app_id = %app_id,
                            interval_secs = config.poll_interval_secs,
                            "Skipping app with invalid polling interval"
                        );
                    }
                },
                Ok(Some(_)) => {
                    tracing::info!(app_id = %app_id, "App is not active, skipping");
                }
                Ok(None) => {
                    tracing::warn!(app_id = %app_id, "No config found for app");
                }
                Err(e) => {
                    tracing::error!(app_id = %app_id, error = %e, "Failed to get app config");
                }
            }
        }

        tracing::info!("Finished starting polling for all apps");
        Ok(())
    }

    /// Install a poller for `app_id`, fully stopping any existing one first
    /// so there is never more than one live timer per id. Zero intervals are
    /// rejected.
    pub async fn start_polling(&self, app_id: &str, interval: Duration) {
        if interval.is_zero() {
            tracing::error!(app_id = %app_id, "Invalid polling interval");
            return;
        }

        let mut pollers = self.pollers.write().await;

        if let Some(old) = pollers.remove(app_id) {
            old.stop();
        }

        let stop = self.shutdown.child_token();
        self.spawn_poller(app_id.to_string(), interval, stop.clone());

        pollers.insert(app_id.to_string(), AppPoller { interval, stop });

        tracing::info!(
            app_id = %app_id,
            interval_secs = interval.as_secs(),
            "Started polling"
        );
    }

    /// Stop and remove the poller for `app_id` if one exists. Idempotent.
    pub async fn stop_polling(&self, app_id: &str) {
        let mut pollers = self.pollers.write().await;

        if let Some(poller) = pollers.remove(app_id) {
            poller.stop();
            tracing::info!(app_id = %app_id, "Stopped polling");
        }
    }

    /// Signal global shutdown, then stop and remove every live poller.
    /// Called once at process termination.
    pub async fn stop_all(&self) {
        self.shutdown.cancel();

        let mut pollers = self.pollers.write().await;
        for (app_id, poller) in pollers.drain() {
            poller.stop();
            tracing::debug!(app_id = %app_id, "Stopped polling");
        }
    }

    /// Snapshot of the live poller set.
    pub async fn polling_status(&self) -> HashMap<String, PollerStatus> {
        let pollers = self.pollers.read().await;

        pollers
            .iter()
            .map(|(app_id, poller)| {
                (
                    app_id.clone(),
                    PollerStatus {
                        interval_secs: poller.interval.as_secs(),
                        active: true,
                    },
                )
            })
            .collect()
    }

    fn spawn_poller(&self, app_id: String, interval: Duration, stop: CancellationToken) {
        let store = Arc::clone(&self.store);
        let fetcher = Arc::clone(&self.fetcher);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            // The first tick completes immediately; missed ticks fire in
            // quick succession rather than being skipped, so a slow cycle
            // backs up instead of dropping a scheduled poll.
            let mut ticker = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        tracing::debug!(app_id = %app_id, "Poller stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        let cycle =
                            fetch_and_store(store.as_ref(), fetcher.as_ref(), &app_id, interval);
                        tokio::select! {
                            _ = shutdown.cancelled() => {
                                tracing::debug!(app_id = %app_id, "Shutdown during poll cycle");
                                return;
                            }
                            result = tokio::time::timeout(CYCLE_TIMEOUT, cycle) => {
                                if result.is_err() {
                                    tracing::error!(
                                        app_id = %app_id,
                                        timeout_secs = CYCLE_TIMEOUT.as_secs(),
                                        "Poll cycle timed out"
                                    );
                                }
                            }
                        }
                    }
                }
            }
        });
    }
}

/// One fetch → dedup → store → update-last-poll cycle for a single app.
async fn fetch_and_store(
    store: &dyn ReviewStore,
    fetcher: &dyn ReviewFetcher,
    app_id: &str,
    interval: Duration,
) {
    let reviews = match fetcher.fetch_with_retry(app_id, MAX_FETCH_ATTEMPTS).await {
        Ok(reviews) => reviews,
        Err(e) => {
            tracing::error!(app_id = %app_id, error = %e, "Failed to fetch reviews");
            return;
        }
    };

    let mut stored = 0;
    for review in &reviews {
        match store.review_exists(&review.id).await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = store.create_review(review).await {
                    tracing::error!(
                        review_id = %review.id,
                        error = %e,
                        "Failed to store review"
                    );
                    continue;
                }
                stored += 1;
            }
            Err(e) => {
                tracing::error!(
                    review_id = %review.id,
                    error = %e,
                    "Failed to check review existence"
                );
            }
        }
    }

    // Records that a poll was attempted, independent of how many new
    // reviews were found.
    let config = AppConfig {
        app_id: app_id.to_string(),
        poll_interval_secs: interval.as_secs() as i64,
        last_poll: Some(Utc::now()),
        is_active: true,
    };

    if let Err(e) = store.upsert_app_config(&config).await {
        tracing::error!(app_id = %app_id, error = %e, "Failed to update app config");
    }

    tracing::info!(
        app_id = %app_id,
        fetched = reviews.len(),
        stored,
        "Polling completed"
    );
}
