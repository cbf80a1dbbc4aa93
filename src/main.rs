use std::sync::Arc;
use storepulse_backend::controllers::{polling::PollingController, review::ReviewController};
use storepulse_backend::domain::polling::PollingManager;
use storepulse_backend::infrastructure::config::{Config, LogFormat};
use storepulse_backend::infrastructure::db::{check_connection, create_pool, migrate};
use storepulse_backend::infrastructure::feed::{ItunesFeedClient, ReviewFetcher};
use storepulse_backend::infrastructure::http::start_http_server;
use storepulse_backend::infrastructure::repositories::{PostgresReviewStore, ReviewStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting StorePulse Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection and create the schema if needed
    check_connection(&pool).await?;
    migrate(&pool).await?;
    tracing::info!("Database connection verified");

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate the store (inject db pool)
    let store: Arc<dyn ReviewStore> = Arc::new(PostgresReviewStore::new(pool.clone()));

    // 2. Instantiate the review feed client
    let fetcher: Arc<dyn ReviewFetcher> =
        Arc::new(ItunesFeedClient::new(config.feed_base_url.clone())?);

    // 3. Instantiate the polling manager and start pollers for active apps.
    //    A startup polling failure is not fatal; the HTTP API still serves.
    let polling_manager = Arc::new(PollingManager::new(store.clone(), fetcher.clone()));
    if let Err(e) = polling_manager.start_all().await {
        tracing::error!(error = %e, "Failed to start polling for active apps");
    }

    // 4. Instantiate controllers (inject store and manager)
    let review_controller = Arc::new(ReviewController::new(store.clone()));
    let polling_controller = Arc::new(PollingController::new(
        store.clone(),
        polling_manager.clone(),
        config.default_poll_interval_secs,
    ));

    // Start HTTP server; returns once the shutdown signal fires and
    // in-flight requests have drained
    start_http_server(
        pool,
        config,
        review_controller,
        polling_controller,
        shutdown_signal(),
    )
    .await?;

    // Stop all pollers before exiting
    polling_manager.stop_all().await;
    tracing::info!("Server exited");

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "storepulse_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "storepulse_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutting down server...");
}
