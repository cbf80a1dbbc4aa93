pub mod request_id;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, polling::PollingController, review::ReviewController};
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use request_id::request_id_middleware;

/// Start the HTTP server with all routes configured. Returns once the
/// shutdown future resolves and in-flight requests have drained.
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    review_controller: Arc<ReviewController>,
    polling_controller: Arc<PollingController>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    // Review routes
    let review_routes = Router::new()
        .route("/api/reviews/:appId", get(ReviewController::get_reviews))
        .with_state(review_controller);

    // Polling configuration and status routes
    let polling_routes = Router::new()
        .route(
            "/api/apps/:appId/configure",
            post(PollingController::configure_app),
        )
        .route("/api/polling/status", get(PollingController::polling_status))
        .with_state(polling_controller);

    // Build application routes
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool.clone())
        .merge(review_routes)
        .merge(polling_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
