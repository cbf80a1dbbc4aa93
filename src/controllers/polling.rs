use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::domain::polling::{AppConfig, ConfigureAppRequest, PollingManager};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::ReviewStore;

pub struct PollingController {
    store: Arc<dyn ReviewStore>,
    manager: Arc<PollingManager>,
    default_poll_interval_secs: i64,
}

impl PollingController {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        manager: Arc<PollingManager>,
        default_poll_interval_secs: i64,
    ) -> Self {
        Self {
            store,
            manager,
            default_poll_interval_secs,
        }
    }

    /// POST /api/apps/:appId/configure - Set an app's polling configuration
    pub async fn configure_app(
        State(controller): State<Arc<PollingController>>,
        Path(app_id): Path<String>,
        Json(request): Json<ConfigureAppRequest>,
    ) -> AppResult<Json<serde_json::Value>> {
        let poll_interval_secs = match request.poll_interval_secs {
            Some(secs) if secs <= 0 => {
                return Err(AppError::BadRequest(
                    "poll_interval_secs must be positive".to_string(),
                ));
            }
            Some(secs) => secs,
            None => controller.default_poll_interval_secs,
        };

        let is_active = request.is_active.unwrap_or(true);

        let config = AppConfig {
            app_id: app_id.clone(),
            poll_interval_secs,
            last_poll: None,
            is_active,
        };

        controller.store.upsert_app_config(&config).await?;

        if is_active {
            if let Some(interval) = config.poll_interval() {
                controller.manager.start_polling(&app_id, interval).await;
            }
        } else {
            controller.manager.stop_polling(&app_id).await;
        }

        Ok(Json(json!({
            "message": "Configuration updated successfully",
            "config": config,
        })))
    }

    /// GET /api/polling/status - Snapshot of the live poller set
    pub async fn polling_status(
        State(controller): State<Arc<PollingController>>,
    ) -> Json<serde_json::Value> {
        let status = controller.manager.polling_status().await;

        Json(json!({ "polling_status": status }))
    }
}
