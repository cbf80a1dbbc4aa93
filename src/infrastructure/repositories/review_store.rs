use async_trait::async_trait;

use crate::domain::polling::AppConfig;
use crate::domain::review::Review;
use crate::error::AppResult;

/// Persistence port consumed by the polling scheduler and the HTTP layer.
///
/// Implementations must be safe for concurrent use; the scheduler performs
/// no serialization of its own around store calls.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Store a review. Creating an id that already exists is a no-op.
    async fn create_review(&self, review: &Review) -> AppResult<()>;

    async fn review_exists(&self, id: &str) -> AppResult<bool>;

    /// Reviews for an app submitted within the trailing `hours` window,
    /// newest first.
    async fn get_reviews(&self, app_id: &str, hours: i64, limit: i64) -> AppResult<Vec<Review>>;

    async fn get_app_config(&self, app_id: &str) -> AppResult<Option<AppConfig>>;

    async fn upsert_app_config(&self, config: &AppConfig) -> AppResult<()>;

    /// Ids of all apps whose config marks them eligible for polling.
    async fn get_active_apps(&self) -> AppResult<Vec<String>>;
}
