use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-app polling configuration. Source of truth for the scheduler at
/// startup only; live pollers hold their own interval copy thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppConfig {
    pub app_id: String,
    pub poll_interval_secs: i64,
    pub last_poll: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl AppConfig {
    /// The schedulable interval, or `None` when the persisted value is not
    /// positive (an invalid schedule is never silently defaulted).
    pub fn poll_interval(&self) -> Option<Duration> {
        if self.poll_interval_secs > 0 {
            Some(Duration::from_secs(self.poll_interval_secs as u64))
        } else {
            None
        }
    }
}
