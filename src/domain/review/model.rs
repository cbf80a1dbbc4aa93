use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single customer review. The id is supplied by the feed provider and is
/// the dedup key; rows are immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: String,
    pub app_id: String,
    pub author: String,
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
