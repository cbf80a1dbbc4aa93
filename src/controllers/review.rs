use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::review::{ReviewsMeta, ReviewsResponse};
use crate::error::AppResult;
use crate::infrastructure::repositories::ReviewStore;

const DEFAULT_HOURS: i64 = 48;
const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub hours: Option<i64>,
    pub limit: Option<i64>,
}

pub struct ReviewController {
    store: Arc<dyn ReviewStore>,
}

impl ReviewController {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// GET /api/reviews/:appId - List recent reviews for an app
    pub async fn get_reviews(
        State(controller): State<Arc<ReviewController>>,
        Path(app_id): Path<String>,
        Query(query): Query<ReviewsQuery>,
    ) -> AppResult<Json<ReviewsResponse>> {
        let hours = query.hours.filter(|h| *h > 0).unwrap_or(DEFAULT_HOURS);
        let limit = query
            .limit
            .filter(|l| *l > 0 && *l <= MAX_LIMIT)
            .unwrap_or(DEFAULT_LIMIT);

        let reviews = controller.store.get_reviews(&app_id, hours, limit).await?;

        let meta = ReviewsMeta {
            app_id,
            hours,
            count: reviews.len(),
        };

        Ok(Json(ReviewsResponse { reviews, meta }))
    }
}
