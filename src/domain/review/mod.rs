pub mod model;

pub use model::Review;

use serde::{Deserialize, Serialize};

/// Response envelope for the reviews listing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
    pub meta: ReviewsMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsMeta {
    pub app_id: String,
    pub hours: i64,
    pub count: usize,
}
