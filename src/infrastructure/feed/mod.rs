pub mod itunes;

pub use itunes::{ItunesFeedClient, DEFAULT_FEED_BASE_URL};

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::review::Review;

/// Backoff unit for the linear retry schedule (1, 2, 3, ... units).
const RETRY_BACKOFF_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<FeedError>,
    },
}

/// Retrieves and parses the current review feed for one application.
#[async_trait]
pub trait ReviewFetcher: Send + Sync {
    /// Issue a single fetch against the provider.
    async fn fetch(&self, app_id: &str) -> Result<Vec<Review>, FeedError>;

    /// Attempt `fetch` up to `max_attempts` times, sleeping
    /// `attempt x 1 unit` between failures (never after the last one).
    /// The sleep runs inside the caller's cycle future, so cancelling the
    /// cycle drops the sleep immediately.
    async fn fetch_with_retry(
        &self,
        app_id: &str,
        max_attempts: u32,
    ) -> Result<Vec<Review>, FeedError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.fetch(app_id).await {
                Ok(reviews) => return Ok(reviews),
                Err(err) if attempt < max_attempts => {
                    let backoff = RETRY_BACKOFF_UNIT * attempt;
                    tracing::warn!(
                        app_id = %app_id,
                        attempt,
                        backoff_secs = backoff.as_secs(),
                        error = %err,
                        "Feed fetch failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => {
                    return Err(FeedError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
            }
        }
    }
}
