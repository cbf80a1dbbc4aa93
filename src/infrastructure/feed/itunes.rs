use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{FeedError, ReviewFetcher};
use crate::domain::review::Review;

/// Customer-reviews feed endpoint, templated on the app id.
pub const DEFAULT_FEED_BASE_URL: &str =
    "https://itunes.apple.com/us/rss/customerreviews/id={app_id}/sortBy=mostRecent/json";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the App Store customer-reviews feed.
pub struct ItunesFeedClient {
    client: reqwest::Client,
    base_url: String,
}

impl ItunesFeedClient {
    /// Create a client for the given feed URL template. The template must
    /// contain an `{app_id}` placeholder.
    pub fn new(base_url: String) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ReviewFetcher for ItunesFeedClient {
    async fn fetch(&self, app_id: &str) -> Result<Vec<Review>, FeedError> {
        let url = self.base_url.replace("{app_id}", app_id);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let document: FeedDocument = response.json().await?;

        Ok(parse_entries(document, app_id))
    }
}

/// Parse feed entries into review candidates. A malformed entry is dropped
/// with a warning and never fails the whole fetch.
fn parse_entries(document: FeedDocument, app_id: &str) -> Vec<Review> {
    let mut reviews = Vec::new();

    for entry in document.feed.entry {
        // Leading entries without a rating are app metadata, not reviews.
        if reviews.is_empty() && entry.rating.is_none() {
            continue;
        }

        let rating = match entry
            .rating
            .as_ref()
            .and_then(|r| r.label.parse::<i32>().ok())
        {
            Some(rating) => rating,
            None => {
                tracing::warn!(
                    rating = ?entry.rating.as_ref().map(|r| r.label.as_str()),
                    "Invalid rating format"
                );
                continue;
            }
        };

        let submitted_at = match entry
            .updated
            .as_ref()
            .and_then(|u| DateTime::parse_from_rfc3339(&u.label).ok())
        {
            Some(date) => date.with_timezone(&Utc),
            None => {
                tracing::warn!(
                    date = ?entry.updated.as_ref().map(|u| u.label.as_str()),
                    "Invalid date format"
                );
                continue;
            }
        };

        let id = match entry.id {
            Some(id) => id.label,
            None => {
                tracing::warn!("Feed entry without id");
                continue;
            }
        };

        let title = entry.title.map(|t| t.label).filter(|t| !t.is_empty());

        reviews.push(Review {
            id,
            app_id: app_id.to_string(),
            author: entry.author.map(|a| a.name.label).unwrap_or_default(),
            rating,
            title,
            content: entry.content.map(|c| c.label).unwrap_or_default(),
            submitted_at,
            created_at: Utc::now(),
        });
    }

    reviews
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    feed: FeedBody,
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    #[serde(default)]
    entry: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: Option<Label>,
    author: Option<EntryAuthor>,
    #[serde(rename = "im:rating")]
    rating: Option<Label>,
    title: Option<Label>,
    content: Option<Label>,
    updated: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct EntryAuthor {
    name: Label,
}

#[derive(Debug, Deserialize)]
struct Label {
    label: String,
}
