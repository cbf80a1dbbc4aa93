use std::sync::Arc;

use async_trait::async_trait;

use super::review_store::ReviewStore;
use crate::domain::polling::AppConfig;
use crate::domain::review::Review;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;

pub struct PostgresReviewStore {
    pool: Arc<DbPool>,
}

impl PostgresReviewStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PostgresReviewStore {
    /// Store a review, ignoring duplicates by id
    async fn create_review(&self, review: &Review) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO reviews (id, app_id, author, rating, title, content, submitted_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&review.id)
        .bind(&review.app_id)
        .bind(&review.author)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.content)
        .bind(review.submitted_at)
        .bind(review.created_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn review_exists(&self, id: &str) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reviews
                WHERE id = $1
            )
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    async fn get_reviews(&self, app_id: &str, hours: i64, limit: i64) -> AppResult<Vec<Review>> {
        let pool = self.pool.as_ref();
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, app_id, author, rating, title, content, submitted_at, created_at
            FROM reviews
            WHERE app_id = $1 AND submitted_at >= NOW() - make_interval(hours => $2::int)
            ORDER BY submitted_at DESC
            LIMIT $3
            "#,
        )
        .bind(app_id)
        .bind(hours)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    async fn get_app_config(&self, app_id: &str) -> AppResult<Option<AppConfig>> {
        let pool = self.pool.as_ref();
        let config = sqlx::query_as::<_, AppConfig>(
            r#"
            SELECT app_id, poll_interval_secs, last_poll, is_active
            FROM app_configs
            WHERE app_id = $1
            "#,
        )
        .bind(app_id)
        .fetch_optional(pool)
        .await?;

        Ok(config)
    }

    async fn upsert_app_config(&self, config: &AppConfig) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO app_configs (app_id, poll_interval_secs, last_poll, is_active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (app_id) DO UPDATE
            SET poll_interval_secs = EXCLUDED.poll_interval_secs,
                last_poll = EXCLUDED.last_poll,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(&config.app_id)
        .bind(config.poll_interval_secs)
        .bind(config.last_poll)
        .bind(config.is_active)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn get_active_apps(&self) -> AppResult<Vec<String>> {
        let pool = self.pool.as_ref();
        let app_ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT app_id FROM app_configs
            WHERE is_active = TRUE
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(app_ids)
    }
}
