use chrono::Utc;

use super::schema::Database;
use super::types::{Feed, FeedOverview, StoreError};

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Create a feed owned by `user_id`. Fails with
    /// [`StoreError::UniqueViolation`] if the url is already registered.
    pub async fn create_feed(
        &self,
        name: &str,
        url: &str,
        user_id: i64,
    ) -> Result<Feed, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query_as::<_, Feed>(
            r#"
            INSERT INTO feeds (name, url, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, url, user_id, last_fetched_at, created_at, updated_at
        "#,
        )
        .bind(name)
        .bind(url)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    pub async fn get_feed_by_url(&self, url: &str) -> Result<Feed, StoreError> {
        sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
            FROM feeds
            WHERE url = ?
        "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::NotFound)
    }

    /// All feeds with their owner's name resolved (the `feeds` listing).
    pub async fn all_feeds(&self) -> Result<Vec<FeedOverview>, StoreError> {
        sqlx::query_as::<_, FeedOverview>(
            r#"
            SELECT f.name AS name, f.url AS url, u.name AS owner
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.name
        "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    // ========================================================================
    // Selection & Claim
    // ========================================================================

    /// The feed whose `last_fetched_at` is oldest, never-fetched feeds first,
    /// ties broken by ascending id. Fails with [`StoreError::NotFound`] when
    /// no feeds are registered.
    pub async fn next_feed_to_fetch(&self) -> Result<Feed, StoreError> {
        sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
            FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST, id ASC
            LIMIT 1
        "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::NotFound)
    }

    /// Claim a feed: set `last_fetched_at` and `updated_at` to now and return
    /// the updated row. Fails with [`StoreError::NotFound`] if the feed was
    /// deleted concurrently.
    ///
    /// Called before the network fetch, so a feed that errors during fetch
    /// still rotates to the back of the queue (fairness over retries).
    pub async fn mark_feed_fetched(&self, feed_id: i64) -> Result<Feed, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query_as::<_, Feed>(
            r#"
            UPDATE feeds SET last_fetched_at = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, url, user_id, last_fetched_at, created_at, updated_at
        "#,
        )
        .bind(now)
        .bind(now)
        .bind(feed_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::NotFound)
    }
}
