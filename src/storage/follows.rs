use chrono::Utc;

use super::schema::Database;
use super::types::{FollowSummary, StoreError};

impl Database {
    // ========================================================================
    // Follow Operations
    // ========================================================================

    /// Follow a feed. Fails with [`StoreError::UniqueViolation`] if the user
    /// already follows it.
    pub async fn create_follow(
        &self,
        user_id: i64,
        feed_id: i64,
    ) -> Result<FollowSummary, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO feed_follows (user_id, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
        "#,
        )
        .bind(user_id)
        .bind(feed_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        sqlx::query_as::<_, FollowSummary>(
            r#"
            SELECT f.name AS feed_name, u.name AS user_name
            FROM feeds f, users u
            WHERE f.id = ? AND u.id = ?
        "#,
        )
        .bind(feed_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// Stop following the feed at `url`. Fails with [`StoreError::NotFound`]
    /// if the user was not following it.
    pub async fn delete_follow_by_url(&self, user_id: i64, url: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM feed_follows
            WHERE user_id = ?
              AND feed_id = (SELECT id FROM feeds WHERE url = ?)
        "#,
        )
        .bind(user_id)
        .bind(url)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Names of the feeds a user follows (the `following` listing).
    pub async fn follows_for_user(&self, user_id: i64) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT f.name
            FROM feed_follows ff
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = ?
            ORDER BY f.name
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
