use chrono::Utc;

use super::schema::Database;
use super::types::{StoreError, User};

impl Database {
    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a user. Fails with [`StoreError::UniqueViolation`] if the name
    /// is taken.
    pub async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, created_at, updated_at)
            VALUES (?, ?, ?)
            RETURNING id, name, created_at, updated_at
        "#,
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    pub async fn get_user_by_name(&self, name: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::NotFound)
    }

    pub async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// Delete all users, feeds, follows and posts (the `reset` command).
    /// Feeds, follows and posts go via ON DELETE CASCADE.
    pub async fn reset(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, StoreError};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        assert_eq!(user.name, "alice");
        assert!(user.id > 0);

        let found = db.get_user_by_name("alice").await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_user_is_unique_violation() {
        let db = test_db().await;
        db.create_user("alice").await.unwrap();

        let err = db.create_user("alice").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let db = test_db().await;
        let err = db.get_user_by_name("nobody").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound), "got {err:?}");
    }

    #[tokio::test]
    async fn test_reset_cascades() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        let feed = db
            .create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();
        db.create_follow(user.id, feed.id).await.unwrap();

        db.reset().await.unwrap();

        assert!(db.all_users().await.unwrap().is_empty());
        assert!(db.all_feeds().await.unwrap().is_empty());
    }
}
