use sqlx::FromRow;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage-layer errors, classified so callers can branch on kind instead of
/// matching driver error text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist (or vanished concurrently).
    #[error("record not found")]
    NotFound,

    /// A UNIQUE constraint rejected the write. For posts this means the url
    /// is already known and the insert should be treated as a duplicate.
    #[error("unique constraint violation")]
    UniqueViolation,

    /// The store itself is unreachable (pool exhausted/closed, I/O failure).
    /// Distinguished from per-row errors so batch work can abort early.
    #[error("store unavailable: {0}")]
    Unavailable(sqlx::Error),

    /// Schema migration failed at open.
    #[error("database migration failed: {0}")]
    Migration(String),

    /// Any other database error.
    #[error("database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a sqlx error into the taxonomy above.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                StoreError::Unavailable(e)
            }
            other => StoreError::Other(other),
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A registered user. Owns feeds and follows.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A followable remote syndication source with its polling cadence state.
///
/// `last_fetched_at` is NULL until the feed is first claimed by the scraper;
/// it is only ever advanced, never cleared.
#[derive(Debug, Clone, FromRow)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub user_id: i64,
    pub last_fetched_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Feed listing row with the owner's name resolved (for `feeds`).
#[derive(Debug, Clone, FromRow)]
pub struct FeedOverview {
    pub name: String,
    pub url: String,
    pub owner: String,
}

/// Follow relation resolved to display names (for `follow`/`addfeed` output).
#[derive(Debug, Clone, FromRow)]
pub struct FollowSummary {
    pub feed_name: String,
    pub user_name: String,
}

/// A normalized post ready to insert. Produced by the reconciler from a raw
/// feed item; `description` is None when the document carried no usable text.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub feed_id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: i64,
}

/// A stored post, globally unique by url.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
