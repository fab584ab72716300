use chrono::{DateTime, NaiveDateTime, Utc};

use crate::feed::RawFeedItem;
use crate::storage::{Database, NewPost, StoreError};

/// Per-batch accounting. Counts are reported to the log; they never fail the
/// cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Items stored as new posts
    pub accepted: usize,
    /// Items whose url was already known (or whose insert failed non-fatally)
    pub skipped: usize,
    /// Items whose publication date matched neither accepted format
    pub malformed: usize,
}

/// Fallback format for dates carrying a zone name instead of a numeric
/// offset ("Mon, 02 Jan 2006 15:04:05 MST"). The name is consumed and the
/// time interpreted as UTC.
const PUBDATE_NAMED_ZONE: &str = "%a, %d %b %Y %H:%M:%S %Z";

fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, PUBDATE_NAMED_ZONE).map(|dt| dt.and_utc()))
}

/// Convert raw feed items into posts, in document order, skipping items
/// already present.
///
/// Duplicate detection is insert-and-classify: the url UNIQUE constraint is
/// the source of truth, no pre-check read happens. A bad item never aborts
/// the batch; only a store-unavailable condition cuts the batch short.
pub async fn reconcile(db: &Database, feed_id: i64, items: &[RawFeedItem]) -> ReconcileResult {
    let mut result = ReconcileResult::default();

    for item in items {
        let raw_date = item.pub_date.as_deref().unwrap_or("");
        let published_at = match parse_pub_date(raw_date) {
            Ok(dt) => dt.timestamp(),
            Err(err) => {
                result.malformed += 1;
                tracing::warn!(
                    item = %item.title,
                    pub_date = raw_date,
                    error = %err,
                    "unparsable publication date, skipping item"
                );
                continue;
            }
        };

        // Empty description means "absent", not empty text
        let description = item
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(str::to_owned);

        let post = NewPost {
            feed_id,
            title: item.title.clone(),
            url: item.link.clone(),
            description,
            published_at,
        };

        match db.create_post(&post).await {
            Ok(()) => result.accepted += 1,
            Err(StoreError::UniqueViolation) => result.skipped += 1,
            Err(err @ StoreError::Unavailable(_)) => {
                tracing::error!(error = %err, "store unavailable, aborting batch");
                break;
            }
            Err(err) => {
                result.skipped += 1;
                tracing::warn!(url = %post.url, error = %err, "could not store post, skipping item");
            }
        }
    }

    result
}
