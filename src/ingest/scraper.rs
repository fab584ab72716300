use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::reconcile::{reconcile, ReconcileResult};
use crate::feed::Fetcher;
use crate::storage::{Database, StoreError};

/// What a single cycle did. Failures are already logged when this is
/// returned; the loop only uses it to keep going.
#[derive(Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No feeds registered; nothing to do until the next tick
    NoFeeds,
    /// The store rejected the claim for a systemic reason
    StoreFailed,
    /// The selected feed was deleted before it could be claimed
    FeedVanished,
    /// The network fetch failed; the feed is already marked fetched and
    /// waits a full rotation before its next attempt
    FetchFailed,
    /// The batch was reconciled
    Completed(ReconcileResult),
}

/// The orchestrator: one feed per tick, claim → fetch → reconcile, forever.
pub struct Scraper {
    db: Database,
    fetcher: Fetcher,
    period: Duration,
}

impl Scraper {
    pub fn new(db: Database, fetcher: Fetcher, period: Duration) -> Self {
        Self {
            db,
            fetcher,
            period,
        }
    }

    /// Run until the process is terminated. The first cycle starts
    /// immediately; a cycle that runs long delays the next tick rather than
    /// overlapping it.
    pub async fn run(self) {
        tracing::info!(period = ?self.period, "collecting feeds");
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.scrape_once().await;
        }
    }

    /// One full cycle. Never returns an error: every failure mode is logged
    /// and folded into the outcome so the loop always reaches the next tick.
    pub async fn scrape_once(&self) -> CycleOutcome {
        let feed = match self.db.next_feed_to_fetch().await {
            Ok(feed) => feed,
            Err(StoreError::NotFound) => {
                tracing::info!("no feeds registered yet, waiting for next tick");
                return CycleOutcome::NoFeeds;
            }
            Err(err) => {
                tracing::error!(error = %err, "could not select next feed");
                return CycleOutcome::StoreFailed;
            }
        };

        // Claim before fetching: a feed that errors below still rotates to
        // the back of the queue.
        let feed = match self.db.mark_feed_fetched(feed.id).await {
            Ok(feed) => feed,
            Err(StoreError::NotFound) => {
                tracing::warn!(feed = %feed.name, "feed deleted before it could be claimed");
                return CycleOutcome::FeedVanished;
            }
            Err(err) => {
                tracing::error!(feed = %feed.name, error = %err, "could not mark feed fetched");
                return CycleOutcome::StoreFailed;
            }
        };

        let parsed = match self.fetcher.fetch(&feed.url).await {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(feed = %feed.name, error = %err, "fetch failed");
                return CycleOutcome::FetchFailed;
            }
        };

        let result = reconcile(&self.db, feed.id, &parsed.items).await;
        tracing::info!(
            feed = %feed.name,
            accepted = result.accepted,
            skipped = result.skipped,
            malformed = result.malformed,
            "feed collected"
        );
        CycleOutcome::Completed(result)
    }
}
