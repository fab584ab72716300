//! The ingestion pipeline: periodically claim the least-recently-fetched
//! feed, retrieve it, and reconcile its items into deduplicated posts.
//!
//! Control flow runs one direction, one feed at a time:
//! [`Scraper`] → feed store (claim) → [`crate::feed::Fetcher`] →
//! [`reconcile`] → back to the loop. The only external trigger is the timer.

mod reconcile;
mod scraper;

pub use reconcile::{reconcile, ReconcileResult};
pub use scraper::{CycleOutcome, Scraper};
