//! The command surface: thin wrappers around the core that construct and
//! consume user, feed and post records.
//!
//! Dispatch is a fixed enumeration of command tags matched once in [`run`];
//! there is no name-keyed handler table. Commands that act on behalf of a
//! user resolve the configured name into an explicit [`User`] record up
//! front instead of reading ambient state deeper down.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::feed::{Fetcher, DEFAULT_TIMEOUT};
use crate::ingest::Scraper;
use crate::storage::{Database, StoreError, User};
use crate::util::validate_feed_url;

#[derive(Parser, Debug)]
#[command(name = "graze", about = "Follow RSS feeds and collect new posts on a schedule")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new user and log in
    Register { name: String },
    /// Log in as an existing user
    Login { name: String },
    /// Delete all users, feeds and posts
    Reset,
    /// List registered users
    Users,
    /// Run the aggregation loop, fetching one feed per interval
    Agg {
        /// Time between fetch cycles, e.g. "30s", "5m", "1h"
        interval: String,
    },
    /// Add a feed and follow it
    #[command(name = "addfeed")]
    AddFeed { name: String, url: String },
    /// List all feeds
    Feeds,
    /// Follow an existing feed
    Follow { url: String },
    /// Stop following a feed
    Unfollow { url: String },
    /// List the feeds you follow
    Following,
    /// Show the newest posts from feeds you follow
    Browse {
        /// Maximum number of posts to show
        limit: Option<i64>,
    },
}

const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// Dispatch a parsed command.
pub async fn run(
    command: Command,
    db: &Database,
    config: &mut Config,
    config_path: &Path,
) -> Result<()> {
    match command {
        Command::Register { name } => register(db, config, config_path, &name).await,
        Command::Login { name } => login(db, config, config_path, &name).await,
        Command::Reset => reset(db).await,
        Command::Users => users(db, config).await,
        Command::Agg { interval } => agg(db, &interval).await,
        Command::AddFeed { name, url } => add_feed(db, config, &name, &url).await,
        Command::Feeds => feeds(db).await,
        Command::Follow { url } => follow(db, config, &url).await,
        Command::Unfollow { url } => unfollow(db, config, &url).await,
        Command::Following => following(db, config).await,
        Command::Browse { limit } => browse(db, config, limit).await,
    }
}

/// Resolve the configured username into a user record. Commands acting on
/// behalf of a user call this first and pass the record along explicitly.
async fn require_user(db: &Database, config: &Config) -> Result<User> {
    let name = config
        .current_username
        .as_deref()
        .context("no user logged in; run `graze register <name>` or `graze login <name>` first")?;
    match db.get_user_by_name(name).await {
        Ok(user) => Ok(user),
        Err(StoreError::NotFound) => {
            bail!("logged-in user {name:?} no longer exists; register again")
        }
        Err(e) => Err(e).context("failed to look up current user"),
    }
}

/// Parse a human-readable interval like "30s", "5m" or "1h".
pub fn parse_interval(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let unit_at = raw
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("missing unit in interval {raw:?}, expected e.g. 30s, 5m, 1h"))?;
    let (digits, unit) = raw.split_at(unit_at);
    let value: u64 = digits
        .parse()
        .with_context(|| format!("invalid interval {raw:?}"))?;
    let secs = match unit {
        "s" => value,
        "m" => value * 60,
        "h" => value * 3600,
        other => bail!("unknown interval unit {other:?}, expected s, m or h"),
    };
    if secs == 0 {
        bail!("interval must be positive");
    }
    Ok(Duration::from_secs(secs))
}

// ============================================================================
// Handlers
// ============================================================================

async fn register(db: &Database, config: &mut Config, path: &Path, name: &str) -> Result<()> {
    let user = match db.create_user(name).await {
        Ok(user) => user,
        Err(StoreError::UniqueViolation) => bail!("user {name:?} already exists"),
        Err(e) => return Err(e).context("failed to create user"),
    };
    config.set_user(&user.name, path)?;
    println!("User created: {}", user.name);
    Ok(())
}

async fn login(db: &Database, config: &mut Config, path: &Path, name: &str) -> Result<()> {
    let user = match db.get_user_by_name(name).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => bail!("user {name:?} does not exist"),
        Err(e) => return Err(e).context("failed to look up user"),
    };
    config.set_user(&user.name, path)?;
    println!("Logged in as {}", user.name);
    Ok(())
}

async fn reset(db: &Database) -> Result<()> {
    db.reset().await.context("failed to reset database")?;
    println!("Database reset.");
    Ok(())
}

async fn users(db: &Database, config: &Config) -> Result<()> {
    let users = db.all_users().await.context("failed to list users")?;
    if users.is_empty() {
        println!("There are no users yet.");
        return Ok(());
    }
    for user in users {
        if config.current_username.as_deref() == Some(user.name.as_str()) {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}

async fn agg(db: &Database, interval: &str) -> Result<()> {
    let period = parse_interval(interval)?;
    let fetcher = Fetcher::new(DEFAULT_TIMEOUT).context("failed to build HTTP client")?;
    println!("Collecting feeds every {interval}");
    Scraper::new(db.clone(), fetcher, period).run().await;
    Ok(())
}

async fn add_feed(db: &Database, config: &Config, name: &str, url: &str) -> Result<()> {
    let user = require_user(db, config).await?;
    let url = validate_feed_url(url)?;

    let feed = match db.create_feed(name, url.as_str(), user.id).await {
        Ok(feed) => feed,
        Err(StoreError::UniqueViolation) => bail!("a feed with url {url} already exists"),
        Err(e) => return Err(e).context("failed to create feed"),
    };
    db.create_follow(user.id, feed.id)
        .await
        .context("failed to follow new feed")?;

    println!("Feed added: {} ({})", feed.name, feed.url);
    Ok(())
}

async fn feeds(db: &Database) -> Result<()> {
    let feeds = db.all_feeds().await.context("failed to list feeds")?;
    if feeds.is_empty() {
        println!("There are no feeds yet.");
        return Ok(());
    }
    for feed in feeds {
        println!("* {}\n  {}\n  added by {}", feed.name, feed.url, feed.owner);
    }
    Ok(())
}

async fn follow(db: &Database, config: &Config, url: &str) -> Result<()> {
    let user = require_user(db, config).await?;
    let feed = match db.get_feed_by_url(url).await {
        Ok(feed) => feed,
        Err(StoreError::NotFound) => bail!("no feed with url {url:?}; add it with `graze addfeed`"),
        Err(e) => return Err(e).context("failed to look up feed"),
    };

    match db.create_follow(user.id, feed.id).await {
        Ok(summary) => {
            println!("{} now follows {}", summary.user_name, summary.feed_name);
            Ok(())
        }
        Err(StoreError::UniqueViolation) => bail!("already following {}", feed.name),
        Err(e) => Err(e).context("failed to follow feed"),
    }
}

async fn unfollow(db: &Database, config: &Config, url: &str) -> Result<()> {
    let user = require_user(db, config).await?;
    match db.delete_follow_by_url(user.id, url).await {
        Ok(()) => {
            println!("Unfollowed {url}");
            Ok(())
        }
        Err(StoreError::NotFound) => bail!("not following {url:?}"),
        Err(e) => Err(e).context("failed to unfollow feed"),
    }
}

async fn following(db: &Database, config: &Config) -> Result<()> {
    let user = require_user(db, config).await?;
    let names = db
        .follows_for_user(user.id)
        .await
        .context("failed to list follows")?;
    if names.is_empty() {
        println!("You don't follow any feeds yet.");
        return Ok(());
    }
    println!("Feeds {} follows:", user.name);
    for name in names {
        println!("  * {name}");
    }
    Ok(())
}

async fn browse(db: &Database, config: &Config, limit: Option<i64>) -> Result<()> {
    let user = require_user(db, config).await?;
    let limit = limit.unwrap_or(DEFAULT_BROWSE_LIMIT);
    if limit <= 0 {
        bail!("limit must be positive");
    }

    let posts = db
        .posts_for_user(user.id, limit)
        .await
        .context("failed to load posts")?;
    println!("Found {} posts for {}:", posts.len(), user.name);
    for post in posts {
        println!("--- {} ---", post.title);
        if let Some(description) = &post.description {
            println!("    {description}");
        }
        println!("    Link: {}", post.url);
    }
    Ok(())
}
