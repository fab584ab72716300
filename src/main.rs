use anyhow::{Context, Result};
use clap::Parser;

use graze::cli::{self, Cli};
use graze::config::{self, Config};
use graze::storage::Database;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_dir = config::config_dir().context("HOME environment variable not set")?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("failed to create config directory")?;
    }
    let config_path = config_dir.join("config.toml");
    let mut config = Config::load(&config_path).context("failed to load configuration")?;

    let db_path = config.resolve_db_path(&config_dir);
    let db = Database::open(&db_path)
        .await
        .with_context(|| format!("failed to open database at {db_path}"))?;

    cli::run(cli.command, &db, &mut config, &config_path).await
}
