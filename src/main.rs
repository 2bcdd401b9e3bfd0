//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `datastore_export` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use datastore_export::config::Opt;
use datastore_export::initialization::init_logger_with;
use datastore_export::{start_server, Config, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from(Opt::parse());

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let store = SqliteStore::open(&config.db_path)
        .await
        .with_context(|| format!("Failed to open datastore at {}", config.db_path.display()))?;

    start_server(&config, Arc::new(store))
        .await
        .context("Datastore server failed")?;

    Ok(())
}
