//! SSO Server: credential and session-token authority.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use sso_api::AppState;
use sso_core::config::{AppConfig, StoreProvider};
use sso_core::error::AppError;
use sso_database::migration::run_migrations;
use sso_database::{CredentialStore, DatabasePool, MemoryCredentialStore, PgCredentialStore};

/// SSO server command line.
#[derive(Debug, Parser)]
#[command(name = "sso-server", version, about = "Credential and session-token authority")]
struct Cli {
    /// Directory holding `default.toml` and the environment overlays
    #[arg(long, default_value = "config", global = true)]
    config_dir: String,

    /// Environment overlay to apply on top of `default.toml`
    #[arg(long, default_value = "development", global = true)]
    env: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Delete expired password reset grants and exit
    PurgeResetGrants,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(&config).await,
        Command::PurgeResetGrants => purge_reset_grants(&config).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "SSO server failed");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = ?config.database.provider,
        "Starting SSO server"
    );

    let (store, db_pool) = open_store(&config).await?;
    let state = AppState::new(config, store, db_pool);
    sso_api::run_server(state).await
}

async fn migrate(config: &AppConfig) -> Result<(), AppError> {
    if config.database.provider != StoreProvider::Postgres {
        return Err(AppError::configuration(
            "Migrations require database.provider = \"postgres\"",
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    pool.close().await;
    Ok(())
}

async fn purge_reset_grants(config: &AppConfig) -> Result<(), AppError> {
    let (store, db_pool) = open_store(config).await?;
    let removed = store.purge_expired_reset_grants().await?;
    tracing::info!(removed, "Expired password reset grants purged");

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    Ok(())
}

/// Opens the configured credential store, migrating PostgreSQL first.
async fn open_store(
    config: &AppConfig,
) -> Result<(Arc<dyn CredentialStore>, Option<DatabasePool>), AppError> {
    match config.database.provider {
        StoreProvider::Memory => {
            tracing::warn!("Using the in-memory credential store; users are lost on restart");
            Ok((Arc::new(MemoryCredentialStore::new()), None))
        }
        StoreProvider::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            run_migrations(pool.pool()).await?;
            let store = PgCredentialStore::new(pool.pool().clone());
            Ok((Arc::new(store), Some(pool)))
        }
    }
}
