//! LanClub server: session time-accounting backend for a LAN club.
//!
//! Loads configuration, prepares the SQLite database and hands over to the
//! API crate, which runs until Ctrl+C or SIGTERM.

use tracing_subscriber::{EnvFilter, fmt};

use lanclub_core::config::AppConfig;
use lanclub_core::error::AppError;
use lanclub_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `config/{env}.toml` overlay and
/// `LANCLUB__*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let base = std::env::var("LANCLUB_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("LANCLUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(base.trim_end_matches(".toml"), &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter_directive()));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting LanClub server");

    tracing::info!(url = %config.database.url, "Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    lanclub_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    lanclub_api::run_server(config, db.into_pool()).await
}
