//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use lanclub_core::config::AppConfig;
use lanclub_core::error::{AppError, ErrorKind};
use lanclub_database::DatabasePool;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// List migrations already applied to the database
    Status,
}

#[derive(Debug, Serialize, Tabled, sqlx::FromRow)]
struct AppliedMigration {
    version: i64,
    description: String,
    installed_on: String,
    success: bool,
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            lanclub_database::migration::run_migrations(db.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let applied: Vec<AppliedMigration> = sqlx::query_as(
                "SELECT version, description, CAST(installed_on AS TEXT) AS installed_on, success \
                 FROM _sqlx_migrations ORDER BY version",
            )
            .fetch_all(db.pool())
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to read migration history (run `migrate run` first)",
                    e,
                )
            })?;
            output::print_list(&applied, format);
        }
    }

    db.close().await;
    Ok(())
}
