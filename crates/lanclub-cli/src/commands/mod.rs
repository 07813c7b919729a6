//! CLI command definitions and dispatch.

pub mod account;
pub mod computers;
pub mod kiosk;
pub mod migrate;
pub mod password;
pub mod serve;

use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use crate::output::OutputFormat;
use lanclub_core::config::AppConfig;
use lanclub_core::error::AppError;
use lanclub_database::DatabasePool;

/// LanClub: session time accounting for LAN clubs
#[derive(Debug, Parser)]
#[command(name = "lanclub", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from config/{env}.toml
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the LanClub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Customer account management
    Account(account::AccountArgs),
    /// Computer registry
    Computers(computers::ComputersArgs),
    /// Hash a password for the admin.password_hash setting
    HashPassword(password::HashPasswordArgs),
    /// Headless kiosk client
    Kiosk(kiosk::KioskArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.load_config()?).await,
            Commands::Migrate(args) => {
                migrate::execute(args, &self.load_config()?, self.format).await
            }
            Commands::Account(args) => {
                account::execute(args, &self.load_config()?, self.format).await
            }
            Commands::Computers(args) => {
                computers::execute(args, &self.load_config()?, self.format).await
            }
            Commands::HashPassword(args) => password::execute(args),
            Commands::Kiosk(args) => kiosk::execute(args, &self.load_config()?, self.format).await,
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        load_config(&self.config, &self.env)
    }
}

/// Helper: load configuration from file
pub fn load_config(base: &str, env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(base.trim_end_matches(".toml"), env)
}

/// Helper: create a migrated database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<SqlitePool, AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    lanclub_database::migration::run_migrations(db.pool()).await?;
    Ok(db.into_pool())
}

/// Helper: prompt for a value unless it was given on the command line.
pub fn prompt_password(given: Option<&String>, prompt: &str, confirm: bool) -> Result<String, AppError> {
    if let Some(p) = given {
        return Ok(p.clone());
    }
    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_topup_parses() {
        let cli = Cli::try_parse_from(["lanclub", "account", "topup", "alice", "500"]).unwrap();
        match cli.command {
            Commands::Account(args) => match args.command {
                account::AccountCommand::Topup { username, amount } => {
                    assert_eq!(username, "alice");
                    assert_eq!(amount, 500);
                }
                other => panic!("unexpected command: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "lanclub", "--format", "json", "--env", "production", "computers", "list",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.env, "production");
    }

    #[test]
    fn test_kiosk_requires_username() {
        assert!(Cli::try_parse_from(["lanclub", "kiosk", "run"]).is_err());
    }

    #[test]
    fn test_migrate_status_parses() {
        let cli = Cli::try_parse_from(["lanclub", "migrate", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Migrate(migrate::MigrateArgs {
                command: migrate::MigrateCommand::Status
            })
        ));
    }
}
