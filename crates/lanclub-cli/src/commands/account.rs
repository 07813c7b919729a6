//! Customer account management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use lanclub_core::config::AppConfig;
use lanclub_core::error::AppError;
use lanclub_core::types::pagination::PageRequest;

const PERFORMED_BY: &str = "cli";

/// Arguments for account commands
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Account subcommand
    #[command(subcommand)]
    pub command: AccountCommand,
}

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create a customer account
    Create {
        /// Username
        username: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List accounts
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 25)]
        page_size: u64,
    },
    /// Show one account's balance and time
    Show {
        /// Username
        username: String,
    },
    /// Add money to an account
    Topup {
        /// Username
        username: String,
        /// Amount to add
        amount: i64,
    },
    /// Add time to an account without charging it
    Grant {
        /// Username
        username: String,
        /// Seconds to add
        seconds: i64,
    },
    /// Delete an account
    Delete {
        /// Username
        username: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    id: i64,
    username: String,
    balance: i64,
    time_left: String,
    version: i64,
    created_at: String,
}

/// Execute account commands
pub async fn execute(
    args: &AccountArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let state = lanclub_api::build_state(config.clone(), pool);

    match &args.command {
        AccountCommand::Create { username, password } => {
            let password = super::prompt_password(password.as_ref(), "Password", true)?;
            let status = state.account_service.register(username, &password).await?;
            output::print_success(&format!("Account '{}' created", status.username));
        }
        AccountCommand::List { page, page_size } => {
            let page = state
                .admin_service
                .list_accounts(PageRequest::new(*page, *page_size))
                .await?;
            let rows: Vec<AccountRow> = page
                .items
                .iter()
                .map(|a| AccountRow {
                    id: a.id,
                    username: a.username.clone(),
                    balance: a.balance,
                    time_left: output::format_duration(a.time_left),
                    version: a.version,
                    created_at: a.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {}/{} ({} accounts)",
                    page.page, page.total_pages, page.total_items
                );
            }
        }
        AccountCommand::Show { username } => {
            let status = state.account_service.status(username).await?;
            match format {
                OutputFormat::Json => output::print_item(&status, format),
                OutputFormat::Table => {
                    output::print_kv("Username", &status.username);
                    output::print_kv("Balance", &status.balance.to_string());
                    output::print_kv("Time left", &output::format_duration(status.time_left));
                    output::print_kv("Version", &status.version.to_string());
                }
            }
        }
        AccountCommand::Topup { username, amount } => {
            let outcome = state
                .admin_service
                .top_up(username, *amount, PERFORMED_BY)
                .await?;
            output::print_success(&format!(
                "Added {amount} to '{username}', balance is now {}",
                outcome.new_balance
            ));
        }
        AccountCommand::Grant { username, seconds } => {
            let status = state
                .admin_service
                .grant_time(username, *seconds, PERFORMED_BY)
                .await?;
            output::print_success(&format!(
                "Granted {} to '{username}', time left is now {}",
                output::format_duration(*seconds),
                output::format_duration(status.time_left)
            ));
        }
        AccountCommand::Delete { username, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete account '{username}'?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    output::print_warning("Cancelled.");
                    return Ok(());
                }
            }

            state
                .admin_service
                .delete_account(username, PERFORMED_BY)
                .await?;
            output::print_success(&format!("Account '{username}' deleted"));
        }
    }

    Ok(())
}
