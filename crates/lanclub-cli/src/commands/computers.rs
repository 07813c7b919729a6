//! Computer registry commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use lanclub_core::config::AppConfig;
use lanclub_core::error::AppError;

/// Arguments for computer commands
#[derive(Debug, Args)]
pub struct ComputersArgs {
    /// Computer subcommand
    #[command(subcommand)]
    pub command: ComputersCommand,
}

/// Computer subcommands
#[derive(Debug, Subcommand)]
pub enum ComputersCommand {
    /// Show every machine with its live status
    List,
    /// Mark machines with no recent heartbeat as disconnected
    Sweep,
}

#[derive(Debug, Serialize, Tabled)]
struct ComputerRow {
    pc_name: String,
    status: String,
    online: bool,
    user: String,
    time_left: String,
    package: String,
    last_heartbeat: String,
}

/// Execute computer commands
pub async fn execute(
    args: &ComputersArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let state = lanclub_api::build_state(config.clone(), pool);

    match &args.command {
        ComputersCommand::List => {
            let rows: Vec<ComputerRow> = state
                .registry_service
                .list_computers()
                .await?
                .into_iter()
                .map(|c| ComputerRow {
                    pc_name: c.pc_name,
                    status: c.status.as_str().to_string(),
                    online: c.online,
                    user: c.current_user.unwrap_or_default(),
                    time_left: output::format_duration(c.time_remaining),
                    package: c.session_name.unwrap_or_default(),
                    last_heartbeat: c
                        .last_heartbeat
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "never".to_string()),
                })
                .collect();
            output::print_list(&rows, format);
        }
        ComputersCommand::Sweep => {
            let swept = state.registry_service.sweep_stale().await?;
            output::print_success(&format!("{swept} machine(s) marked disconnected"));
        }
    }

    Ok(())
}
