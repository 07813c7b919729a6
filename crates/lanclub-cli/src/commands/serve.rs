//! Start the LanClub server.

use clap::Args;

use lanclub_core::config::AppConfig;
use lanclub_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Disable the background scheduler
    #[arg(long)]
    pub no_worker: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config: &AppConfig) -> Result<(), AppError> {
    let mut config = config.clone();

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_worker {
        config.worker.enabled = false;
    }

    println!("Starting LanClub server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    let pool = super::create_db_pool(&config).await?;
    lanclub_api::run_server(config, pool).await
}
