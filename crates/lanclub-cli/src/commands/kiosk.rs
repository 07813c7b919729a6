//! Headless kiosk client: runs a session against a LanClub server from the
//! terminal.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output::{self, OutputFormat};
use lanclub_client::protocol::PackageInfo;
use lanclub_client::{
    BackendClient, ClientError, ClientRuntime, Command, ExpiryHandler, HttpBackend, PackageChoice,
    UiEvent,
};
use lanclub_core::config::{AppConfig, ClientConfig};
use lanclub_core::error::AppError;

/// Arguments for kiosk commands
#[derive(Debug, Args)]
pub struct KioskArgs {
    /// Kiosk subcommand
    #[command(subcommand)]
    pub command: KioskCommand,

    /// Override client.server_url
    #[arg(long, global = true)]
    pub server: Option<String>,
}

/// Kiosk subcommands
#[derive(Debug, Subcommand)]
pub enum KioskCommand {
    /// Log in and run a session, reading commands from stdin
    Run {
        /// Account to log in as
        #[arg(short, long)]
        username: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
        /// Override client.pc_name
        #[arg(long)]
        pc_name: Option<String>,
    },
    /// Show the package catalog
    Packages,
}

/// One line typed at the kiosk prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KioskInput {
    Buy(String),
    Sync,
    Launch(String),
    Packages,
    Quit,
    Help,
}

fn parse_line(line: &str) -> Option<KioskInput> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_lowercase().as_str() {
        "buy" if !rest.is_empty() => Some(KioskInput::Buy(rest.to_string())),
        "launch" if !rest.is_empty() => Some(KioskInput::Launch(rest.to_string())),
        "sync" => Some(KioskInput::Sync),
        "packages" => Some(KioskInput::Packages),
        "quit" | "exit" | "logout" => Some(KioskInput::Quit),
        "help" | "?" => Some(KioskInput::Help),
        _ => None,
    }
}

/// Pick a package by 1-based catalog index or by case-insensitive name.
fn find_package<'a>(packages: &'a [PackageInfo], wanted: &str) -> Option<&'a PackageInfo> {
    if let Ok(index) = wanted.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| packages.get(i));
    }
    packages
        .iter()
        .find(|p| p.name.to_lowercase() == wanted.to_lowercase())
}

#[derive(Debug, Serialize, Tabled)]
struct PackageRow {
    #[tabled(rename = "#")]
    index: usize,
    name: String,
    duration: String,
    price: i64,
}

fn package_rows(packages: &[PackageInfo]) -> Vec<PackageRow> {
    packages
        .iter()
        .enumerate()
        .map(|(i, p)| PackageRow {
            index: i + 1,
            name: p.name.clone(),
            duration: output::format_duration(p.seconds),
            price: p.price,
        })
        .collect()
}

fn to_app_error(err: ClientError) -> AppError {
    match err {
        ClientError::Network(m) => AppError::service_unavailable(m),
        ClientError::Validation(m) => AppError::validation(m),
        ClientError::InsufficientFunds(m) => AppError::insufficient_funds(m),
        ClientError::NotFound(m) => AppError::not_found(m),
        ClientError::Conflict(m) => AppError::conflict(m),
        ClientError::Server(m) => AppError::internal(m),
    }
}

fn render(event: &UiEvent) {
    match event {
        UiEvent::Tick { remaining } => {
            if remaining % 60 == 0 || *remaining <= 10 {
                println!("  time left {}", output::format_duration(*remaining));
            }
        }
        UiEvent::Warning { remaining } => output::print_warning(&format!(
            "{} left, buy more time to keep playing",
            output::format_duration(*remaining)
        )),
        UiEvent::SessionStarted { time_left } => output::print_success(&format!(
            "Session started, {} left",
            output::format_duration(*time_left)
        )),
        UiEvent::TimeAdjusted { time_left } => println!(
            "  time corrected to {}",
            output::format_duration(*time_left)
        ),
        UiEvent::BalanceUpdated { balance } => println!("  balance {balance}"),
        UiEvent::PurchaseControls { enabled } => {
            if !enabled {
                println!("  purchasing...");
            }
        }
        UiEvent::PurchaseSucceeded {
            new_balance,
            new_time,
        } => output::print_success(&format!(
            "Purchase complete: balance {new_balance}, time left {}",
            output::format_duration(*new_time)
        )),
        UiEvent::PurchaseFailed { message } => {
            output::print_error(&format!("Purchase failed: {message}"))
        }
        UiEvent::Offline { time_left } => output::print_warning(&format!(
            "Server unreachable, continuing offline with {}",
            output::format_duration(*time_left)
        )),
        UiEvent::SyncFailed { message } => tracing::debug!(message = %message, "Sync failed"),
        UiEvent::SessionEnded => output::print_warning("Time is up, session ended"),
        UiEvent::LoggedOut => output::print_success("Logged out"),
    }
}

fn print_help() {
    println!("Commands: buy <#|name>, launch <app>, sync, packages, quit");
}

/// Execute kiosk commands
pub async fn execute(
    args: &KioskArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut client_config: ClientConfig = config.client.clone();
    if let Some(ref server) = args.server {
        client_config.server_url = server.clone();
    }
    let backend = HttpBackend::new(&client_config).map_err(to_app_error)?;

    match &args.command {
        KioskCommand::Packages => {
            let packages = backend.packages().await.map_err(to_app_error)?;
            output::print_list(&package_rows(&packages), format);
            Ok(())
        }
        KioskCommand::Run {
            username,
            password,
            pc_name,
        } => {
            if let Some(pc_name) = pc_name {
                client_config.pc_name = pc_name.clone();
            }
            let password = super::prompt_password(password.as_ref(), "Password", false)?;
            run_session(client_config, backend, username, &password, format).await
        }
    }
}

async fn run_session(
    client_config: ClientConfig,
    backend: HttpBackend,
    username: &str,
    password: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let status = backend
        .login(username, password)
        .await
        .map_err(to_app_error)?;
    output::print_success(&format!("Logged in as '{}'", status.username));
    output::print_kv("Balance", &status.balance.to_string());
    output::print_kv("Time left", &output::format_duration(status.time_left));

    let packages = backend.packages().await.map_err(to_app_error)?;
    output::print_list(&package_rows(&packages), format);
    print_help();

    let expiry = ExpiryHandler::system(client_config.process_denylist.clone());
    let (runtime, mut ui) =
        ClientRuntime::start(&client_config, username, Arc::new(backend), expiry);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = ui.recv() => match event {
                Some(event) => render(&event),
                None => break,
            },
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin closed");
                        break;
                    }
                };
                match parse_line(&line) {
                    Some(KioskInput::Buy(wanted)) => match find_package(&packages, &wanted) {
                        Some(p) => {
                            runtime
                                .send(Command::Purchase(PackageChoice {
                                    name: p.name.clone(),
                                    seconds: p.seconds,
                                    price: p.price,
                                }))
                                .await;
                        }
                        None => output::print_error(&format!("No package '{wanted}'")),
                    },
                    Some(KioskInput::Launch(app_name)) => {
                        runtime.send(Command::RecordLaunch { app_name }).await;
                    }
                    Some(KioskInput::Sync) => runtime.send(Command::SyncNow).await,
                    Some(KioskInput::Packages) => {
                        output::print_list(&package_rows(&packages), format)
                    }
                    Some(KioskInput::Quit) => break,
                    Some(KioskInput::Help) => print_help(),
                    None if line.trim().is_empty() => {}
                    None => print_help(),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    runtime.shutdown().await;
    while let Ok(event) = ui.try_recv() {
        render(&event);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<PackageInfo> {
        vec![
            PackageInfo {
                name: "1 час".into(),
                seconds: 3600,
                price: 350,
            },
            PackageInfo {
                name: "3 часа".into(),
                seconds: 10800,
                price: 700,
            },
        ]
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("buy 3 часа"),
            Some(KioskInput::Buy("3 часа".into()))
        );
        assert_eq!(parse_line("  SYNC "), Some(KioskInput::Sync));
        assert_eq!(
            parse_line("launch steam.exe"),
            Some(KioskInput::Launch("steam.exe".into()))
        );
        assert_eq!(parse_line("quit"), Some(KioskInput::Quit));
        assert_eq!(parse_line("buy"), None);
        assert_eq!(parse_line("dance"), None);
    }

    #[test]
    fn test_find_package_by_index_or_name() {
        let packages = catalog();
        assert_eq!(find_package(&packages, "2").unwrap().price, 700);
        assert_eq!(find_package(&packages, "1 ЧАС").unwrap().seconds, 3600);
        assert!(find_package(&packages, "0").is_none());
        assert!(find_package(&packages, "9").is_none());
        assert!(find_package(&packages, "5 часов").is_none());
    }

    #[test]
    fn test_client_errors_map_to_app_errors() {
        use lanclub_core::error::ErrorKind;
        assert_eq!(
            to_app_error(ClientError::InsufficientFunds("x".into())).kind,
            ErrorKind::InsufficientFunds
        );
        assert_eq!(
            to_app_error(ClientError::Network("x".into())).kind,
            ErrorKind::ServiceUnavailable
        );
    }
}
