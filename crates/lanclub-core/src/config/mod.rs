//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every section carries serde defaults so a missing file still
//! yields a runnable configuration.

pub mod admin;
pub mod app;
pub mod client;
pub mod database;
pub mod logging;
pub mod payment;
pub mod registry;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::admin::AdminConfig;
pub use self::app::{CorsConfig, ServerConfig};
pub use self::client::ClientConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::payment::PaymentConfig;
pub use self::registry::RegistryConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
///
/// `LANCLUB__DATABASE__URL` overrides `database.url`.
pub const ENV_PREFIX: &str = "LANCLUB";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Primary administrator credentials.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Computer registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Payment webhook settings.
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Kiosk client runtime settings.
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with the `config/{env}.toml` overlay and
    /// environment variables prefixed with `LANCLUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration starting from an explicit base file.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        tracing::debug!(base, env, "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("client.process_denylist")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
