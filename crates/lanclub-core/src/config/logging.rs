//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Tracing subscriber settings shared by the server and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for LanClub's own targets: `trace`, `debug`, `info`, `warn`, `error`.
    #[serde(default = "default_level")]
    pub level: String,
    /// `json` for log shippers, anything else prints human-readable lines.
    #[serde(default = "default_format")]
    pub format: String,
    /// Level for sqlx statement logging, which is noisy at `info`.
    #[serde(default = "default_sqlx_level")]
    pub sqlx_level: String,
    /// Log one line per HTTP request.
    #[serde(default = "default_log_requests")]
    pub log_requests: bool,
}

impl LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> String {
        format!("{},sqlx={}", self.level, self.sqlx_level)
    }

    /// Whether output should be JSON lines.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            sqlx_level: default_sqlx_level(),
            log_requests: default_log_requests(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

fn default_sqlx_level() -> String {
    "warn".to_string()
}

fn default_log_requests() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_quiets_sqlx() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(config.filter_directive(), "debug,sqlx=warn");
        assert!(!config.is_json());
        assert!(
            LoggingConfig {
                format: "JSON".to_string(),
                ..LoggingConfig::default()
            }
            .is_json()
        );
    }
}
