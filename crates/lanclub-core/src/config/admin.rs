//! Primary administrator configuration.

use serde::{Deserialize, Serialize};

/// Credentials of the primary administrator.
///
/// Admin endpoints authenticate with HTTP Basic against these values. The
/// account named here can never be deleted through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Admin login name.
    #[serde(default = "default_username")]
    pub username: String,
    /// Argon2id PHC string of the admin password (see `lanclub hash-password`).
    ///
    /// Empty disables every admin endpoint.
    #[serde(default)]
    pub password_hash: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password_hash: String::new(),
        }
    }
}

fn default_username() -> String {
    "admin".to_string()
}
