//! Payment webhook configuration.

use serde::{Deserialize, Serialize};

/// Kaspi payment webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Whether the webhook endpoint accepts credits.
    #[serde(default)]
    pub enabled: bool,
    /// Shared secret for the HMAC-SHA256 body signature.
    #[serde(default)]
    pub webhook_secret: String,
    /// Header carrying the hex-encoded signature.
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_secret: String::new(),
            signature_header: default_signature_header(),
        }
    }
}

fn default_signature_header() -> String {
    "x-kaspi-signature".to_string()
}
