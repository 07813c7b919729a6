//! Client-side error taxonomy.

use thiserror::Error;

/// Failure of a call to the backend, classified the way the kiosk reacts
/// to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server could not be reached or did not answer in time.
    #[error("network error: {0}")]
    Network(String),
    /// The server rejected the request as malformed.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The balance does not cover the price.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    /// The account does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The write was based on a stale account version.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Any other server-side failure.
    #[error("server error: {0}")]
    Server(String),
}

impl ClientError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => Self::Validation(message),
            402 => Self::InsufficientFunds(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Server(message),
        }
    }

    /// Whether the server was unreachable, as opposed to answering "no".
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Server(format!("malformed response: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}
