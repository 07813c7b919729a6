//! Backend access for the kiosk.
//!
//! [`BackendClient`] is the seam the controller and the background loops
//! talk through; [`HttpBackend`] is the reqwest implementation and tests
//! substitute an in-memory fake.

use std::time::Duration;

use async_trait::async_trait;
use lanclub_core::config::ClientConfig;
use reqwest::{Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;
use crate::protocol::{
    CredentialsBody, ErrorBody, HeartbeatBody, LaunchReport, PackageInfo, PackagesReply,
    PurchaseBody, PurchaseReply, StatusReply, UpdateTimeBody, UpdateTimeReply,
};

/// Calls the kiosk makes against the LanClub backend.
#[async_trait]
pub trait BackendClient: Send + Sync + 'static {
    /// Fetch balance, time-left and version.
    async fn get_user_status(&self, username: &str) -> Result<StatusReply, ClientError>;

    /// Write the locally counted time-left back.
    async fn update_time(&self, body: &UpdateTimeBody) -> Result<UpdateTimeReply, ClientError>;

    /// Buy a time package.
    async fn buy_package(&self, body: &PurchaseBody) -> Result<PurchaseReply, ClientError>;

    /// Report this machine to the registry.
    async fn heartbeat(&self, body: &HeartbeatBody) -> Result<(), ClientError>;

    /// Record an application launch.
    async fn log_launch(&self, report: &LaunchReport) -> Result<(), ClientError>;

    /// Check credentials and fetch the account status.
    async fn login(&self, username: &str, password: &str) -> Result<StatusReply, ClientError>;

    /// Fetch the package catalog.
    async fn packages(&self) -> Result<Vec<PackageInfo>, ClientError>;
}

/// reqwest-backed [`BackendClient`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        if config.server_url.trim().is_empty() {
            return Err(ClientError::Validation("server_url is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()?;

        let base_url = config.server_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Base URL requests are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(resp).await
    }

    /// Turn a response into `T`, mapping error statuses and `status:"error"`
    /// bodies onto [`ClientError`].
    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) if !body.message.is_empty() => body.message,
                _ => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            debug!(status = status.as_u16(), message = %message, "Backend rejected request");
            return Err(ClientError::from_status(status.as_u16(), message));
        }

        let value: serde_json::Value = resp.json().await?;
        if value.get("status").and_then(|s| s.as_str()) == Some("error") {
            let message = value
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error")
                .to_string();
            return Err(ClientError::Server(message));
        }

        serde_json::from_value(value)
            .map_err(|e| ClientError::Server(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn get_user_status(&self, username: &str) -> Result<StatusReply, ClientError> {
        let url = Url::parse_with_params(
            &self.url("/api/get_user_status"),
            &[("username", username)],
        )
        .map_err(|e| ClientError::Validation(format!("bad server_url: {e}")))?;

        let resp = self.http.get(url).send().await?;
        Self::decode(resp).await
    }

    async fn update_time(&self, body: &UpdateTimeBody) -> Result<UpdateTimeReply, ClientError> {
        self.post("/api/update_time", body).await
    }

    async fn buy_package(&self, body: &PurchaseBody) -> Result<PurchaseReply, ClientError> {
        self.post("/api/buy_package", body).await
    }

    async fn heartbeat(&self, body: &HeartbeatBody) -> Result<(), ClientError> {
        let _: serde_json::Value = self.post("/api/heartbeat", body).await?;
        Ok(())
    }

    async fn log_launch(&self, report: &LaunchReport) -> Result<(), ClientError> {
        let _: serde_json::Value = self.post("/log_launch", report).await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<StatusReply, ClientError> {
        let body = CredentialsBody {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/api/login", &body).await
    }

    async fn packages(&self) -> Result<Vec<PackageInfo>, ClientError> {
        let resp = self.http.get(self.url("/api/packages")).send().await?;
        let reply: PackagesReply = Self::decode(resp).await?;
        Ok(reply.packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClientConfig {
            server_url: "http://club.local:5000/".into(),
            ..ClientConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://club.local:5000");
        assert_eq!(backend.url("/api/packages"), "http://club.local:5000/api/packages");
    }

    #[test]
    fn test_empty_server_url_rejected() {
        let config = ClientConfig {
            server_url: "  ".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpBackend::new(&config),
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let config = ClientConfig {
            server_url: "http://127.0.0.1:1".into(),
            request_timeout_seconds: 1,
            ..ClientConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        let err = backend.get_user_status("alice").await.unwrap_err();
        assert!(err.is_network(), "unexpected error: {err:?}");
    }
}
