//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use sqlx::SqlitePool;
use tower::ServiceExt;

use lanclub_core::config::{AppConfig, DatabaseConfig};
use lanclub_database::DatabasePool;
use lanclub_service::PasswordHasher;

pub const ADMIN_PASSWORD: &str = "club-admin";
pub const WEBHOOK_SECRET: &str = "kaspi-test-secret";

/// Test application context
#[derive(Clone)]
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: SqlitePool,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application over a private in-memory database
    pub async fn new() -> Self {
        Self::with_database(DatabaseConfig::in_memory()).await
    }

    /// Create a test application over the given database
    pub async fn with_database(database: DatabaseConfig) -> Self {
        let mut config = AppConfig::default();
        config.database = database;
        config.admin.password_hash = PasswordHasher::new()
            .hash_password(ADMIN_PASSWORD)
            .expect("hash admin password");
        config.payment.enabled = true;
        config.payment.webhook_secret = WEBHOOK_SECRET.to_string();
        config.worker.enabled = false;

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        lanclub_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");
        let db_pool = db.into_pool();

        let state = lanclub_api::build_state(config.clone(), db_pool.clone());
        let router = lanclub_api::build_app(state);

        Self {
            router,
            db_pool,
            config,
        }
    }

    /// Register an account through the API and set its balance directly
    pub async fn create_account(&self, username: &str, balance: i64) {
        let resp = self
            .request(
                "POST",
                "/api/register",
                Some(serde_json::json!({"username": username, "password": "secret123"})),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "register: {:?}", resp.body);

        sqlx::query("UPDATE accounts SET balance = ? WHERE username = ?")
            .bind(balance)
            .bind(username)
            .execute(&self.db_pool)
            .await
            .expect("set balance");
    }

    /// Current (balance, time_left, version) straight from the database
    pub async fn account_row(&self, username: &str) -> (i64, i64, i64) {
        sqlx::query_as("SELECT balance, time_left, version FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_one(&self.db_pool)
            .await
            .expect("account row")
    }

    /// Number of ledger entries for an account
    pub async fn transaction_count(&self, username: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE username = ?")
            .bind(username)
            .fetch_one(&self.db_pool)
            .await
            .expect("count transactions")
    }

    /// `Authorization` value for the configured administrator
    pub fn admin_auth(&self) -> String {
        basic_auth(&self.config.admin.username, ADMIN_PASSWORD)
    }

    /// Make a JSON request to the test server
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        auth: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("encode body"))
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("build request")).await
    }

    /// Post raw bytes with extra headers
    pub async fn request_raw(
        &self,
        path: &str,
        body: &[u8],
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder
            .body(Body::from(body.to_vec()))
            .expect("build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON
    pub body: Value,
}

impl TestResponse {
    /// Integer field of the body
    pub fn int(&self, field: &str) -> i64 {
        self.body[field]
            .as_i64()
            .unwrap_or_else(|| panic!("missing integer '{field}' in {:?}", self.body))
    }
}

/// `Basic` authorization header value
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Hex HMAC-SHA256 of a webhook body
pub fn sign_webhook(body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).expect("hmac key");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
