//! Kiosk session endpoints: status, purchases, time sync, heartbeats.

use axum::http::StatusCode;
use serde_json::json;

use lanclub_core::config::DatabaseConfig;

use crate::helpers::TestApp;

fn buy(username: &str, name: &str, seconds: i64, price: i64) -> serde_json::Value {
    json!({
        "username": username,
        "seconds": seconds,
        "price": price,
        "package_name": name,
        "pc_name": "PC-01",
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let resp = app.request("GET", "/api/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "success");
    assert_eq!(resp.body["database"], "ok");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new().await;
    app.create_account("alice", 0).await;

    let resp = app
        .request(
            "POST",
            "/api/login",
            Some(json!({"username": "alice", "password": "secret123"})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["username"], "alice");

    let resp = app
        .request(
            "POST",
            "/api/login",
            Some(json!({"username": "alice", "password": "wrong-one"})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["status"], "error");

    let resp = app
        .request(
            "POST",
            "/api/register",
            Some(json!({"username": "alice", "password": "secret123"})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_user_status() {
    let app = TestApp::new().await;
    app.create_account("alice", 500).await;

    let resp = app
        .request("GET", "/api/get_user_status?username=alice", None, None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "success");
    assert_eq!(resp.int("balance"), 500);
    assert_eq!(resp.int("time_left"), 0);

    let resp = app
        .request("GET", "/api/get_user_status?username=ghost", None, None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["status"], "error");
}

#[tokio::test]
async fn test_purchase_then_insufficient_funds() {
    let app = TestApp::new().await;
    app.create_account("alice", 500).await;

    let resp = app
        .request("POST", "/api/buy_package", Some(buy("alice", "1 час", 3600, 350)), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.int("new_balance"), 150);
    assert_eq!(resp.int("new_time"), 3600);

    let (_, _, version) = app.account_row("alice").await;
    let resp = app
        .request("POST", "/api/buy_package", Some(buy("alice", "2 часа", 7200, 700)), None)
        .await;
    assert_eq!(resp.status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(resp.body["error"], "INSUFFICIENT_FUNDS");

    assert_eq!(app.account_row("alice").await, (150, 3600, version));
    assert_eq!(app.transaction_count("alice").await, 1);
}

#[tokio::test]
async fn test_purchase_opens_session_on_machine() {
    let app = TestApp::new().await;
    app.create_account("alice", 500).await;
    app.request("POST", "/api/buy_package", Some(buy("alice", "1 час", 3600, 350)), None)
        .await;

    let auth = app.admin_auth();
    let resp = app
        .request("GET", "/api/get_computers_status", None, Some(&auth))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let pc = &resp.body["computers"][0];
    assert_eq!(pc["pc_name"], "PC-01");
    assert_eq!(pc["current_user"], "alice");
    assert_eq!(pc["session_name"], "1 час");
}

#[tokio::test]
async fn test_purchase_must_match_catalog() {
    let app = TestApp::new().await;
    app.create_account("alice", 5000).await;

    let resp = app
        .request("POST", "/api/buy_package", Some(buy("alice", "1 час", 36000, 350)), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.account_row("alice").await.0, 5000);

    let resp = app
        .request("POST", "/api/buy_package", Some(buy("alice", "1 час", 0, 0)), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .request(
            "POST",
            "/api/buy_package",
            Some(buy("alice", "Вечность", 10_000_000_000_000, 0)),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.account_row("alice").await, (5000, 0, 0));

    let resp = app
        .request("POST", "/api/buy_package", Some(buy("ghost", "1 час", 3600, 350)), None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_purchases_never_overdraw() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("club.db").display()),
        ..DatabaseConfig::default()
    };
    let app = TestApp::with_database(database).await;
    app.create_account("alice", 1000).await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = app.clone();
        handles.push(tokio::spawn(async move {
            client
                .request("POST", "/api/buy_package", Some(buy("alice", "1 час", 3600, 350)), None)
                .await
                .status
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        let status = handle.await.expect("join");
        if status == StatusCode::OK {
            succeeded += 1;
        } else {
            assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        }
    }

    assert_eq!(succeeded, 2);
    let (balance, time_left, _) = app.account_row("alice").await;
    assert_eq!(balance, 300);
    assert_eq!(time_left, 7200);
    assert_eq!(app.transaction_count("alice").await, 2);
}

#[tokio::test]
async fn test_update_time_rejects_stale_version() {
    let app = TestApp::new().await;
    app.create_account("alice", 500).await;
    let bought = app
        .request("POST", "/api/buy_package", Some(buy("alice", "1 час", 3600, 350)), None)
        .await;
    let version = bought.int("version");

    let resp = app
        .request(
            "POST",
            "/api/update_time",
            Some(json!({"username": "alice", "time_left": 3500, "version": version})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let newer = resp.int("version");
    assert!(newer > version);

    // A second kiosk still holding the old version must not overwrite.
    let resp = app
        .request(
            "POST",
            "/api/update_time",
            Some(json!({"username": "alice", "time_left": 3599, "version": version})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(app.account_row("alice").await, (150, 3500, newer));

    let resp = app
        .request(
            "POST",
            "/api/update_time",
            Some(json!({"username": "alice", "time_left": -5})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_heartbeat_registers_machine() {
    let app = TestApp::new().await;
    let resp = app
        .request(
            "POST",
            "/api/heartbeat",
            Some(json!({"pc_name": "PC-07", "status": "in_use", "user": "bob", "time_left": 900})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["pc_name"], "PC-07");

    let auth = app.admin_auth();
    let resp = app
        .request("GET", "/api/get_computers_status", None, Some(&auth))
        .await;
    let pc = &resp.body["computers"][0];
    assert_eq!(pc["status"], "in_use");
    assert_eq!(pc["online"], true);
    assert_eq!(pc["current_user"], "bob");
    assert_eq!(pc["time_remaining"], 900);

    let resp = app
        .request(
            "POST",
            "/api/heartbeat",
            Some(json!({"pc_name": "PC-07", "status": "dancing", "time_left": 0})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_packages_catalog() {
    let app = TestApp::new().await;
    let resp = app.request("GET", "/api/packages", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);

    let packages = resp.body["packages"].as_array().expect("packages");
    assert_eq!(packages.len(), 6);
    assert_eq!(packages[0]["name"], "30 мин");
    assert_eq!(packages[0]["seconds"], 1800);
    assert_eq!(packages[5]["price"], 3500);
}

#[tokio::test]
async fn test_log_launch() {
    let app = TestApp::new().await;
    let resp = app
        .request(
            "POST",
            "/log_launch",
            Some(json!({
                "computer_name": "PC-03",
                "ip_address": "10.0.0.13",
                "user": "alice",
                "app_name": "steam.exe",
            })),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.int("id") > 0);

    let stored: (String, Option<String>) =
        sqlx::query_as("SELECT app_name, username FROM launch_logs WHERE computer_name = 'PC-03'")
            .fetch_one(&app.db_pool)
            .await
            .expect("launch row");
    assert_eq!(stored, ("steam.exe".to_string(), Some("alice".to_string())));
}
