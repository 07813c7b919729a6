//! Administrator endpoints behind HTTP Basic.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, basic_auth};

#[tokio::test]
async fn test_admin_routes_require_credentials() {
    let app = TestApp::new().await;
    app.create_account("alice", 0).await;
    let body = json!({"username": "alice", "amount": 100});

    let resp = app
        .request("POST", "/api/add_balance", Some(body.clone()), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "UNAUTHORIZED");

    let wrong = basic_auth("admin", "guess");
    let resp = app
        .request("POST", "/api/add_balance", Some(body.clone()), Some(&wrong))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app
        .request("GET", "/api/admin/accounts", None, Some("Bearer token"))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.account_row("alice").await.0, 0);
}

#[tokio::test]
async fn test_add_balance() {
    let app = TestApp::new().await;
    app.create_account("alice", 200).await;
    let auth = app.admin_auth();

    let resp = app
        .request(
            "POST",
            "/api/add_balance",
            Some(json!({"username": "alice", "amount": 300})),
            Some(&auth),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.int("new_balance"), 500);

    let resp = app
        .request(
            "POST",
            "/api/add_balance",
            Some(json!({"username": "alice", "amount": 0})),
            Some(&auth),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .request(
            "POST",
            "/api/add_balance",
            Some(json!({"username": "ghost", "amount": 10})),
            Some(&auth),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(app.transaction_count("ghost").await, 0);
}

#[tokio::test]
async fn test_grant_time_bumps_version() {
    let app = TestApp::new().await;
    app.create_account("alice", 0).await;
    let (_, _, before) = app.account_row("alice").await;
    let auth = app.admin_auth();

    let resp = app
        .request(
            "POST",
            "/api/admin/grant_time",
            Some(json!({"username": "alice", "seconds": 1800})),
            Some(&auth),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.int("new_time"), 1800);
    assert!(resp.int("version") > before);

    // A kiosk pushing the pre-grant version cannot wipe the grant.
    let resp = app
        .request(
            "POST",
            "/api/update_time",
            Some(json!({"username": "alice", "time_left": 0, "version": before})),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(app.account_row("alice").await.1, 1800);
}

#[tokio::test]
async fn test_list_accounts_paginates() {
    let app = TestApp::new().await;
    for name in ["alice", "bob", "carol"] {
        app.create_account(name, 100).await;
    }
    let auth = app.admin_auth();

    let resp = app
        .request("GET", "/api/admin/accounts?page=1&page_size=2", None, Some(&auth))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["items"].as_array().expect("items").len(), 2);
    assert_eq!(resp.int("total_items"), 3);
    assert_eq!(resp.int("total_pages"), 2);
    assert!(resp.body["items"][0].get("password_hash").is_none());

    let resp = app
        .request("GET", "/api/admin/accounts?page=2&page_size=2", None, Some(&auth))
        .await;
    assert_eq!(resp.body["items"].as_array().expect("items").len(), 1);
}

#[tokio::test]
async fn test_delete_account() {
    let app = TestApp::new().await;
    app.create_account("alice", 0).await;
    app.create_account("admin", 0).await;
    let auth = app.admin_auth();

    let resp = app
        .request("DELETE", "/api/admin/accounts/alice", None, Some(&auth))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .request("GET", "/api/get_user_status?username=alice", None, None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .request("DELETE", "/api/admin/accounts/alice", None, Some(&auth))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .request("DELETE", "/api/admin/accounts/admin", None, Some(&auth))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_transactions_ledger() {
    let app = TestApp::new().await;
    app.create_account("alice", 0).await;
    let auth = app.admin_auth();

    app.request(
        "POST",
        "/api/add_balance",
        Some(json!({"username": "alice", "amount": 1000})),
        Some(&auth),
    )
    .await;
    app.request(
        "POST",
        "/api/buy_package",
        Some(json!({
            "username": "alice",
            "seconds": 3600,
            "price": 350,
            "package_name": "1 час",
            "pc_name": "PC-02",
        })),
        None,
    )
    .await;

    let resp = app
        .request("GET", "/api/admin/transactions", None, Some(&auth))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.body["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);

    let kinds: Vec<&str> = items.iter().filter_map(|t| t["kind"].as_str()).collect();
    assert!(kinds.contains(&"admin_top_up"));
    assert!(kinds.contains(&"package_purchase"));
    let purchase = items
        .iter()
        .find(|t| t["kind"] == "package_purchase")
        .expect("purchase entry");
    assert_eq!(purchase["pc_name"], "PC-02");
    assert_eq!(purchase["seconds"], 3600);
}

#[tokio::test]
async fn test_computers_status_lists_registry() {
    let app = TestApp::new().await;
    for pc in ["PC-01", "PC-02"] {
        app.request(
            "POST",
            "/api/heartbeat",
            Some(json!({"pc_name": pc, "status": "active", "time_left": 0})),
            None,
        )
        .await;
    }

    let auth = app.admin_auth();
    let resp = app
        .request("GET", "/api/get_computers_status", None, Some(&auth))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let computers = resp.body["computers"].as_array().expect("computers");
    assert_eq!(computers.len(), 2);
    assert!(computers.iter().all(|c| c["online"] == true));
}
