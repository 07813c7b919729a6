//! Signed payment webhook.

use axum::http::StatusCode;

use crate::helpers::{TestApp, sign_webhook};

const WEBHOOK: &str = "/api/payments/kaspi/webhook";

#[tokio::test]
async fn test_signed_webhook_credits_once() {
    let app = TestApp::new().await;
    app.create_account("alice", 100).await;
    let body = br#"{"order_id":"K-100","username":"alice","amount":1000}"#;
    let signature = sign_webhook(body);
    let header = app.config.payment.signature_header.clone();

    let resp = app
        .request_raw(WEBHOOK, body, &[(header.as_str(), signature.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.int("new_balance"), 1100);
    assert_eq!(resp.body["duplicate"], false);

    let resp = app
        .request_raw(WEBHOOK, body, &[(header.as_str(), signature.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.int("new_balance"), 1100);
    assert_eq!(resp.body["duplicate"], true);

    assert_eq!(app.account_row("alice").await.0, 1100);
    assert_eq!(app.transaction_count("alice").await, 1);
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let app = TestApp::new().await;
    app.create_account("alice", 100).await;
    let body = br#"{"order_id":"K-101","username":"alice","amount":5000}"#;
    let header = app.config.payment.signature_header.clone();

    let forged = sign_webhook(br#"{"order_id":"K-101","username":"alice","amount":5}"#);
    let resp = app
        .request_raw(WEBHOOK, body, &[(header.as_str(), forged.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app.request_raw(WEBHOOK, body, &[]).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.account_row("alice").await.0, 100);
}

#[tokio::test]
async fn test_webhook_for_unknown_account() {
    let app = TestApp::new().await;
    let body = br#"{"order_id":"K-102","username":"ghost","amount":100}"#;
    let signature = sign_webhook(body);
    let header = app.config.payment.signature_header.clone();

    let resp = app
        .request_raw(WEBHOOK, body, &[(header.as_str(), signature.as_str())])
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
