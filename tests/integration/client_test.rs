//! Kiosk client runtime against a real server on a loopback port.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;

use lanclub_client::{
    BackendClient, ClientError, ClientRuntime, Command, ExpiryHandler, HttpBackend, PackageChoice,
    UiEvent,
};
use lanclub_core::config::ClientConfig;

use crate::helpers::TestApp;

async fn serve(app: &TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client_config(server_url: String, cache_dir: &std::path::Path) -> ClientConfig {
    ClientConfig {
        server_url,
        pc_name: "PC-09".to_string(),
        ip_address: "10.0.0.19".to_string(),
        sync_interval_seconds: 1,
        heartbeat_interval_seconds: 1,
        cache_dir: cache_dir.display().to_string(),
        process_denylist: Vec::new(),
        ..ClientConfig::default()
    }
}

async fn wait_for(
    ui: &mut UnboundedReceiver<UiEvent>,
    wanted: impl Fn(&UiEvent) -> bool,
) -> UiEvent {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match ui.recv().await {
                Some(event) if wanted(&event) => return event,
                Some(_) => continue,
                None => panic!("UI channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for UI event")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_http_backend_round_trip() {
    let app = TestApp::new().await;
    app.create_account("alice", 500).await;
    let cache = tempfile::tempdir().expect("tempdir");
    let backend = HttpBackend::new(&client_config(serve(&app).await, cache.path())).expect("backend");

    let status = backend.login("alice", "secret123").await.expect("login");
    assert_eq!(status.balance, 500);

    let packages = backend.packages().await.expect("packages");
    assert_eq!(packages.len(), 6);

    let err = backend.login("alice", "nope").await.unwrap_err();
    assert!(!err.is_network());

    let err = backend.get_user_status("ghost").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)), "{err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_kiosk_session_end_to_end() {
    let app = TestApp::new().await;
    app.create_account("alice", 500).await;
    let cache = tempfile::tempdir().expect("tempdir");
    let config = client_config(serve(&app).await, cache.path());
    let backend: Arc<dyn BackendClient> = Arc::new(HttpBackend::new(&config).expect("backend"));

    let (runtime, mut ui) =
        ClientRuntime::start(&config, "alice", backend, ExpiryHandler::system(Vec::new()));
    wait_for(&mut ui, |e| matches!(e, UiEvent::BalanceUpdated { balance: 500 })).await;

    runtime
        .send(Command::Purchase(PackageChoice {
            name: "1 час".to_string(),
            seconds: 3600,
            price: 350,
        }))
        .await;
    let event = wait_for(&mut ui, |e| {
        matches!(e, UiEvent::PurchaseSucceeded { .. } | UiEvent::PurchaseFailed { .. })
    })
    .await;
    assert_eq!(
        event,
        UiEvent::PurchaseSucceeded {
            new_balance: 150,
            new_time: 3600
        }
    );

    // An admin grant made elsewhere reaches the running countdown.
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
    runtime.send(Command::SyncNow).await;
    let event = wait_for(&mut ui, |e| matches!(e, UiEvent::TimeAdjusted { .. })).await;
    let UiEvent::TimeAdjusted { time_left } = event else {
        unreachable!()
    };
    assert!(time_left > 3600, "grant not applied: {time_left}");

    runtime
        .send(Command::RecordLaunch {
            app_name: "dota2.exe".to_string(),
        })
        .await;

    runtime.shutdown().await;

    let (balance, time_left, _) = app.account_row("alice").await;
    assert_eq!(balance, 150);
    assert!(time_left > 3600 && time_left <= 5400, "time_left {time_left}");

    let computers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM computers WHERE pc_name = 'PC-09'")
        .fetch_one(&app.db_pool)
        .await
        .expect("computers");
    assert_eq!(computers, 1);

    let launch: (String, String, Option<String>) = sqlx::query_as(
        "SELECT app_name, ip_address, username FROM launch_logs WHERE computer_name = 'PC-09'",
    )
    .fetch_one(&app.db_pool)
    .await
    .expect("launch row");
    assert_eq!(
        launch,
        (
            "dota2.exe".to_string(),
            "10.0.0.19".to_string(),
            Some("alice".to_string())
        )
    );
}
