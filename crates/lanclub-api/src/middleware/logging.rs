//! Request logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info, warn};

/// Endpoints every kiosk hits every few seconds.
const POLLING_PATHS: &[&str] = &["/api/get_user_status", "/api/heartbeat", "/api/update_time"];

fn is_polling_path(path: &str) -> bool {
    POLLING_PATHS.contains(&path)
}

/// Logs method, path, status and duration of each request.
///
/// Successful kiosk polling is logged at `debug` so a full club does not
/// drown the `info` log. Server errors are always logged at `warn`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        warn!(method = %method, path = %path, status = status.as_u16(), duration_ms, "HTTP request failed");
    } else if status.is_success() && is_polling_path(&path) {
        debug!(method = %method, path = %path, status = status.as_u16(), duration_ms, "HTTP request");
    } else {
        info!(method = %method, path = %path, status = status.as_u16(), duration_ms, "HTTP request");
    }

    response
}
