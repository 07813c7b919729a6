//! CORS layer for browser-based admin dashboards.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

use lanclub_core::config::CorsConfig;

/// Builds a CORS layer from configuration.
///
/// Only `Content-Type` and `Authorization` are allowed as request headers;
/// kiosks and the payment provider do not go through a browser.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let headers: [HeaderName; 2] = [header::CONTENT_TYPE, header::AUTHORIZATION];
    let layer = CorsLayer::new()
        .allow_headers(headers)
        .allow_methods(parse_methods(&config.allowed_methods))
        .max_age(Duration::from_secs(config.max_age_seconds));

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parse_origins(&config.allowed_origins))
    }
}

/// Origins that parse as header values; the rest are logged and skipped.
fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

fn parse_methods(methods: &[String]) -> Vec<Method> {
    methods
        .iter()
        .filter_map(|m| m.to_uppercase().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_entries_are_skipped() {
        let origins = parse_origins(&["http://admin.lan".to_string(), "bad\norigin".to_string()]);
        assert_eq!(origins, vec![HeaderValue::from_static("http://admin.lan")]);

        let methods = parse_methods(&["get".to_string(), "POST".to_string()]);
        assert_eq!(methods, vec![Method::GET, Method::POST]);
    }
}
