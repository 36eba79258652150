//! Shared helpers for API integration tests.
//!
//! Builds the real router with the real middleware stack, but with no
//! browser attached: enqueue admission must fail exactly as it does in
//! production before login.

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tilebot_api::config::ServerConfig;
use tilebot_api::router::build_app_router;
use tilebot_api::state::AppState;
use tilebot_automation::AutomationService;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        chrome_path: None,
        chrome_user_data_dir: "./chrome-profile".into(),
        chrome_debug_port: 9222,
        portal_url: "https://petadasar.atrbpn.go.id/".to_string(),
    }
}

/// Build the full application router with all middleware layers and a
/// fresh automation service with no browser surface installed.
pub fn build_test_app() -> Router {
    let config = test_config();
    let automation = AutomationService::start();
    let state = AppState::new(config.clone(), automation);
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a response carries the standard `{ "error", "code" }` body.
pub async fn assert_error_body(
    response: Response<Body>,
    status: StatusCode,
    code: &str,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
    assert!(json["error"].is_string());
    json
}
