//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles, driving expiration with a manual clock.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use elastic_cache::cache::{DistributedCache, ManualClock};
use elastic_cache::store::{EntryRepository, MemoryRepository};
use elastic_cache::{api::create_router, AppState, CacheOptions};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

struct TestApp {
    router: Router,
    repo: Arc<MemoryRepository>,
    clock: Arc<ManualClock>,
}

fn create_test_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let clock = Arc::new(ManualClock::new_at(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let cache =
        DistributedCache::with_clock(&CacheOptions::default(), repo.clone(), clock.clone())
            .unwrap();

    TestApp {
        router: create_router(AppState::new(cache)),
        repo,
        clock,
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET / GET ==

#[tokio::test]
async fn test_set_then_get() {
    let app = create_test_app();

    let (status, json) = send(
        &app.router,
        "PUT",
        "/set",
        Some(r#"{"key":"get_key","value":"get_value"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("get_key"));

    let (status, json) = send(&app.router, "GET", "/get/get_key", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], "get_value");
}

#[tokio::test]
async fn test_set_missing_value_is_bad_request() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "PUT", "/set", Some(r#"{"key":"k"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("value"));
}

#[tokio::test]
async fn test_set_past_absolute_is_bad_request() {
    let app = create_test_app();

    let (status, _) = send(
        &app.router,
        "PUT",
        "/set",
        Some(r#"{"key":"k","value":"v","absolute_at":"2020-01-01T00:00:00Z"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.repo.is_empty().await);
}

#[tokio::test]
async fn test_set_zero_sliding_window_is_bad_request() {
    let app = create_test_app();

    let (status, _) = send(
        &app.router,
        "PUT",
        "/set",
        Some(r#"{"key":"k","value":"v","sliding_secs":0}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.repo.is_empty().await);
}

#[tokio::test]
async fn test_keys_are_case_sensitive() {
    let app = create_test_app();
    send(&app.router, "PUT", "/set", Some(r#"{"key":"abc","value":"v"}"#)).await;

    let (status, _) = send(&app.router, "GET", "/get/ABC", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Expiration ==

#[tokio::test]
async fn test_sliding_expiration_over_http() {
    let app = create_test_app();
    send(
        &app.router,
        "PUT",
        "/set",
        Some(r#"{"key":"k","value":"v","sliding_secs":10}"#),
    )
    .await;

    app.clock.advance(Duration::from_secs(5));
    let (status, _) = send(&app.router, "GET", "/get/k", None).await;
    assert_eq!(status, StatusCode::OK);

    // Renewed to t=15, so t=14 is still live
    app.clock.advance(Duration::from_secs(9));
    let (status, _) = send(&app.router, "GET", "/get/k", None).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.advance(Duration::from_secs(11));
    let (status, _) = send(&app.router, "GET", "/get/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Lazily expired, not deleted
    assert!(app.repo.get("k").await.unwrap().is_some());
}

#[tokio::test]
async fn test_refresh_endpoint_extends_entry() {
    let app = create_test_app();
    send(
        &app.router,
        "PUT",
        "/set",
        Some(r#"{"key":"k","value":"v","sliding_secs":10}"#),
    )
    .await;

    app.clock.advance(Duration::from_secs(8));
    let (status, _) = send(&app.router, "POST", "/refresh/k", None).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.advance(Duration::from_secs(8));
    let (status, _) = send(&app.router, "GET", "/get/k", None).await;
    assert_eq!(status, StatusCode::OK);
}

// == DELETE ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();
    send(&app.router, "PUT", "/set", Some(r#"{"key":"k","value":"v"}"#)).await;

    let (status, _) = send(&app.router, "DELETE", "/del/k", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, "GET", "/get/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_absent_key_succeeds() {
    let app = create_test_app();

    let (status, _) = send(&app.router, "DELETE", "/del/never_set", None).await;
    assert_eq!(status, StatusCode::OK);
}

// == Stats / Demo ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();
    send(&app.router, "PUT", "/set", Some(r#"{"key":"k","value":"v"}"#)).await;
    send(&app.router, "GET", "/get/k", None).await;
    send(&app.router, "GET", "/get/missing", None).await;

    let (status, json) = send(&app.router, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["writes"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_demo_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "Key");
    assert_eq!(json["value"], "Value");
}
