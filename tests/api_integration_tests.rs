//! Integration Tests for API Endpoints
//!
//! Full request/response cycles against a single node that owns every key.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use shard_cache::{
    cache::CacheStore,
    cluster::{Coordinator, PeerClient},
    create_router, AppState,
};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(capacity: usize) -> Router {
    let client = PeerClient::new(Duration::from_millis(200)).unwrap();
    let coordinator = Coordinator::new(
        "http://127.0.0.1:1",
        &[],
        CacheStore::new(capacity),
        client,
        Duration::from_secs(3600),
    )
    .unwrap();
    create_router(AppState::new(coordinator))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn set(app: &Router, body: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn get(app: &Router, key: &str) -> (StatusCode, Option<Value>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/get?key={key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    if status == StatusCode::OK {
        (status, Some(body_to_json(response.into_body()).await))
    } else {
        (status, None)
    }
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success_has_empty_body() {
    let app = create_test_app(10);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key":"test_key","value":"test_value"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_set_endpoint_malformed_json() {
    let app = create_test_app(10);

    assert_eq!(set(&app, r#"{"key": "a""#).await, StatusCode::BAD_REQUEST);
    assert_eq!(set(&app, r#"{"value": "no key"}"#).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_endpoint_zero_ttl_rejected() {
    let app = create_test_app(10);

    assert_eq!(
        set(&app, r#"{"key":"a","value":"1","ttl":0}"#).await,
        StatusCode::BAD_REQUEST
    );
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app(10);

    assert_eq!(set(&app, r#"{"key":"a","value":"1"}"#).await, StatusCode::OK);

    let (status, json) = get(&app, "a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.unwrap(), serde_json::json!({"value": "1"}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app(10);

    let (status, _) = get(&app, "nonexistent_key").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_endpoint_missing_key_param() {
    let app = create_test_app(10);

    let response = app
        .oneshot(Request::builder().uri("/get").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

// == Eviction and Expiry ==

#[tokio::test]
async fn test_capacity_ten_evicts_least_recently_used() {
    let app = create_test_app(10);

    assert_eq!(set(&app, r#"{"key":"a","value":"1"}"#).await, StatusCode::OK);
    let (status, json) = get(&app, "a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.unwrap()["value"], "1");

    for i in 0..10 {
        let body = format!(r#"{{"key":"k{i}","value":"v{i}"}}"#);
        assert_eq!(set(&app, &body).await, StatusCode::OK);
    }

    let (status, _) = get(&app, "a").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    for i in 0..10 {
        let (status, _) = get(&app, &format!("k{i}")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_ttl_expiry_through_api() {
    let app = create_test_app(10);

    assert_eq!(
        set(&app, r#"{"key":"short","value":"v","ttl":1}"#).await,
        StatusCode::OK
    );
    assert_eq!(get(&app, "short").await.0, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(get(&app, "short").await.0, StatusCode::NOT_FOUND);
}

// == STATS / HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app(10);

    set(&app, r#"{"key":"stats_key","value":"stats_value"}"#).await;
    get(&app, "stats_key").await;
    get(&app, "nonexistent").await;

    let response = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["node_id"], "http://127.0.0.1:1");
    assert_eq!(json["ring_size"], 1);
    assert_eq!(json["ring"][0]["id"], "http://127.0.0.1:1");
    assert_eq!(json["ring"][0]["address"]["kind"], "local");
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["capacity"], 10);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(10);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
