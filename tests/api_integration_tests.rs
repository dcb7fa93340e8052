//! Integration Tests for the operator API
//!
//! Tests the full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kiosk_cache::cache::keys::{action_key, detail_key, list_key};
use kiosk_cache::cache::{CacheAdapter, MemoryBackend};
use kiosk_cache::resources::{default_registry, report_prefix, ASSIGNMENT_REPORTS, FINANCE_REPORTS};
use kiosk_cache::{api::create_router, AppState};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Arc<CacheAdapter>, Router) {
    let backend = Arc::new(MemoryBackend::new(1000, 300));
    let cache = Arc::new(CacheAdapter::new(backend.clone()));
    let app = create_router(AppState::new(backend, cache.clone(), default_registry()));
    (cache, app)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn notify(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/cache/notify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == Health & Stats ==

#[tokio::test]
async fn test_health_endpoint() {
    let (_, app) = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_stats_reflect_cache_traffic() {
    let (cache, app) = create_test_app();
    cache.set(&list_key("sellers", None), "[]", 60).await;
    cache.get(&list_key("sellers", None)).await;
    cache.get(&list_key("sellers", Some("2"))).await;

    let response = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["sets"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

// == Manual Eviction ==

#[tokio::test]
async fn test_delete_key_endpoint() {
    let (cache, app) = create_test_app();
    cache.set(&detail_key("products", 12), "{}", 60).await;

    let response = app
        .clone()
        .oneshot(delete("/cache/keys/products_12_cache"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 1);

    let response = app
        .oneshot(delete("/cache/keys/products_12_cache"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 0);
}

#[tokio::test]
async fn test_delete_prefix_endpoint() {
    let (cache, app) = create_test_app();
    for page in 1..=25 {
        cache
            .set(&list_key("devolutions", Some(page.to_string().as_str())), "[]", 60)
            .await;
    }
    cache.set(&detail_key("devolutions", 1), "{}", 60).await;

    let response = app
        .oneshot(delete("/cache/prefixes/devolutions_list_cache"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 25);
    assert!(cache.get(&detail_key("devolutions", 1)).await.is_some());
}

#[tokio::test]
async fn test_delete_prefix_treats_glob_characters_literally() {
    let (cache, app) = create_test_app();
    cache.set("odd[1]_list_cache:page:1", "[]", 60).await;
    cache.set("odd1_list_cache:page:1", "[]", 60).await;

    let response = app
        .oneshot(delete("/cache/prefixes/odd%5B1%5D_"))
        .await
        .unwrap();

    assert_eq!(body_to_json(response.into_body()).await["removed"], 1);
    assert!(cache.get("odd1_list_cache:page:1").await.is_some());
}

// == Change Notification ==

#[tokio::test]
async fn test_notify_clears_resource_and_reports() {
    let (cache, app) = create_test_app();
    cache.set(&list_key("yapes", None), "[]", 60).await;
    cache.set(&detail_key("yapes", 8), "{}", 60).await;
    cache.set(&detail_key("yapes", 9), "{}", 60).await;
    let daily = action_key(
        &report_prefix(FINANCE_REPORTS, "daily_summary"),
        &[("date", "2024-05-01")],
    );
    let profits = action_key(&report_prefix(ASSIGNMENT_REPORTS, "profits"), &[("year", "2024")]);
    cache.set(&daily, "{}", 60).await;
    cache.set(&profits, "{}", 60).await;

    let response = app
        .oneshot(notify(r#"{"entity_type":"Yape","id":"8","kind":"updated"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["entity_type"], "Yape");
    assert_eq!(json["removed"], 3);

    assert!(cache.get(&daily).await.is_none());
    assert!(cache.get(&detail_key("yapes", 8)).await.is_none());
    assert!(cache.get(&detail_key("yapes", 9)).await.is_some());
    assert!(cache.get(&profits).await.is_some());
}

#[tokio::test]
async fn test_notify_unknown_entity() {
    let (_, app) = create_test_app();

    let response = app
        .oneshot(notify(r#"{"entity_type":"Invoice","id":"1","kind":"created"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Invoice"));
}

#[tokio::test]
async fn test_notify_empty_id() {
    let (_, app) = create_test_app();

    let response = app
        .oneshot(notify(r#"{"entity_type":"Cash","id":"","kind":"deleted"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let (_, app) = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/get/anything").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
