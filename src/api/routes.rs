//! API Routes
//!
//! Configures the Axum router with the shared store and operator endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_key_handler, delete_prefix_handler, health_handler, notify_handler, stats_handler,
    store_delete_handler, store_delete_pattern_handler, store_get_handler, store_keys_handler,
    store_set_handler, store_stats_handler, AppState,
};

/// Creates the service router.
///
/// # Endpoints
/// - `/store/...` - the hosted backend, as `RemoteBackend` expects it
/// - `/cache/...` - eviction through the adapter and change notifications
/// - `GET /stats`, `GET /health`
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route(
            "/store/keys",
            get(store_keys_handler).delete(store_delete_pattern_handler),
        )
        .route(
            "/store/keys/:key",
            get(store_get_handler)
                .put(store_set_handler)
                .delete(store_delete_handler),
        )
        .route("/store/stats", get(store_stats_handler))
        .route("/cache/keys/:key", delete(delete_key_handler))
        .route("/cache/prefixes/:prefix", delete(delete_prefix_handler))
        .route("/cache/notify", post(notify_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{CacheAdapter, MemoryBackend};
    use crate::resources::default_registry;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let backend = Arc::new(MemoryBackend::new(100, 300));
        let cache = Arc::new(CacheAdapter::new(backend.clone()));
        create_router(AppState::new(backend, cache, default_registry()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_notify_endpoint_unknown_entity() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cache/notify")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"entity_type":"Invoice","id":"1","kind":"created"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_put_then_get() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/store/keys/cash_list_cache:page:1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value":"[]","ttl":60}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/store/keys/cash_list_cache:page:1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_store_missing_key_is_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/store/keys/cash_1_cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_keys_requires_pattern() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/store/keys")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_prefix_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/cache/prefixes/assignment_reports_")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
