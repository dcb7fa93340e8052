//! API Handlers
//!
//! HTTP request handlers for the shared store and the operator endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::cache::{
    CacheAdapter, CacheBackend, CacheStats, ChangeNotifier, InvalidationRegistry, MemoryBackend,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    GetResponse, HealthResponse, KeysResponse, NotifyRequest, NotifyResponse, PatternQuery,
    RemovedResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// `backend` is the store this service hosts; `cache` is the adapter the
/// operator endpoints evict through, over that same store.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<MemoryBackend>,
    pub cache: Arc<CacheAdapter>,
    pub notifier: ChangeNotifier,
}

impl AppState {
    pub fn new(
        backend: Arc<MemoryBackend>,
        cache: Arc<CacheAdapter>,
        registry: InvalidationRegistry,
    ) -> Self {
        let notifier = ChangeNotifier::new(Arc::new(registry), cache.clone());
        Self {
            backend,
            cache,
            notifier,
        }
    }

    /// Hosts a fresh store sized from the configuration.
    pub fn from_config(config: &Config, registry: InvalidationRegistry) -> Self {
        let backend = Arc::new(MemoryBackend::new(config.max_entries, config.default_ttl));
        let cache = Arc::new(CacheAdapter::with_timeout(
            backend.clone(),
            config.cache_op_timeout,
        ));
        Self::new(backend, cache, registry)
    }
}

/// Handler for GET /store/keys/:key
pub async fn store_get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .backend
        .get(&key)
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for PUT /store/keys/:key
pub async fn store_set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Goes to the store directly so that a missing TTL takes its default.
    let store = state.backend.store();
    store.write().await.set(key.clone(), req.value, req.ttl)?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for DELETE /store/keys/:key
pub async fn store_delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RemovedResponse>> {
    let removed = usize::from(state.backend.delete(&key).await?);
    Ok(Json(RemovedResponse::new(removed)))
}

/// Handler for GET /store/keys?pattern=
pub async fn store_keys_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<KeysResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let keys = state.backend.keys(&query.pattern).await?;
    Ok(Json(KeysResponse { keys }))
}

/// Handler for DELETE /store/keys?pattern=
pub async fn store_delete_pattern_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<RemovedResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.backend.delete_pattern(&query.pattern).await?;
    info!(pattern = %query.pattern, removed, "pattern eviction");
    Ok(Json(RemovedResponse::new(removed)))
}

/// Handler for GET /store/stats
///
/// Counters of the hosted store alone, as a remote backend reports them.
pub async fn store_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.backend.store().read().await.stats())
}

/// Handler for DELETE /cache/keys/:key
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<RemovedResponse> {
    let removed = usize::from(state.cache.delete(&key).await);
    info!(key = %key, removed, "manual key eviction");
    Json(RemovedResponse::new(removed))
}

/// Handler for DELETE /cache/prefixes/:prefix
pub async fn delete_prefix_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<RemovedResponse>> {
    if prefix.trim().is_empty() {
        return Err(CacheError::InvalidRequest(
            "prefix cannot be empty".to_string(),
        ));
    }

    let removed = state.cache.delete_by_prefix(&prefix).await;
    info!(prefix = %prefix, removed, "manual prefix eviction");
    Ok(Json(RemovedResponse::new(removed)))
}

/// Handler for POST /cache/notify
///
/// Lets writers outside this process trigger the same invalidation an
/// in-process commit would.
pub async fn notify_handler(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let report = state
        .notifier
        .on_commit(&req.entity_type, &req.id, req.kind)
        .await
        .ok_or_else(|| CacheError::NotFound(format!("entity type {}", req.entity_type)))?;

    Ok(Json(NotifyResponse::new(req.entity_type, report)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
