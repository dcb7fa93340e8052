//! Action cache for read-only report and aggregate endpoints.
//!
//! Results are keyed by the action prefix and a digest of the request's
//! query parameters, so every distinct parameter set is cached on its own
//! and a whole action family can be cleared by prefix.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::stream;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::keys::action_key;
use crate::cache::{CacheAdapter, DEFAULT_CACHE_TIMEOUT, MAX_VALUE_SIZE};

/// Response header reporting whether the action cache served the request.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Cache for one read action.
///
/// Give each action its own prefix under a shared family, e.g.
/// `finance_reports_cash_balance`, so that clearing `finance_reports`
/// drops the whole family while keys of sibling actions never collide.
#[derive(Clone)]
pub struct ActionCache {
    cache: Arc<CacheAdapter>,
    prefix: String,
    ttl: u64,
}

impl ActionCache {
    pub fn new(cache: Arc<CacheAdapter>, prefix: impl Into<String>, ttl: u64) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn with_default_ttl(cache: Arc<CacheAdapter>, prefix: impl Into<String>) -> Self {
        Self::new(cache, prefix, DEFAULT_CACHE_TIMEOUT)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key for a given parameter set.
    pub fn key_for<K: AsRef<str>, V: AsRef<str>>(&self, params: &[(K, V)]) -> String {
        action_key(&self.prefix, params)
    }

    /// Runs `handler` through the cache.
    ///
    /// Non-GET calls run the handler directly. Errors are returned as-is and
    /// never stored.
    pub async fn execute<T, E, F, Fut>(
        &self,
        method: &Method,
        params: &[(String, String)],
        handler: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !is_cacheable(method) {
            return handler().await;
        }

        let key = self.key_for(params);
        if let Some(cached) = self.cache.get_json::<T>(&key).await {
            return Ok(cached);
        }

        let fresh = handler().await?;
        self.cache.set_json(&key, &fresh, self.ttl).await;
        Ok(fresh)
    }
}

fn is_cacheable(method: &Method) -> bool {
    *method == Method::GET
}

/// Decoded query string, in request order.
pub fn query_params(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// What the layer keeps of a successful response.
#[derive(Debug, Serialize, Deserialize)]
struct StoredResponse {
    status: u16,
    content_type: Option<String>,
    body: String,
}

impl StoredResponse {
    fn into_response(self) -> Option<Response> {
        let status = StatusCode::from_u16(self.status).ok()?;
        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        match self.content_type.map(|ct| HeaderValue::from_str(&ct)) {
            Some(Ok(value)) => {
                headers.insert(header::CONTENT_TYPE, value);
            }
            Some(Err(_)) => return None,
            None => {
                headers.remove(header::CONTENT_TYPE);
            }
        }
        headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static("HIT"));
        Some(response)
    }
}

/// Axum middleware caching successful GET responses of one action.
///
/// Install it with `route_layer` on the action's route and add
/// authorization outside it, so a request is authorized before the cache
/// is consulted:
///
/// ```ignore
/// let reports = ActionCache::with_default_ttl(cache, "finance_reports_cash_balance");
/// Router::new()
///     .route(
///         "/finances/cash-balance",
///         get(cash_balance).route_layer(middleware::from_fn_with_state(reports, action_cache_layer)),
///     )
///     .layer(middleware::from_fn(require_auth));
/// ```
pub async fn action_cache_layer(
    State(action): State<ActionCache>,
    request: Request,
    next: Next,
) -> Response {
    if !is_cacheable(request.method()) {
        return next.run(request).await;
    }

    let params = query_params(request.uri().query());
    let key = action.key_for(&params);

    if let Some(stored) = action.cache.get_json::<StoredResponse>(&key).await {
        match stored.into_response() {
            Some(response) => {
                debug!(key = %key, outcome = "hit", "serving cached action response");
                return response;
            }
            None => warn!(key = %key, "discarding malformed cached action response"),
        }
    }

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));

    // Streamed and oversized bodies go out untouched.
    let bounded = body
        .size_hint()
        .upper()
        .is_some_and(|len| len <= MAX_VALUE_SIZE as u64);
    if !bounded {
        debug!(key = %key, "unbounded action response left uncached");
        return Response::from_parts(parts, body);
    }

    let bytes = match axum::body::to_bytes(body, MAX_VALUE_SIZE).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key = %key, error = %e, "failed to buffer action response, left uncached");
            let failed = stream::iter([Err::<Bytes, _>(e)]);
            return Response::from_parts(parts, Body::from_stream(failed));
        }
    };

    match std::str::from_utf8(&bytes) {
        Ok(text) => {
            let stored = StoredResponse {
                status: parts.status.as_u16(),
                content_type: parts
                    .headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                body: text.to_string(),
            };
            action.cache.set_json(&key, &stored, action.ttl).await;
        }
        Err(_) => debug!(key = %key, "binary action response left uncached"),
    }

    Response::from_parts(parts, Body::from(bytes))
}
