//! Cache Adapter Module
//!
//! Best-effort front for a [`CacheBackend`]. Every backend call runs under a
//! short timeout and every failure is logged and swallowed: reads degrade to
//! misses, writes and evictions to no-ops. Callers never see a cache error.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use glob::Pattern;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::keys::{action_prefix, detail_key, list_prefix, resource_prefix};
use crate::cache::{CacheBackend, CacheStats, KeyIndex};
use crate::error::{CacheError, Result};

/// Budget for a single backend round trip.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(250);

// == Cache Adapter ==
pub struct CacheAdapter {
    backend: Arc<dyn CacheBackend>,
    /// Only kept when the backend cannot enumerate its own keys.
    index: Option<KeyIndex>,
    op_timeout: Duration,
    stats: Mutex<CacheStats>,
}

impl CacheAdapter {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_timeout(backend, DEFAULT_OP_TIMEOUT)
    }

    pub fn with_timeout(backend: Arc<dyn CacheBackend>, op_timeout: Duration) -> Self {
        let index = (!backend.enumerates_keys()).then(KeyIndex::new);
        Self {
            backend,
            index,
            op_timeout,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    /// Keys written through this adapter that may still be live, when the
    /// backend needs them tracked for prefix eviction.
    pub fn index(&self) -> Option<&KeyIndex> {
        self.index.as_ref()
    }

    fn counters(&self) -> MutexGuard<'_, CacheStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn call<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .unwrap_or_else(|_| Err(CacheError::Timeout(self.op_timeout)))
    }

    fn swallow(&self, op: &'static str, key: &str, err: &CacheError) {
        warn!(op, key, error = %err, "cache backend call failed, continuing without cache");
        self.counters().record_backend_error();
    }

    // == Get ==
    /// Raw payload for `key`; `None` on miss, failure or timeout.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.call(self.backend.get(key)).await {
            Ok(Some(value)) => {
                self.counters().record_hit();
                debug!(key, outcome = "hit", "cache lookup");
                Some(value)
            }
            Ok(None) => {
                self.counters().record_miss();
                debug!(key, outcome = "miss", "cache lookup");
                None
            }
            Err(e) => {
                self.swallow("get", key, &e);
                self.counters().record_miss();
                None
            }
        }
    }

    /// Decoded payload for `key`. Undecodable payloads count as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                self.swallow("decode", key, &CacheError::Serialization(e));
                None
            }
        }
    }

    // == Set ==
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: u64) {
        // Indexed before the call: a timed-out write may still land.
        if let Some(index) = &self.index {
            index.record(key, ttl_seconds);
        }
        match self.call(self.backend.set(key, value, ttl_seconds)).await {
            Ok(()) => {
                // Again once landed, in case an eviction dropped it meanwhile.
                if let Some(index) = &self.index {
                    index.record(key, ttl_seconds);
                }
                self.counters().record_set();
            }
            Err(e) => self.swallow("set", key, &e),
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw, ttl_seconds).await,
            Err(e) => self.swallow("encode", key, &CacheError::Serialization(e)),
        }
    }

    // == Delete ==
    /// Evicts one key. Returns whether the backend reported it present.
    pub async fn delete(&self, key: &str) -> bool {
        let removed = self.remove_key(key).await;
        if removed {
            self.counters().record_invalidations(1);
        }
        removed
    }

    /// A key leaves the index only once the backend confirms it removed.
    async fn remove_key(&self, key: &str) -> bool {
        match self.call(self.backend.delete(key)).await {
            Ok(true) => {
                if let Some(index) = &self.index {
                    index.forget(key);
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.swallow("delete", key, &e);
                false
            }
        }
    }

    /// Evicts every key starting with `prefix` and returns how many went.
    ///
    /// Tries the backend's pattern deletion, then its key listing, then the
    /// adapter's own index of issued keys.
    pub async fn delete_by_prefix(&self, prefix: &str) -> usize {
        let pattern = format!("{}*", Pattern::escape(prefix));

        let removed = match self.call(self.backend.delete_pattern(&pattern)).await {
            Ok(count) => count,
            Err(CacheError::Unsupported(_)) => self.delete_listed(prefix, &pattern).await,
            Err(e) => {
                self.swallow("delete_pattern", &pattern, &e);
                0
            }
        };

        self.counters().record_invalidations(removed);
        debug!(prefix, removed, "prefix eviction");
        removed
    }

    async fn delete_listed(&self, prefix: &str, pattern: &str) -> usize {
        let keys = match self.call(self.backend.keys(pattern)).await {
            Ok(keys) => keys,
            Err(CacheError::Unsupported(_)) => self
                .index
                .as_ref()
                .map(|index| index.with_prefix(prefix))
                .unwrap_or_default(),
            Err(e) => {
                self.swallow("keys", pattern, &e);
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            if self.remove_key(&key).await {
                removed += 1;
            }
        }
        removed
    }

    // == Invalidation Helpers ==
    /// Clears every page of a resource's list cache.
    pub async fn invalidate_model_cache(&self, prefix: &str) -> usize {
        self.delete_by_prefix(&list_prefix(prefix)).await
    }

    /// Clears one object's detail entry.
    pub async fn invalidate_model_detail_cache(&self, prefix: &str, id: &str) -> bool {
        self.delete(&detail_key(prefix, id)).await
    }

    /// Clears list pages and all detail entries of a resource.
    pub async fn invalidate_all_model_caches(&self, prefix: &str) -> usize {
        self.delete_by_prefix(&resource_prefix(prefix)).await
    }

    /// Clears every cached result of an action family, whatever its parameters.
    pub async fn clear_action_caches(&self, prefix: &str) -> usize {
        self.delete_by_prefix(&action_prefix(prefix)).await
    }

    // == Stats ==
    /// Adapter counters merged with whatever the backend reports.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.counters().clone();
        if let Ok(Some(backend)) = tokio::time::timeout(self.op_timeout, self.backend.stats()).await {
            stats.evictions = backend.evictions;
            stats.expirations = backend.expirations;
            stats.set_total_entries(backend.total_entries);
        } else if let Some(index) = &self.index {
            index.sweep_expired();
            stats.set_total_entries(index.len());
        }
        stats
    }
}
