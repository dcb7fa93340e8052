//! Cache Backend Module
//!
//! The outbound contract every key/value cache service must satisfy, and the
//! in-process implementation used by default.

use std::sync::Arc;

use async_trait::async_trait;
use glob::Pattern;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::error::{CacheError, Result};

// == Cache Backend Trait ==
/// A key/value cache service holding serialized payloads with expiration.
///
/// `get`, `set` and `delete` are mandatory. Pattern deletion and key listing
/// are optional capabilities: the default bodies answer `Unsupported` and the
/// adapter falls back to its own key index. A backend overriding either one
/// should also answer `true` from [`CacheBackend::enumerates_keys`], so the
/// adapter can skip that index.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Whether `delete_pattern` or `keys` is implemented.
    fn enumerates_keys(&self) -> bool {
        false
    }

    /// Returns the payload, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a payload that expires after `ttl_seconds`.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    /// Removes a key. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Removes every key matching a glob pattern (`*`, `?`, `[...]`).
    async fn delete_pattern(&self, _pattern: &str) -> Result<usize> {
        Err(CacheError::Unsupported("delete_pattern"))
    }

    /// Lists keys matching a glob pattern.
    async fn keys(&self, _pattern: &str) -> Result<Vec<String>> {
        Err(CacheError::Unsupported("keys"))
    }

    /// Backend-side counters, when the backend keeps any.
    async fn stats(&self) -> Option<CacheStats> {
        None
    }
}

// == Memory Backend ==
/// Process-local backend over a shared [`CacheStore`].
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<RwLock<CacheStore>>,
}

impl MemoryBackend {
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self::from_store(CacheStore::new(max_entries, default_ttl))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Shared handle to the underlying store, used by the cleanup task.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        self.store.clone()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern)
        .map_err(|e| CacheError::InvalidRequest(format!("bad pattern {:?}: {}", pattern, e)))
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn enumerates_keys(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        // Write lock: a read touches recency and may drop an expired entry.
        let mut store = self.store.write().await;
        match store.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(CacheError::NotFound(_)) | Err(CacheError::Expired(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut store = self.store.write().await;
        store.set(key.to_string(), value.to_string(), Some(ttl_seconds))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.store.write().await.delete(key))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let pattern = compile(pattern)?;
        Ok(self.store.write().await.delete_pattern(&pattern))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = compile(pattern)?;
        Ok(self.store.read().await.keys_matching(&pattern))
    }

    async fn stats(&self) -> Option<CacheStats> {
        Some(self.store.read().await.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new(100, 3600);

        backend.set("cash_list_cache:page:1", "[]", 60).await.unwrap();

        assert_eq!(
            backend.get("cash_list_cache:page:1").await.unwrap(),
            Some("[]".to_string())
        );
        assert_eq!(backend.get("cash_list_cache:page:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_backend_delete() {
        let backend = MemoryBackend::new(100, 3600);
        backend.set("k", "v", 60).await.unwrap();

        assert!(backend.delete("k").await.unwrap());
        assert!(!backend.delete("k").await.unwrap());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_backend_patterns() {
        let backend = MemoryBackend::new(100, 3600);
        backend.set("yapes_list_cache:page:1", "[]", 60).await.unwrap();
        backend.set("yapes_list_cache:page:11", "[]", 60).await.unwrap();
        backend.set("yapes_9_cache", "{}", 60).await.unwrap();

        let keys = backend.keys("yapes_list_cache*").await.unwrap();
        assert_eq!(keys.len(), 2);

        assert_eq!(backend.delete_pattern("yapes_list_cache*").await.unwrap(), 2);
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_backend_rejects_bad_pattern() {
        let backend = MemoryBackend::new(100, 3600);
        let result = backend.delete_pattern("[unclosed").await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_memory_backend_stats() {
        let backend = MemoryBackend::new(100, 3600);
        backend.set("k", "v", 60).await.unwrap();
        backend.get("k").await.unwrap();
        backend.get("missing").await.unwrap();

        let stats = backend.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
