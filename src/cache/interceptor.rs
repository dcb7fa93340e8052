//! Caching interceptor for resource list, detail and mutation handlers.
//!
//! Read handlers are passed in as loaders and only run on a miss. Mutation
//! handlers always run; invalidation follows only when they succeed.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::keys::{detail_key, list_key};
use crate::cache::{CacheAdapter, ResourceCacheConfig};

/// Write operations a resource exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    PartialUpdate,
    Delete,
}

impl MutationKind {
    /// Whether the write touches an existing object's detail entry.
    pub fn targets_existing(self) -> bool {
        !matches!(self, MutationKind::Create)
    }
}

/// Read-through cache in front of one resource.
#[derive(Clone)]
pub struct CachingInterceptor {
    cache: Arc<CacheAdapter>,
    prefix: String,
    timeout: u64,
}

impl fmt::Debug for CachingInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingInterceptor")
            .field("prefix", &self.prefix)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CachingInterceptor {
    pub fn new(cache: Arc<CacheAdapter>, config: &ResourceCacheConfig, model_name: &str) -> Self {
        Self {
            cache,
            prefix: config.resolve_prefix(model_name),
            timeout: config.cache_timeout,
        }
    }

    pub fn for_prefix(cache: Arc<CacheAdapter>, prefix: impl Into<String>) -> Self {
        let config = ResourceCacheConfig::with_prefix(prefix);
        Self::new(cache, &config, "")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Serves one page of the resource's list.
    ///
    /// A hit returns the stored payload without calling `loader`. On a miss
    /// the loader's result is stored, then returned. Loader errors pass
    /// through untouched and nothing is stored.
    pub async fn handle_list<T, E, F, Fut>(&self, page: Option<&str>, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = list_key(&self.prefix, page);
        self.read_through(&key, loader).await
    }

    /// Serves one object's detail view.
    pub async fn handle_detail<T, E, F, Fut>(
        &self,
        id: impl fmt::Display,
        loader: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = detail_key(&self.prefix, id);
        self.read_through(&key, loader).await
    }

    async fn read_through<T, E, F, Fut>(&self, key: &str, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.cache.get_json::<T>(key).await {
            return Ok(cached);
        }

        let fresh = loader().await?;
        self.cache.set_json(key, &fresh, self.timeout).await;
        Ok(fresh)
    }

    /// Runs a write and, only if it succeeds, evicts what it made stale.
    ///
    /// The list family is always cleared. Update, partial update and delete
    /// of a known `id` also clear that object's detail entry.
    pub async fn handle_mutation<T, E, F, Fut>(
        &self,
        kind: MutationKind,
        id: Option<&str>,
        operation: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let outcome = operation().await?;

        let detail = id.filter(|_| kind.targets_existing()).map(str::to_string);
        self.invalidate_committed(kind, detail).await;

        Ok(outcome)
    }

    async fn invalidate_committed(&self, kind: MutationKind, detail_id: Option<String>) {
        let cache = self.cache.clone();
        let prefix = self.prefix.clone();

        // Spawned so that dropping the caller after the commit cannot cancel it.
        let eviction = tokio::spawn(async move {
            let removed = cache.invalidate_model_cache(&prefix).await;
            if let Some(id) = detail_id {
                cache.invalidate_model_detail_cache(&prefix, &id).await;
            }
            debug!(prefix = %prefix, ?kind, removed, "invalidated after write");
        });

        if let Err(e) = eviction.await {
            warn!(prefix = %self.prefix, error = %e, "post-write invalidation task failed");
        }
    }
}
