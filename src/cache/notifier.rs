//! Change notifier.
//!
//! The persistence layer calls [`ChangeNotifier::on_commit`] right after a
//! create, update or delete has been committed. The notifier looks the
//! entity up in the [`InvalidationRegistry`] and evicts what went stale.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheAdapter, InvalidationRegistry};

/// Kind of committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// What a notification evicted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationReport {
    pub list_keys: usize,
    pub detail_keys: usize,
    pub action_keys: usize,
}

impl InvalidationReport {
    pub fn total(&self) -> usize {
        self.list_keys + self.detail_keys + self.action_keys
    }
}

#[derive(Clone)]
pub struct ChangeNotifier {
    registry: Arc<InvalidationRegistry>,
    cache: Arc<CacheAdapter>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("entities", &self.registry.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new(registry: Arc<InvalidationRegistry>, cache: Arc<CacheAdapter>) -> Self {
        Self { registry, cache }
    }

    pub fn registry(&self) -> &InvalidationRegistry {
        &self.registry
    }

    /// Evicts every cache entry made stale by a committed write.
    ///
    /// Returns `None` for entity types nobody registered. Must only be
    /// called after the write is durable. The eviction runs on its own task,
    /// so it completes even if the caller is dropped mid-way.
    pub async fn on_commit(
        &self,
        entity_type: &str,
        id: impl fmt::Display,
        kind: ChangeKind,
    ) -> Option<InvalidationReport> {
        let Some(rule) = self.registry.rule(entity_type).cloned() else {
            debug!(entity_type, "change to unregistered entity ignored");
            return None;
        };

        let cache = self.cache.clone();
        let id = id.to_string();
        let entity = entity_type.to_string();

        let eviction = tokio::spawn(async move {
            let mut report = InvalidationReport::default();
            for prefix in &rule.resource_prefixes {
                report.list_keys += cache.invalidate_model_cache(prefix).await;
                if cache.invalidate_model_detail_cache(prefix, &id).await {
                    report.detail_keys += 1;
                }
            }
            for prefix in &rule.action_prefixes {
                report.action_keys += cache.clear_action_caches(prefix).await;
            }
            info!(
                entity_type = %entity,
                id = %id,
                ?kind,
                removed = report.total(),
                "cache invalidated after commit"
            );
            report
        });

        match eviction.await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(entity_type, error = %e, "invalidation task failed");
                Some(InvalidationReport::default())
            }
        }
    }
}
