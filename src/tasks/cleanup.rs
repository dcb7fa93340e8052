//! TTL Cleanup Task
//!
//! Periodically sweeps expired entries out of the in-memory backend. Entries
//! also expire lazily on read, so the sweep only bounds memory held by keys
//! nobody asks for again (old report digests, pages past the end of a list).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns the sweeper over `store`, running every `cleanup_interval_secs`.
///
/// The returned handle is aborted on shutdown.
///
/// ```ignore
/// let backend = MemoryBackend::new(10_000, 3600);
/// let sweeper = spawn_cleanup_task(backend.store(), 30);
/// // during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task(
    store: Arc<RwLock<CacheStore>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "TTL sweeper started");

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut guard = store.write().await;
                let removed = guard.cleanup_expired();
                (removed, guard.len())
            };

            if removed > 0 {
                info!(removed, remaining, "TTL sweep evicted expired entries");
            } else {
                debug!(remaining, "TTL sweep found nothing to evict");
            }
        }
    })
}
