//! Cache Module
//!
//! Response caching for the distribution backend's resources and reports:
//! key derivation, a best-effort adapter over a pluggable backend (in-process
//! or a remote store), the read-through interceptor, the action cache, and
//! write-driven invalidation.

mod action;
mod adapter;
mod backend;
mod config;
mod entry;
mod index;
mod interceptor;
pub mod keys;
mod lru;
mod notifier;
mod registry;
mod remote;
mod stats;
mod store;


// Re-export public types
pub use action::{action_cache_layer, query_params, ActionCache, CACHE_STATUS_HEADER};
pub use adapter::{CacheAdapter, DEFAULT_OP_TIMEOUT};
pub use backend::{CacheBackend, MemoryBackend};
pub use config::{ResourceCacheConfig, DEFAULT_CACHE_TIMEOUT};
pub use entry::CacheEntry;
pub use index::KeyIndex;
pub use interceptor::{CachingInterceptor, MutationKind};
pub use keys::CacheKey;
pub use notifier::{ChangeKind, ChangeNotifier, InvalidationReport};
pub use registry::{InvalidationRegistry, InvalidationRule, RegistryBuilder};
pub use remote::RemoteBackend;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
