//! Key Index Module
//!
//! Secondary index of the keys the adapter has written, ordered so that a
//! prefix lookup is a range scan. Only kept for backends that can neither
//! delete by pattern nor list their keys.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard};

use crate::cache::entry::current_timestamp_ms;

/// Size below which recording never triggers a sweep.
const MIN_SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Inner {
    /// key -> expiry (Unix ms) of the latest write
    keys: BTreeMap<String, i64>,
    sweep_at: usize,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            keys: BTreeMap::new(),
            sweep_at: MIN_SWEEP_THRESHOLD,
        }
    }
}

impl Inner {
    fn sweep(&mut self, now_ms: i64) -> usize {
        let before = self.keys.len();
        self.keys.retain(|_, expires_at| *expires_at > now_ms);
        before - self.keys.len()
    }
}

/// Sorted set of issued cache keys with the expiry of their last write.
///
/// A key leaves the index when a delete confirms it gone or when its TTL
/// has elapsed. Keys whose delete found nothing stay until they expire, so
/// a write that lands after an eviction scanned the index is still found by
/// the next one. Expired keys are swept whenever the index has doubled
/// since the last sweep, which bounds it by the keys written within one TTL.
#[derive(Debug, Default)]
pub struct KeyIndex {
    inner: Mutex<Inner>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the map intact.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records a write of `key` that expires `ttl_seconds` from now.
    pub fn record(&self, key: &str, ttl_seconds: u64) {
        let now = current_timestamp_ms();
        let ttl_ms = i64::try_from(ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_ms);

        let mut inner = self.lock();
        let slot = inner.keys.entry(key.to_string()).or_insert(expires_at);
        *slot = (*slot).max(expires_at);

        if inner.keys.len() >= inner.sweep_at {
            inner.sweep(now);
            inner.sweep_at = (inner.keys.len() * 2).max(MIN_SWEEP_THRESHOLD);
        }
    }

    /// Drops a key the backend confirmed gone.
    pub fn forget(&self, key: &str) {
        self.lock().keys.remove(key);
    }

    /// Unexpired keys starting with `prefix`, in order.
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        let now = current_timestamp_ms();
        self.lock()
            .keys
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(_, expires_at)| **expires_at > now)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Drops every expired key and returns how many went.
    pub fn sweep_expired(&self) -> usize {
        self.lock().sweep(current_timestamp_ms())
    }

    pub fn len(&self) -> usize {
        self.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scan_is_exact() {
        let index = KeyIndex::new();
        index.record("products_list_cache:page:1", 60);
        index.record("products_list_cache:page:12", 60);
        index.record("products_3_cache", 60);
        index.record("type_products_list_cache:page:1", 60);
        index.record("productsx", 60);

        assert_eq!(
            index.with_prefix("products_list_cache"),
            vec![
                "products_list_cache:page:1".to_string(),
                "products_list_cache:page:12".to_string(),
            ]
        );
        assert_eq!(index.with_prefix("nothing").len(), 0);
    }

    #[test]
    fn test_record_is_idempotent_and_forget() {
        let index = KeyIndex::new();
        index.record("k", 60);
        index.record("k", 60);
        assert_eq!(index.len(), 1);

        index.forget("k");
        index.forget("k");
        assert!(index.is_empty());
    }

    #[test]
    fn test_expired_keys_are_skipped_and_swept() {
        let index = KeyIndex::new();
        index.record("finance_reports_aa", 0);
        index.record("finance_reports_bb", 600);

        assert_eq!(index.with_prefix("finance_reports_"), vec!["finance_reports_bb"]);
        assert_eq!(index.sweep_expired(), 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_rewrite_extends_expiry() {
        let index = KeyIndex::new();
        index.record("cash_1_cache", 0);
        index.record("cash_1_cache", 600);

        assert_eq!(index.with_prefix("cash_"), vec!["cash_1_cache"]);
    }

    #[test]
    fn test_growth_is_bounded_by_expiry() {
        let index = KeyIndex::new();
        for day in 0..5000 {
            index.record(&format!("finance_reports_daily_summary_{}", day), 0);
        }

        assert!(index.len() < MIN_SWEEP_THRESHOLD);
    }
}
