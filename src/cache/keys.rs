//! Cache key derivation.
//!
//! Keys are pure functions of their inputs:
//!
//! | Kind   | Shape                              |
//! |--------|------------------------------------|
//! | List   | `{prefix}_list_cache:page:{page}`  |
//! | Detail | `{prefix}_{id}_cache`              |
//! | Action | `{action_prefix}_{digest}`         |
//!
//! The action digest is the first 128 bits of a SHA-256 over the canonical
//! parameter set, hex encoded.

use std::fmt;

use sha2::{Digest, Sha256};

/// Page used when a list request does not name one.
pub const DEFAULT_PAGE: &str = "1";

/// Bytes of the SHA-256 kept in action keys.
const ACTION_DIGEST_BYTES: usize = 16;

/// A derived cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    List { prefix: String, page: String },
    Detail { prefix: String, id: String },
    Action { prefix: String, digest: String },
}

impl CacheKey {
    /// Key for one page of a resource's list view.
    pub fn list(prefix: &str, page: Option<&str>) -> Self {
        let page = page
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PAGE);
        CacheKey::List {
            prefix: prefix.to_string(),
            page: page.to_string(),
        }
    }

    /// Key for one object's detail view.
    pub fn detail(prefix: &str, id: impl fmt::Display) -> Self {
        CacheKey::Detail {
            prefix: prefix.to_string(),
            id: id.to_string(),
        }
    }

    /// Key for a read action invoked with `params`.
    pub fn action<K, V>(prefix: &str, params: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        CacheKey::Action {
            prefix: prefix.to_string(),
            digest: params_digest(params),
        }
    }

    pub fn prefix(&self) -> &str {
        match self {
            CacheKey::List { prefix, .. }
            | CacheKey::Detail { prefix, .. }
            | CacheKey::Action { prefix, .. } => prefix,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::List { prefix, page } => write!(f, "{}_list_cache:page:{}", prefix, page),
            CacheKey::Detail { prefix, id } => write!(f, "{}_{}_cache", prefix, id),
            CacheKey::Action { prefix, digest } => write!(f, "{}_{}", prefix, digest),
        }
    }
}

/// `{prefix}_list_cache:page:{page}`
pub fn list_key(prefix: &str, page: Option<&str>) -> String {
    CacheKey::list(prefix, page).to_string()
}

/// `{prefix}_{id}_cache`
pub fn detail_key(prefix: &str, id: impl fmt::Display) -> String {
    CacheKey::detail(prefix, id).to_string()
}

/// `{action_prefix}_{digest}`
pub fn action_key<K, V>(prefix: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    CacheKey::action(prefix, params).to_string()
}

/// Prefix shared by every page of a resource's list cache.
///
/// Also matches the bare `{prefix}_list_cache` key older writers used.
pub fn list_prefix(prefix: &str) -> String {
    format!("{}_list_cache", prefix)
}

/// Prefix shared by every cache family of an action, across parameter digests.
pub fn action_prefix(prefix: &str) -> String {
    format!("{}_", prefix)
}

/// Prefix covering a resource's list pages and all of its detail entries.
pub fn resource_prefix(prefix: &str) -> String {
    format!("{}_", prefix)
}

/// Stable digest of a parameter set.
///
/// Parameters are stable-sorted by name, so repeated names keep their
/// relative order, and encoded as a JSON array of pairs so that no choice
/// of separator characters inside names or values can make two different
/// sets encode identically.
pub fn params_digest<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut canonical: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .collect();
    canonical.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = Sha256::new();
    hasher.update(b"[");
    for (i, (name, value)) in canonical.iter().enumerate() {
        if i > 0 {
            hasher.update(b",");
        }
        hasher.update(json_string(name).as_bytes());
        hasher.update(b":");
        hasher.update(json_string(value).as_bytes());
    }
    hasher.update(b"]");

    hex::encode(&hasher.finalize()[..ACTION_DIGEST_BYTES])
}

fn json_string(raw: &str) -> String {
    // Serializing a &str cannot fail.
    serde_json::to_string(raw).unwrap_or_default()
}
