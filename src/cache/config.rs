//! Per-resource cache configuration.

use serde::Deserialize;

/// Default lifetime of a cached payload, in seconds.
pub const DEFAULT_CACHE_TIMEOUT: u64 = 3600;

/// How one resource is cached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceCacheConfig {
    /// Namespace of the resource's keys. Derived from the model name when unset.
    #[serde(default)]
    pub cache_key_prefix: Option<String>,
    /// Entry lifetime in seconds
    #[serde(default = "default_timeout")]
    pub cache_timeout: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_CACHE_TIMEOUT
}

impl Default for ResourceCacheConfig {
    fn default() -> Self {
        Self {
            cache_key_prefix: None,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }
}

impl ResourceCacheConfig {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            cache_key_prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.cache_timeout = seconds;
        self
    }

    /// The configured prefix, or the lower-cased model name with an `s`.
    ///
    /// `resolve_prefix("Seller")` is `"sellers"` when no prefix is set.
    pub fn resolve_prefix(&self, model_name: &str) -> String {
        match &self.cache_key_prefix {
            Some(prefix) if !prefix.is_empty() => prefix.clone(),
            _ => format!("{}s", model_name.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = ResourceCacheConfig::default();
        assert_eq!(config.cache_timeout, 3600);
        assert!(config.cache_key_prefix.is_none());
    }

    #[test]
    fn explicit_prefix_wins() {
        let config = ResourceCacheConfig::with_prefix("cash").timeout(60);
        assert_eq!(config.resolve_prefix("Cash"), "cash");
        assert_eq!(config.cache_timeout, 60);
    }

    #[test]
    fn prefix_derived_from_model_name() {
        let config = ResourceCacheConfig::default();
        assert_eq!(config.resolve_prefix("Seller"), "sellers");
        assert_eq!(config.resolve_prefix("Devolution"), "devolutions");
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: ResourceCacheConfig =
            serde_json::from_str(r#"{"cache_key_prefix":"finances"}"#).unwrap();
        assert_eq!(config.cache_timeout, DEFAULT_CACHE_TIMEOUT);
        assert_eq!(config.resolve_prefix("Finance"), "finances");
    }
}
