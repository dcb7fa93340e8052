//! Configuration Module
//!
//! Process configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_CACHE_TIMEOUT, DEFAULT_OP_TIMEOUT};

const DEFAULT_MAX_ENTRIES: usize = 10_000;
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_CLEANUP_INTERVAL: u64 = 30;

/// Server configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capacity of the in-memory backend
    pub max_entries: usize,
    /// TTL in seconds for entries written without an explicit one
    pub default_ttl: u64,
    /// Operator API port
    pub server_port: u16,
    /// Sweeper interval in seconds
    pub cleanup_interval: u64,
    /// Budget for a single backend call
    pub cache_op_timeout: Duration,
}

impl Config {
    /// Loads the configuration, falling back to defaults for unset or
    /// unparsable variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - in-memory backend capacity (default: 10000)
    /// - `DEFAULT_TTL` - default TTL in seconds (default: 3600)
    /// - `SERVER_PORT` - operator API port (default: 3000)
    /// - `CLEANUP_INTERVAL` - sweeper interval in seconds (default: 30)
    /// - `CACHE_OP_TIMEOUT_MS` - per-call backend timeout in ms (default: 250)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_or(env::var("MAX_ENTRIES").ok(), defaults.max_entries),
            default_ttl: parse_or(env::var("DEFAULT_TTL").ok(), defaults.default_ttl),
            server_port: parse_or(env::var("SERVER_PORT").ok(), defaults.server_port),
            cleanup_interval: parse_or(
                env::var("CLEANUP_INTERVAL").ok(),
                defaults.cleanup_interval,
            ),
            cache_op_timeout: Duration::from_millis(parse_or(
                env::var("CACHE_OP_TIMEOUT_MS").ok(),
                defaults.cache_op_timeout.as_millis() as u64,
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_CACHE_TIMEOUT,
            server_port: DEFAULT_SERVER_PORT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            cache_op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 30);
        assert_eq!(config.cache_op_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(Some("42".to_string()), 7u64), 42);
        assert_eq!(parse_or(Some(" 8080 ".to_string()), 3000u16), 8080);
        assert_eq!(parse_or(Some("lots".to_string()), 7u64), 7);
        assert_eq!(parse_or(Some("70000".to_string()), 3000u16), 3000);
        assert_eq!(parse_or(None, 5usize), 5);
    }
}
