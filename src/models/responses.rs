//! Response DTOs for the operator API

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, InvalidationReport};

/// Response body for `GET /store/keys/:key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub key: String,
    pub value: String,
}

impl GetResponse {
    pub fn new(key: String, value: String) -> Self {
        Self { key, value }
    }
}

/// Response body for `PUT /store/keys/:key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetResponse {
    pub key: String,
    pub success: bool,
}

impl SetResponse {
    pub fn new(key: String) -> Self {
        Self { key, success: true }
    }
}

/// Response body for `GET /store/keys`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Response body for the eviction endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedResponse {
    /// Number of keys evicted
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(removed: usize) -> Self {
        Self { removed }
    }
}

/// Response body for `POST /cache/notify`
#[derive(Debug, Clone, Serialize)]
pub struct NotifyResponse {
    pub entity_type: String,
    pub removed: usize,
    pub detail: InvalidationReport,
}

impl NotifyResponse {
    pub fn new(entity_type: impl Into<String>, detail: InvalidationReport) -> Self {
        Self {
            entity_type: entity_type.into(),
            removed: detail.total(),
            detail,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: CacheStats,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(counters: CacheStats) -> Self {
        Self {
            hit_rate: counters.hit_rate(),
            counters,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body, as produced by `CacheError`'s `IntoResponse`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_flattens_counters() {
        let mut stats = CacheStats::new();
        stats.hits = 8;
        stats.misses = 2;
        stats.invalidations = 15;

        let json = serde_json::to_value(StatsResponse::from(stats)).unwrap();
        assert_eq!(json["hits"], 8);
        assert_eq!(json["invalidations"], 15);
        assert!((json["hit_rate"].as_f64().unwrap() - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::new());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_notify_response_totals() {
        let report = InvalidationReport {
            list_keys: 15,
            detail_keys: 1,
            action_keys: 3,
        };
        let json = serde_json::to_value(NotifyResponse::new("Finance", report)).unwrap();
        assert_eq!(json["removed"], 19);
        assert_eq!(json["detail"]["list_keys"], 15);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&RemovedResponse::new(3)).unwrap();
        assert_eq!(json, r#"{"removed":3}"#);
        let json = serde_json::to_string(&ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }
}
