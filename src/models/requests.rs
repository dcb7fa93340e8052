//! Request DTOs for the operator API

use serde::{Deserialize, Serialize};

use crate::cache::ChangeKind;

/// Body of `PUT /store/keys/:key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    pub value: String,
    /// TTL in seconds; the store default when absent
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Query of the pattern endpoints, e.g. `?pattern=finances_list_cache*`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternQuery {
    /// Glob pattern (`*`, `?`, `[...]`)
    pub pattern: String,
}

impl PatternQuery {
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("pattern cannot be empty".to_string());
        }
        None
    }
}

/// Body of `POST /cache/notify`, sent by writers running outside this
/// process after they commit.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyRequest {
    /// Registered entity type, e.g. `DetailAssignment`
    pub entity_type: String,
    /// Primary key of the changed row
    pub id: String,
    pub kind: ChangeKind,
}

impl NotifyRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.entity_type.trim().is_empty() {
            return Some("entity_type cannot be empty".to_string());
        }
        if self.id.trim().is_empty() {
            return Some("id cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_request_deserialize() {
        let json = r#"{"entity_type": "Finance", "id": "12", "kind": "updated"}"#;
        let req: NotifyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.entity_type, "Finance");
        assert_eq!(req.id, "12");
        assert_eq!(req.kind, ChangeKind::Updated);
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_set_request_ttl_is_optional() {
        let req: SetRequest = serde_json::from_str(r#"{"value": "[]"}"#).unwrap();
        assert_eq!(req.value, "[]");
        assert!(req.ttl.is_none());

        let req: SetRequest = serde_json::from_str(r#"{"value": "{}", "ttl": 600}"#).unwrap();
        assert_eq!(req.ttl, Some(600));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let query = PatternQuery {
            pattern: String::new(),
        };
        assert!(query.validate().is_some());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"{"entity_type": "Finance", "id": "12", "kind": "archived"}"#;
        assert!(serde_json::from_str::<NotifyRequest>(json).is_err());
    }

    #[test]
    fn test_validate_empty_fields() {
        let req = NotifyRequest {
            entity_type: " ".to_string(),
            id: "1".to_string(),
            kind: ChangeKind::Created,
        };
        assert!(req.validate().is_some());

        let req = NotifyRequest {
            entity_type: "Seller".to_string(),
            id: String::new(),
            kind: ChangeKind::Deleted,
        };
        assert!(req.validate().is_some());
    }
}
