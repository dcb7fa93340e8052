//! Invalidation registry.
//!
//! Static map from persisted entity types to the cache families a change to
//! that entity makes stale. Built once at startup, read-only afterwards.

use std::collections::{BTreeSet, HashMap};

/// Cache families affected by one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationRule {
    /// Resource prefixes whose list and detail caches must be cleared
    pub resource_prefixes: BTreeSet<String>,
    /// Action-cache families cleared by prefix across parameter digests
    pub action_prefixes: BTreeSet<String>,
}

/// Frozen entity → rule mapping.
#[derive(Debug, Clone, Default)]
pub struct InvalidationRegistry {
    rules: HashMap<String, InvalidationRule>,
}

impl InvalidationRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn rule(&self, entity_type: &str) -> Option<&InvalidationRule> {
        self.rules.get(entity_type)
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.rules.contains_key(entity_type)
    }

    /// Registered entity types, sorted.
    pub fn entity_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Collects registrations before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    rules: HashMap<String, InvalidationRule>,
}

impl RegistryBuilder {
    /// Clears `prefix`'s list and detail caches whenever `entity_type` changes.
    ///
    /// Registering the same pair twice has no further effect.
    pub fn register(mut self, entity_type: &str, prefix: &str) -> Self {
        self.rules
            .entry(entity_type.to_string())
            .or_default()
            .resource_prefixes
            .insert(prefix.to_string());
        self
    }

    /// Clears the action-cache family `action_prefix` whenever `entity_type` changes.
    pub fn register_action_cache(mut self, entity_type: &str, action_prefix: &str) -> Self {
        self.rules
            .entry(entity_type.to_string())
            .or_default()
            .action_prefixes
            .insert(action_prefix.to_string());
        self
    }

    pub fn build(self) -> InvalidationRegistry {
        InvalidationRegistry { rules: self.rules }
    }
}
