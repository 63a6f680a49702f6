use crate::discovery::descriptor::{Instance, TypeKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Service scope enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceScope {
    /// Single instance shared across the provider
    Singleton,
    /// New instance created for each resolution
    Transient,
    /// Instance shared within one scope (e.g., a request)
    Scoped,
}

impl ServiceScope {
    /// Get the scope name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceScope::Singleton => "singleton",
            ServiceScope::Transient => "transient",
            ServiceScope::Scoped => "scoped",
        }
    }
}

impl std::fmt::Display for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServiceScope {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(ServiceScope::Singleton),
            "transient" => Ok(ServiceScope::Transient),
            "scoped" => Ok(ServiceScope::Scoped),
            _ => Err(crate::errors::CoreError::InvalidServiceScope {
                scope: s.to_string(),
            }),
        }
    }
}

/// Instances cached for the lifetime of one scope
#[derive(Debug)]
pub struct ScopedServiceManager {
    scope_id: uuid::Uuid,
    services: HashMap<TypeKey, Instance>,
}

impl ScopedServiceManager {
    /// Create a new scoped service manager
    pub fn new() -> Self {
        Self {
            scope_id: uuid::Uuid::new_v4(),
            services: HashMap::new(),
        }
    }

    /// Get the scope ID
    pub fn scope_id(&self) -> uuid::Uuid {
        self.scope_id
    }

    /// Cache an instance for `key`
    pub fn add_service(&mut self, key: TypeKey, instance: Instance) {
        self.services.insert(key, instance);
    }

    /// Get the cached instance for `key`
    pub fn get_service(&self, key: &TypeKey) -> Option<Instance> {
        self.services.get(key).cloned()
    }

    /// Check if an instance is cached for `key`
    pub fn has_service(&self, key: &TypeKey) -> bool {
        self.services.contains_key(key)
    }

    /// Drop every cached instance
    pub fn clear(&mut self) {
        self.services.clear();
    }

    /// Get the number of cached instances
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

impl Default for ScopedServiceManager {
    fn default() -> Self {
        Self::new()
    }
}
