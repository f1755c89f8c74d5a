/// Protocol adapter registry
///
/// Maps protocol identifiers to adapters. Lookups take a shared read lock and
/// hand out an `Arc`, so resolution from many workers never blocks on other
/// readers. Registration takes the write lock briefly.
use super::adapters::{ AaveV3Adapter, CompoundV2Adapter, CompoundV3Adapter, ProtocolAdapter };
use crate::arguments::is_debug_registry_enabled;
use crate::config::MetricsConfig;
use crate::errors::{ MetricsError, MetricsResult };
use crate::logger::{ self, LogTag };
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of protocol adapters keyed by lowercase protocol id
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn ProtocolAdapter>>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding every built-in adapter
    pub fn with_builtin_adapters(config: &MetricsConfig) -> Self {
        let registry = Self::new();
        let builtin: [Arc<dyn ProtocolAdapter>; 3] = [
            Arc::new(AaveV3Adapter::new(config.seconds_per_year)),
            Arc::new(CompoundV2Adapter::new()),
            Arc::new(CompoundV3Adapter::new()),
        ];
        for adapter in builtin {
            let protocol_id = adapter.protocol_id().to_string();
            registry.register(&protocol_id, adapter);
        }
        registry
    }

    /// Register an adapter, replacing any previous one for the same id
    ///
    /// Returns the replaced adapter, if there was one.
    pub fn register(
        &self,
        protocol_id: &str,
        adapter: Arc<dyn ProtocolAdapter>
    ) -> Option<Arc<dyn ProtocolAdapter>> {
        let key = normalize_id(protocol_id);
        let previous = self.adapters.write().insert(key.clone(), adapter);

        if previous.is_some() {
            logger::warning(
                LogTag::Registry,
                &format!("Adapter for '{}' replaced by a new registration", key)
            );
        } else if is_debug_registry_enabled() {
            logger::debug(LogTag::Registry, &format!("Registered adapter for '{}'", key));
        }

        previous
    }

    /// Look up the adapter for a protocol id
    pub fn resolve(&self, protocol_id: &str) -> MetricsResult<Arc<dyn ProtocolAdapter>> {
        let key = normalize_id(protocol_id);
        self.adapters
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| MetricsError::UnknownProtocol {
                protocol_id: protocol_id.to_string(),
            })
    }

    /// Registered protocol ids, sorted
    pub fn protocols(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.adapters.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.adapters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.read().is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_id(protocol_id: &str) -> String {
    protocol_id.trim().to_ascii_lowercase()
}
