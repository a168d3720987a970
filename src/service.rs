//! Service aggregate
//!
//! Owns the store, the type registry and the named indices. Commands
//! are constructed from a service reference plus a security context, so
//! a command can never observe a missing storage backend.

use crate::command::TransactionCommand;
use crate::config::ServiceConfig;
use crate::graph::GraphStore;
use crate::index::IndexProvider;
use crate::schema::TypeRegistry;
use crate::security::SecurityContext;
use std::time::Duration;

pub struct GraphService {
    store: GraphStore,
    registry: TypeRegistry,
    indexes: IndexProvider,
    config: ServiceConfig,
}

impl GraphService {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_registry(config, TypeRegistry::new())
    }

    /// A service with the default configuration and an empty registry
    pub fn new_default() -> Self {
        Self::new(ServiceConfig::default())
    }

    pub fn with_registry(config: ServiceConfig, registry: TypeRegistry) -> Self {
        let store =
            GraphStore::with_deadlock_timeout(Duration::from_millis(config.deadlock_timeout_ms));
        GraphService {
            store,
            registry,
            indexes: IndexProvider::new(),
            config,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn indexes(&self) -> &IndexProvider {
        &self.indexes
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Convenience constructor for the transaction command
    pub fn transaction(&self, security: SecurityContext) -> TransactionCommand<'_> {
        TransactionCommand::new(self, security)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_wires_config_into_store() {
        let config = ServiceConfig {
            deadlock_timeout_ms: 123,
            ..ServiceConfig::default()
        };
        let service = GraphService::new(config);
        assert_eq!(service.config().deadlock_timeout_ms, 123);
        assert_eq!(service.store().node_count(), 0);
    }
}
