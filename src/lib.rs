//! Stratum
//!
//! Transactional command core for a graph-backed content repository: an
//! embedded property-graph store wrapped by a command layer that keeps
//! typed wrapping, ownership, indexing and lifecycle hooks in step with
//! the data transactions that drive them.
//!
//! # Architecture
//!
//! - [`graph`] — data model and the embedded store with buffered,
//!   single-writer transactions
//! - [`schema`] — type registry, lifecycle hooks and post-creation
//!   transformations (priority-ordered)
//! - [`index`] — named text and spatial indices, each serialized behind
//!   its own lock
//! - [`entity`] — typed node/relationship wrappers
//! - [`command`] — the command layer: transactions with post-processing,
//!   node creation, indexing, typed wrapping, search
//! - [`security`] — per-operation security contexts and visibility rules
//!
//! # Example
//!
//! ```rust
//! use stratum::command::CreateNodeCommand;
//! use stratum::graph::{keys, PropertyMap};
//! use stratum::security::SecurityContext;
//! use stratum::service::GraphService;
//!
//! let service = GraphService::new_default();
//! let security = SecurityContext::super_user();
//!
//! let node = service
//!     .transaction(security)
//!     .execute(|ctx| {
//!         let mut props = PropertyMap::new();
//!         props.insert(keys::TYPE.to_string(), "Page".into());
//!         props.insert(keys::NAME.to_string(), "Home".into());
//!         CreateNodeCommand::new(ctx.service(), ctx.security().clone()).execute(ctx, props)
//!     })
//!     .unwrap();
//!
//! assert!(service.store().node(node.id()).is_some());
//! ```

#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod index;
pub mod schema;
pub mod security;
pub mod service;

// Re-export main types for convenience
pub use command::{
    ChangeSet, CreateNodeCommand, CreateRelationshipCommand, DeleteNodeCommand, DeletedObject,
    IndexNodeCommand, NodeFactory, ObjectRef, ResultList, SearchNodeCommand, TransactionCommand,
    TxContext, IMPROBABLE_SEARCH_VALUE,
};
pub use config::{ConfigError, ConfigResult, ServiceConfig};
pub use entity::{TypedNode, TypedRelationship};
pub use error::{FrameworkError, FrameworkResult};
pub use graph::{
    keys, Direction, GraphStore, NativeTx, NodeId, NodeRecord, PropertyMap, PropertyValue,
    RelationshipId, RelationshipRecord, RelationshipType, StoreError, StoreResult,
};
pub use index::{GeoHit, IndexHits, IndexKind, IndexProvider, IndexTerm};
pub use schema::{
    CreationTransform, LifecycleHooks, NodeTypeDef, RelationshipTypeDef, TypeRegistry,
    GENERIC_TYPE,
};
pub use security::{Permission, Principal, SecurityContext, SECURITY_RELATIONSHIP};
pub use service::GraphService;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
