//! Node indexing command
//!
//! Adds, updates and removes indexed property values at three
//! granularities: single property, whole node, and batch of nodes.
//! Indexing is best-effort relative to the data transaction it
//! accompanies: faults are contained and logged, never propagated.
//!
//! Rules per (node, property, index):
//! - nodes without a uuid are skipped (not yet persisted, or foreign);
//! - a null or empty-name property key is logged at error level; an
//!   empty-but-present key additionally gets the raw property removed
//!   as a repair action on the update/remove paths;
//! - null or empty values are indexed under the improbable-search-value
//!   sentinel so they stay distinctly queryable;
//! - updates are remove-then-add, never in-place;
//! - numeric values use numeric-aware terms so range queries work;
//! - uuid is mirrored into the uuid index, and name/email of principal
//!   types into the user index.

use super::search::indexed_term;
use crate::entity::TypedNode;
use crate::error::FrameworkResult;
use crate::graph::{keys, NativeTx, NodeId, NodeRecord};
use crate::index::{IndexKind, IndexProvider, IndexTerm};
use crate::security::SecurityContext;
use crate::service::GraphService;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add,
    Update,
    Remove,
}

pub struct IndexNodeCommand<'a> {
    service: &'a GraphService,
    security: SecurityContext,
}

impl<'a> IndexNodeCommand<'a> {
    pub fn new(service: &'a GraphService, security: SecurityContext) -> Self {
        IndexNodeCommand { service, security }
    }

    // ── Whole-node granularity ──

    pub fn add_node(&self, tx: &mut NativeTx<'_>, node: &TypedNode) {
        self.node_op(tx, node, Op::Add);
    }

    pub fn update_node(&self, tx: &mut NativeTx<'_>, node: &TypedNode) {
        self.node_op(tx, node, Op::Update);
    }

    pub fn remove_node(&self, tx: &mut NativeTx<'_>, node: &TypedNode) {
        self.node_op(tx, node, Op::Remove);
    }

    // ── Batch granularity ──

    pub fn add_nodes(&self, tx: &mut NativeTx<'_>, nodes: &[TypedNode]) {
        for node in nodes {
            self.add_node(tx, node);
        }
    }

    pub fn update_nodes(&self, tx: &mut NativeTx<'_>, nodes: &[TypedNode]) {
        for node in nodes {
            self.update_node(tx, node);
        }
    }

    pub fn remove_nodes(&self, tx: &mut NativeTx<'_>, nodes: &[TypedNode]) {
        for node in nodes {
            self.remove_node(tx, node);
        }
    }

    // ── Single-property granularity ──

    pub fn add_property(&self, tx: &mut NativeTx<'_>, node: &TypedNode, key: &str) {
        self.property_op(tx, node, key, Op::Add);
    }

    pub fn update_property(&self, tx: &mut NativeTx<'_>, node: &TypedNode, key: &str) {
        self.property_op(tx, node, key, Op::Update);
    }

    pub fn remove_property(&self, tx: &mut NativeTx<'_>, node: &TypedNode, key: &str) {
        self.property_op(tx, node, key, Op::Remove);
    }

    // ── Internals ──

    fn node_op(&self, tx: &mut NativeTx<'_>, node: &TypedNode, op: Op) {
        if let Err(e) = self.index_node(tx, node, op) {
            warn!("unable to index node {}: {}", node.id(), e);
        }
    }

    fn index_node(&self, tx: &mut NativeTx<'_>, node: &TypedNode, op: Op) -> FrameworkResult<()> {
        // don't touch records that were never persisted by this layer
        if node.uuid(tx).is_none() {
            return Ok(());
        }

        for kind in IndexKind::TEXT_KINDS {
            for key in node.type_def().searchable_keys(kind) {
                self.index_property_in(tx, node, &key, kind, op)?;
            }
        }

        let Some(record) = tx.node(node.id()) else {
            return Ok(());
        };
        if record.properties.contains_key(keys::LATITUDE)
            && record.properties.contains_key(keys::LONGITUDE)
        {
            self.index_layer(tx, node.id(), &record, op);
        }
        Ok(())
    }

    fn property_op(&self, tx: &mut NativeTx<'_>, node: &TypedNode, key: &str, op: Op) {
        if node.uuid(tx).is_none() {
            return;
        }
        for kind in IndexKind::TEXT_KINDS {
            if node.type_def().is_searchable(kind, key) {
                if let Err(e) = self.index_property_in(tx, node, key, kind, op) {
                    warn!(
                        "unable to index property {} of node {}: {}",
                        key,
                        node.id(),
                        e
                    );
                }
            }
        }
        if key == keys::LATITUDE || key == keys::LONGITUDE {
            if let Some(record) = tx.node(node.id()) {
                if record.properties.contains_key(keys::LATITUDE)
                    && record.properties.contains_key(keys::LONGITUDE)
                {
                    self.index_layer(tx, node.id(), &record, op);
                }
            }
        }
    }

    fn index_property_in(
        &self,
        tx: &mut NativeTx<'_>,
        node: &TypedNode,
        key: &str,
        kind: IndexKind,
        op: Op,
    ) -> FrameworkResult<()> {
        let id = node.id();

        if key.is_empty() {
            error!("node {} has empty property key, removing property", id);
            if matches!(op, Op::Update | Op::Remove) {
                // repair action: drop the unindexable raw property
                tx.remove_node_property(id, key)?;
            }
            return Ok(());
        }

        let value = node.property(tx, key);
        let term = indexed_term(value.as_ref());
        let indexes = self.service.indexes();

        Self::mutate(indexes, kind, id, key, &term, op);

        if node.type_def().is_principal() && (key == keys::NAME || key == keys::EMAIL) {
            Self::mutate(indexes, IndexKind::User, id, key, &term, op);
        }
        if key == keys::UUID {
            Self::mutate(indexes, IndexKind::Uuid, id, key, &term, op);
        }

        debug!(
            "indexed key {} on node {} in {} index for {}",
            key,
            id,
            kind.as_str(),
            self.security
                .user()
                .map(|u| u.name.as_str())
                .unwrap_or("super-user")
        );
        Ok(())
    }

    fn mutate(
        indexes: &IndexProvider,
        kind: IndexKind,
        id: NodeId,
        key: &str,
        term: &IndexTerm,
        op: Op,
    ) {
        match op {
            Op::Add => indexes.add(kind, id, key, term.clone()),
            Op::Update => {
                // remove-then-add, never in-place, so no stale postings survive
                indexes.remove(kind, id, key);
                indexes.add(kind, id, key, term.clone());
            }
            Op::Remove => indexes.remove(kind, id, key),
        }
    }

    fn index_layer(&self, tx: &NativeTx<'_>, id: NodeId, record: &NodeRecord, op: Op) {
        let layer = self.service.indexes().layer();
        let mut layer = layer.lock().unwrap();
        match op {
            Op::Remove => layer.remove(id),
            Op::Add | Op::Update => {
                if !tx.node_exists(id) {
                    // the store no longer knows this node; the layer index
                    // needs an out-of-band rebuild, skip without failing
                    error!(
                        "could not add node {} to layer index: backing node not found",
                        id
                    );
                    return;
                }
                let latitude = record.properties.get(keys::LATITUDE).and_then(|v| v.as_float());
                let longitude = record
                    .properties
                    .get(keys::LONGITUDE)
                    .and_then(|v| v.as_float());
                if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
                    if op == Op::Update {
                        layer.remove(id);
                    }
                    layer.add(id, latitude, longitude);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::graph::{PropertyMap, PropertyValue};
    use crate::index::IndexTerm;
    use crate::schema::{NodeTypeDef, TypeRegistry};
    use crate::security::SecurityContext;
    use crate::service::GraphService;

    fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        let mut map = PropertyMap::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    #[test]
    fn test_batch_indexing() {
        let service = GraphService::new_default();
        let mut tx = service.store().begin_tx().unwrap();

        let mut nodes = Vec::new();
        for i in 0..3 {
            let id = tx.create_node(props(&[
                (keys::UUID, format!("u{}", i).as_str().into()),
                (keys::NAME, "batch".into()),
            ]));
            nodes.push(crate::entity::TypedNode::new(id, service.registry().generic()));
        }

        let command = IndexNodeCommand::new(&service, SecurityContext::super_user());
        command.add_nodes(&mut tx, &nodes);
        assert_eq!(
            service
                .indexes()
                .exact(IndexKind::Keyword, keys::NAME, &IndexTerm::token("batch"))
                .len(),
            3
        );

        command.remove_nodes(&mut tx, &nodes);
        assert!(service
            .indexes()
            .exact(IndexKind::Keyword, keys::NAME, &IndexTerm::token("batch"))
            .is_empty());
    }

    #[test]
    fn test_empty_key_is_repaired_on_update() {
        let registry = TypeRegistry::new();
        registry.register(NodeTypeDef::new("Broken").searchable(IndexKind::Keyword, ""));
        let service = GraphService::with_registry(ServiceConfig::default(), registry);

        let mut tx = service.store().begin_tx().unwrap();
        let id = tx.create_node(props(&[
            (keys::UUID, "u1".into()),
            ("", "unindexable".into()),
        ]));
        let node = crate::entity::TypedNode::new(
            id,
            service.registry().node_type_or_generic("Broken"),
        );

        let command = IndexNodeCommand::new(&service, SecurityContext::super_user());
        command.update_node(&mut tx, &node);

        // the unindexable raw property was removed as a repair action
        let record = tx.node(id).unwrap();
        assert!(record.properties.get("").is_none());
    }

    #[test]
    fn test_sentinel_for_null_values() {
        let service = GraphService::new_default();
        let mut tx = service.store().begin_tx().unwrap();
        let id = tx.create_node(props(&[
            (keys::UUID, "u1".into()),
            (keys::NAME, PropertyValue::Null),
        ]));
        let node = crate::entity::TypedNode::new(id, service.registry().generic());

        let command = IndexNodeCommand::new(&service, SecurityContext::super_user());
        command.add_node(&mut tx, &node);

        let hits = service.indexes().exact(
            IndexKind::Keyword,
            keys::NAME,
            &IndexTerm::token(crate::command::search::IMPROBABLE_SEARCH_VALUE),
        );
        assert_eq!(hits, vec![id]);
    }
}
