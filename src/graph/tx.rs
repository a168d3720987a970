//! Buffered write transactions
//!
//! All mutations are buffered in memory and applied to the committed
//! state only when the transaction finishes successfully. Reads inside a
//! transaction go through the buffer first, so a transaction observes its
//! own writes. Rolling back is a buffer drop; nothing touches committed
//! state until `finish`.

use super::property::{PropertyMap, PropertyValue};
use super::record::{NodeRecord, RelationshipRecord};
use super::store::{GraphStore, StoreError, StoreResult};
use super::types::{Direction, NodeId, RelationshipId, RelationshipType};
use parking_lot::MutexGuard;
use rustc_hash::{FxHashMap, FxHashSet};

/// Staged changes: `Some(record)` is a create or update, `None` a delete
#[derive(Debug, Default)]
struct TxBuffer {
    nodes: FxHashMap<NodeId, Option<NodeRecord>>,
    relationships: FxHashMap<RelationshipId, Option<RelationshipRecord>>,
}

impl TxBuffer {
    fn clear(&mut self) {
        self.nodes.clear();
        self.relationships.clear();
    }
}

/// Handle for an active write transaction
pub struct NativeTx<'a> {
    store: &'a GraphStore,
    _guard: MutexGuard<'a, ()>,
    buffer: TxBuffer,
    success: bool,
    failed: bool,
}

impl<'a> NativeTx<'a> {
    pub(crate) fn new(store: &'a GraphStore, guard: MutexGuard<'a, ()>) -> Self {
        NativeTx {
            store,
            _guard: guard,
            buffer: TxBuffer::default(),
            success: false,
            failed: false,
        }
    }

    /// Mark the transaction as successful; `finish` will commit
    pub fn mark_success(&mut self) {
        self.success = true;
    }

    /// Mark the transaction as failed; `finish` will roll back even if
    /// success was marked earlier
    pub fn mark_failure(&mut self) {
        self.failed = true;
    }

    pub fn is_marked_successful(&self) -> bool {
        self.success && !self.failed
    }

    // ── Reads (buffer overlay over committed state) ──

    /// Read a node as this transaction sees it
    pub fn node(&self, id: NodeId) -> Option<NodeRecord> {
        match self.buffer.nodes.get(&id) {
            Some(Some(record)) => Some(record.clone()),
            Some(None) => None,
            None => self.store.state.read().unwrap().nodes.get(&id).cloned(),
        }
    }

    pub fn node_exists(&self, id: NodeId) -> bool {
        match self.buffer.nodes.get(&id) {
            Some(slot) => slot.is_some(),
            None => self.store.state.read().unwrap().nodes.contains_key(&id),
        }
    }

    /// Read a relationship as this transaction sees it
    pub fn relationship(&self, id: RelationshipId) -> Option<RelationshipRecord> {
        match self.buffer.relationships.get(&id) {
            Some(Some(record)) => Some(record.clone()),
            Some(None) => None,
            None => self
                .store
                .state
                .read()
                .unwrap()
                .relationships
                .get(&id)
                .cloned(),
        }
    }

    /// Resolve a node by uuid, honoring buffered writes
    pub fn node_id_by_uuid(&self, uuid: &str) -> Option<NodeId> {
        for (id, slot) in &self.buffer.nodes {
            if let Some(record) = slot {
                if record.uuid() == Some(uuid) {
                    return Some(*id);
                }
            }
        }
        let committed = self.store.state.read().unwrap().uuids.get(uuid).copied();
        // a buffered write may have deleted the node or changed its uuid
        committed.filter(|id| !self.buffer.nodes.contains_key(id))
    }

    /// Relationships attached to a node, filtered by type and direction
    pub fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<&RelationshipType>,
        direction: Direction,
    ) -> Vec<RelationshipRecord> {
        let mut ids: Vec<RelationshipId> = Vec::new();
        {
            let state = self.store.state.read().unwrap();
            if matches!(direction, Direction::Outgoing | Direction::Both) {
                if let Some(list) = state.outgoing.get(&node) {
                    ids.extend(list.iter().copied());
                }
            }
            if matches!(direction, Direction::Incoming | Direction::Both) {
                if let Some(list) = state.incoming.get(&node) {
                    ids.extend(list.iter().copied());
                }
            }
        }

        let seen: FxHashSet<RelationshipId> = ids.iter().copied().collect();
        let mut out = Vec::new();

        for id in ids {
            if let Some(rel) = self.relationship(id) {
                if Self::matches(&rel, node, rel_type, direction) {
                    out.push(rel);
                }
            }
        }

        // relationships created inside this transaction
        for (id, slot) in &self.buffer.relationships {
            if seen.contains(id) {
                continue;
            }
            if let Some(rel) = slot {
                if Self::matches(rel, node, rel_type, direction) {
                    out.push(rel.clone());
                }
            }
        }

        out
    }

    fn matches(
        rel: &RelationshipRecord,
        node: NodeId,
        rel_type: Option<&RelationshipType>,
        direction: Direction,
    ) -> bool {
        let direction_ok = match direction {
            Direction::Outgoing => rel.source == node,
            Direction::Incoming => rel.target == node,
            Direction::Both => rel.source == node || rel.target == node,
        };
        direction_ok && rel_type.map_or(true, |t| rel.rel_type == *t)
    }

    // ── Writes (buffered) ──

    /// Create a node with the given properties, returning its id
    pub fn create_node(&mut self, properties: PropertyMap) -> NodeId {
        let id = self.store.allocate_node_id();
        self.buffer
            .nodes
            .insert(id, Some(NodeRecord::new(id, properties)));
        id
    }

    pub fn set_node_property(
        &mut self,
        id: NodeId,
        key: &str,
        value: PropertyValue,
    ) -> StoreResult<()> {
        let mut record = self.node(id).ok_or(StoreError::NodeNotFound(id))?;
        record.properties.insert(key.to_string(), value);
        self.buffer.nodes.insert(id, Some(record));
        Ok(())
    }

    pub fn remove_node_property(
        &mut self,
        id: NodeId,
        key: &str,
    ) -> StoreResult<Option<PropertyValue>> {
        let mut record = self.node(id).ok_or(StoreError::NodeNotFound(id))?;
        let removed = record.properties.shift_remove(key);
        self.buffer.nodes.insert(id, Some(record));
        Ok(removed)
    }

    pub fn delete_node(&mut self, id: NodeId) -> StoreResult<NodeRecord> {
        let record = self.node(id).ok_or(StoreError::NodeNotFound(id))?;
        self.buffer.nodes.insert(id, None);
        Ok(record)
    }

    pub fn create_relationship(
        &mut self,
        source: NodeId,
        target: NodeId,
        rel_type: RelationshipType,
        properties: PropertyMap,
    ) -> StoreResult<RelationshipId> {
        if !self.node_exists(source) {
            return Err(StoreError::InvalidSource(source));
        }
        if !self.node_exists(target) {
            return Err(StoreError::InvalidTarget(target));
        }
        let id = self.store.allocate_relationship_id();
        self.buffer.relationships.insert(
            id,
            Some(RelationshipRecord::new(
                id, source, target, rel_type, properties,
            )),
        );
        Ok(id)
    }

    pub fn set_relationship_property(
        &mut self,
        id: RelationshipId,
        key: &str,
        value: PropertyValue,
    ) -> StoreResult<()> {
        let mut record = self
            .relationship(id)
            .ok_or(StoreError::RelationshipNotFound(id))?;
        record.properties.insert(key.to_string(), value);
        self.buffer.relationships.insert(id, Some(record));
        Ok(())
    }

    pub fn delete_relationship(&mut self, id: RelationshipId) -> StoreResult<RelationshipRecord> {
        let record = self
            .relationship(id)
            .ok_or(StoreError::RelationshipNotFound(id))?;
        self.buffer.relationships.insert(id, None);
        Ok(record)
    }

    // ── Finalization ──

    /// Apply the buffer mid-transaction, keeping the writer lock.
    ///
    /// Used by batch units of work that need manual commit control.
    pub fn checkpoint(&mut self) -> StoreResult<()> {
        self.apply()?;
        self.buffer.clear();
        Ok(())
    }

    /// Commit or roll back, depending on the success/failure marks.
    ///
    /// A commit that fails validation leaves the committed state untouched
    /// and returns the error; the caller recovers the underlying cause
    /// through its own diagnostics.
    pub fn finish(mut self) -> StoreResult<()> {
        if self.is_marked_successful() {
            self.apply()?;
        }
        Ok(())
    }

    fn apply(&mut self) -> StoreResult<()> {
        let mut state = self.store.state.write().unwrap();

        // Validate everything before mutating, so a failed commit is a no-op.
        {
            let mut staged_uuids: FxHashMap<&str, NodeId> = FxHashMap::default();
            for (id, slot) in &self.buffer.nodes {
                if let Some(record) = slot {
                    if let Some(uuid) = record.uuid() {
                        if let Some(existing) = state.uuids.get(uuid) {
                            if *existing != *id {
                                return Err(StoreError::UuidConflict(uuid.to_string()));
                            }
                        }
                        if let Some(other) = staged_uuids.get(uuid) {
                            if *other != *id {
                                return Err(StoreError::UuidConflict(uuid.to_string()));
                            }
                        }
                        staged_uuids.insert(uuid, *id);
                    }
                }
            }

            for slot in self.buffer.relationships.values() {
                if let Some(rel) = slot {
                    if !Self::endpoint_survives(&state, &self.buffer, rel.source) {
                        return Err(StoreError::InvalidSource(rel.source));
                    }
                    if !Self::endpoint_survives(&state, &self.buffer, rel.target) {
                        return Err(StoreError::InvalidTarget(rel.target));
                    }
                }
            }
        }

        for (id, slot) in self.buffer.nodes.drain() {
            match slot {
                Some(record) => {
                    if let Some(old) = state.nodes.get(&id) {
                        if let Some(old_uuid) = old.uuid().map(str::to_string) {
                            state.uuids.remove(&old_uuid);
                        }
                    }
                    if let Some(uuid) = record.uuid().map(str::to_string) {
                        state.uuids.insert(uuid, id);
                    }
                    state.nodes.insert(id, record);
                }
                None => {
                    if let Some(old) = state.nodes.remove(&id) {
                        if let Some(uuid) = old.uuid().map(str::to_string) {
                            state.uuids.remove(&uuid);
                        }
                    }
                    state.outgoing.remove(&id);
                    state.incoming.remove(&id);
                }
            }
        }

        for (id, slot) in self.buffer.relationships.drain() {
            match slot {
                Some(rel) => {
                    if !state.relationships.contains_key(&id) {
                        state.outgoing.entry(rel.source).or_default().push(id);
                        state.incoming.entry(rel.target).or_default().push(id);
                    }
                    state.relationships.insert(id, rel);
                }
                None => {
                    if let Some(old) = state.relationships.remove(&id) {
                        if let Some(list) = state.outgoing.get_mut(&old.source) {
                            list.retain(|r| *r != id);
                        }
                        if let Some(list) = state.incoming.get_mut(&old.target) {
                            list.retain(|r| *r != id);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn endpoint_survives(
        state: &super::store::StoreState,
        buffer: &TxBuffer,
        node: NodeId,
    ) -> bool {
        match buffer.nodes.get(&node) {
            Some(slot) => slot.is_some(),
            None => state.nodes.contains_key(&node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::keys;

    fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        let mut map = PropertyMap::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    #[test]
    fn test_tx_sees_its_own_writes() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();

        let id = tx.create_node(props(&[(keys::NAME, "first".into())]));
        let record = tx.node(id).unwrap();
        assert_eq!(
            record.properties.get(keys::NAME).unwrap().as_string(),
            Some("first")
        );

        tx.set_node_property(id, keys::NAME, "second".into()).unwrap();
        let record = tx.node(id).unwrap();
        assert_eq!(
            record.properties.get(keys::NAME).unwrap().as_string(),
            Some("second")
        );
    }

    #[test]
    fn test_rollback_discards_writes() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let id = tx.create_node(PropertyMap::new());
        tx.mark_failure();
        tx.finish().unwrap();

        assert!(store.node(id).is_none());
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_commit_applies_all_writes() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();

        let a = tx.create_node(props(&[(keys::UUID, "a".into())]));
        let b = tx.create_node(props(&[(keys::UUID, "b".into())]));
        let rel = tx
            .create_relationship(a, b, RelationshipType::new("CONTAINS"), PropertyMap::new())
            .unwrap();

        tx.mark_success();
        tx.finish().unwrap();

        assert_eq!(store.node_count(), 2);
        assert_eq!(store.relationship_count(), 1);
        assert_eq!(store.node_id_by_uuid("a"), Some(a));
        assert_eq!(store.relationship(rel).unwrap().source, a);
    }

    #[test]
    fn test_uuid_conflict_fails_commit_atomically() {
        let store = GraphStore::new();

        let mut tx = store.begin_tx().unwrap();
        tx.create_node(props(&[(keys::UUID, "taken".into())]));
        tx.mark_success();
        tx.finish().unwrap();

        let mut tx = store.begin_tx().unwrap();
        tx.create_node(props(&[(keys::NAME, "other".into())]));
        tx.create_node(props(&[(keys::UUID, "taken".into())]));
        tx.mark_success();
        let err = tx.finish().unwrap_err();
        assert_eq!(err, StoreError::UuidConflict("taken".to_string()));

        // nothing from the failed transaction is visible
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_relationship_traversal_by_type_and_direction() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();

        let a = tx.create_node(PropertyMap::new());
        let b = tx.create_node(PropertyMap::new());
        let security = RelationshipType::new("SECURITY");
        let contains = RelationshipType::new("CONTAINS");
        tx.create_relationship(a, b, security.clone(), PropertyMap::new())
            .unwrap();
        tx.create_relationship(a, b, contains.clone(), PropertyMap::new())
            .unwrap();

        // visible before commit
        let incoming = tx.relationships(b, Some(&security), Direction::Incoming);
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].source, a);

        tx.mark_success();
        tx.finish().unwrap();

        // and after commit
        let tx = store.begin_tx().unwrap();
        assert_eq!(tx.relationships(a, None, Direction::Outgoing).len(), 2);
        assert_eq!(tx.relationships(a, Some(&contains), Direction::Both).len(), 1);
        assert_eq!(tx.relationships(b, None, Direction::Outgoing).len(), 0);
    }

    #[test]
    fn test_delete_node_and_relationship() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let a = tx.create_node(props(&[(keys::UUID, "a".into())]));
        let b = tx.create_node(PropertyMap::new());
        let rel = tx
            .create_relationship(a, b, RelationshipType::new("CONTAINS"), PropertyMap::new())
            .unwrap();
        tx.mark_success();
        tx.finish().unwrap();

        let mut tx = store.begin_tx().unwrap();
        tx.delete_relationship(rel).unwrap();
        tx.delete_node(a).unwrap();
        tx.mark_success();
        tx.finish().unwrap();

        assert!(store.node(a).is_none());
        assert!(store.relationship(rel).is_none());
        assert_eq!(store.node_id_by_uuid("a"), None);
    }

    #[test]
    fn test_checkpoint_applies_and_continues() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();

        let a = tx.create_node(PropertyMap::new());
        tx.checkpoint().unwrap();

        // applied to committed state while the transaction stays open
        assert!(store.node(a).is_some());

        let b = tx.create_node(PropertyMap::new());
        tx.mark_failure();
        tx.finish().unwrap();

        // work after the checkpoint is rolled back, work before stays
        assert!(store.node(a).is_some());
        assert!(store.node(b).is_none());
    }

    #[test]
    fn test_finish_without_success_mark_rolls_back() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let id = tx.create_node(PropertyMap::new());
        tx.finish().unwrap();
        assert!(store.node(id).is_none());
    }

    #[test]
    fn test_node_id_by_uuid_honors_buffer() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let a = tx.create_node(props(&[(keys::UUID, "a".into())]));
        tx.mark_success();
        tx.finish().unwrap();

        let mut tx = store.begin_tx().unwrap();
        assert_eq!(tx.node_id_by_uuid("a"), Some(a));
        tx.delete_node(a).unwrap();
        assert_eq!(tx.node_id_by_uuid("a"), None);
    }
}
