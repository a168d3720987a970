//! Embedded in-memory property-graph store
//!
//! Committed state lives behind a read-write lock; all mutation goes
//! through buffered write transactions (see [`super::tx`]). The store
//! follows a single-writer model: one write transaction at a time,
//! guarded by a mutex with an acquisition timeout. Failing to acquire
//! the writer lock within the timeout surfaces as a detected deadlock.

use super::record::{NodeRecord, RelationshipRecord};
use super::tx::NativeTx;
use super::types::{NodeId, RelationshipId};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// Default writer-lock acquisition timeout before a deadlock is reported
pub const DEFAULT_DEADLOCK_TIMEOUT_MS: u64 = 10_000;

/// Errors that can occur during store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("relationship {0} not found")]
    RelationshipNotFound(RelationshipId),

    #[error("relationship source node {0} does not exist")]
    InvalidSource(NodeId),

    #[error("relationship target node {0} does not exist")]
    InvalidTarget(NodeId),

    #[error("store detected a deadlock: writer lock not acquired within {0} ms")]
    DeadlockDetected(u64),

    #[error("commit failed: uuid {0} is already taken")]
    UuidConflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// True for the store's deadlock signal
    pub fn is_deadlock(&self) -> bool {
        matches!(self, StoreError::DeadlockDetected(_))
    }
}

/// Committed graph state
///
/// Uses hash maps for O(1) lookup performance:
/// - nodes: NodeId -> NodeRecord
/// - relationships: RelationshipId -> RelationshipRecord
/// - outgoing / incoming: NodeId -> Vec<RelationshipId> (adjacency lists)
/// - uuids: uuid -> NodeId (uniqueness invariant, checked at commit)
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) nodes: FxHashMap<NodeId, NodeRecord>,
    pub(crate) relationships: FxHashMap<RelationshipId, RelationshipRecord>,
    pub(crate) outgoing: FxHashMap<NodeId, Vec<RelationshipId>>,
    pub(crate) incoming: FxHashMap<NodeId, Vec<RelationshipId>>,
    pub(crate) uuids: FxHashMap<String, NodeId>,
}

/// The embedded graph store
#[derive(Debug)]
pub struct GraphStore {
    pub(crate) state: RwLock<StoreState>,
    pub(crate) writer: Mutex<()>,
    next_node_id: AtomicU64,
    next_relationship_id: AtomicU64,
    transaction_counter: AtomicU64,
    deadlock_timeout: Duration,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_deadlock_timeout(Duration::from_millis(DEFAULT_DEADLOCK_TIMEOUT_MS))
    }

    pub fn with_deadlock_timeout(deadlock_timeout: Duration) -> Self {
        GraphStore {
            state: RwLock::new(StoreState::default()),
            writer: Mutex::new(()),
            next_node_id: AtomicU64::new(1),
            next_relationship_id: AtomicU64::new(1),
            transaction_counter: AtomicU64::new(0),
            deadlock_timeout,
        }
    }

    /// Begin a write transaction.
    ///
    /// Acquires the writer lock; if another transaction holds it past the
    /// configured timeout, the store reports a deadlock instead of waiting
    /// forever. Deadlocks are not retried here.
    pub fn begin_tx(&self) -> StoreResult<NativeTx<'_>> {
        let guard = self
            .writer
            .try_lock_for(self.deadlock_timeout)
            .ok_or(StoreError::DeadlockDetected(
                self.deadlock_timeout.as_millis() as u64,
            ))?;
        Ok(NativeTx::new(self, guard))
    }

    /// Fresh monotonically increasing transaction identifier
    pub fn next_transaction_id(&self) -> u64 {
        self.transaction_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn allocate_node_id(&self) -> NodeId {
        NodeId::new(self.next_node_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn allocate_relationship_id(&self) -> RelationshipId {
        RelationshipId::new(self.next_relationship_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Committed view of a node (ignores any open transaction)
    pub fn node(&self, id: NodeId) -> Option<NodeRecord> {
        self.state.read().unwrap().nodes.get(&id).cloned()
    }

    /// Committed view of a relationship
    pub fn relationship(&self, id: RelationshipId) -> Option<RelationshipRecord> {
        self.state.read().unwrap().relationships.get(&id).cloned()
    }

    /// Committed node id for a uuid
    pub fn node_id_by_uuid(&self, uuid: &str) -> Option<NodeId> {
        self.state.read().unwrap().uuids.get(uuid).copied()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().unwrap().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.state.read().unwrap().relationships.len()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::PropertyMap;

    #[test]
    fn test_begin_and_commit_empty_tx() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        tx.mark_success();
        tx.finish().unwrap();
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_transaction_ids_are_monotonic() {
        let store = GraphStore::new();
        let a = store.next_transaction_id();
        let b = store.next_transaction_id();
        assert!(b > a);
    }

    #[test]
    fn test_writer_lock_timeout_reports_deadlock() {
        let store = GraphStore::with_deadlock_timeout(Duration::from_millis(50));

        let tx = store.begin_tx().unwrap();

        std::thread::scope(|scope| {
            let handle = scope.spawn(|| match store.begin_tx() {
                Ok(_) => Ok(()),
                Err(e) => Err(e),
            });
            let result: StoreResult<()> = handle.join().unwrap();
            match result {
                Err(e) => assert!(e.is_deadlock()),
                Ok(()) => panic!("second writer should not acquire the lock"),
            }
        });

        drop(tx);

        // lock released, a new transaction can begin
        assert!(store.begin_tx().is_ok());
    }

    #[test]
    fn test_committed_views() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let id = tx.create_node(PropertyMap::new());

        // not visible in the committed view until finish
        assert!(store.node(id).is_none());

        tx.mark_success();
        tx.finish().unwrap();
        assert!(store.node(id).is_some());
    }
}
