//! Per-operation transaction context
//!
//! An explicit context owned by the command layer for the duration of
//! one primary+secondary transaction pair: the change-set, the
//! transaction identifier, the security scope, and the deferred-error
//! slot used to recover the true cause of a failed commit. Each
//! concurrent operation gets its own instance; nothing is shared.

use crate::error::{FrameworkError, FrameworkResult};
use crate::graph::{NativeTx, NodeId, RelationshipId};
use crate::security::SecurityContext;
use crate::service::GraphService;
use indexmap::IndexSet;

/// Reference to a graph object touched during a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Node(NodeId),
    Relationship(RelationshipId),
}

/// Snapshot of a deleted object, kept so deletion hooks can run after
/// the record is gone
#[derive(Debug, Clone)]
pub struct DeletedObject {
    pub reference: ObjectRef,
    pub type_name: String,
    pub uuid: Option<String>,
}

/// Objects touched during one transaction, in three categories
#[derive(Debug, Default)]
pub struct ChangeSet {
    created: IndexSet<ObjectRef>,
    modified: IndexSet<ObjectRef>,
    deleted: Vec<DeletedObject>,
}

impl ChangeSet {
    pub fn record_created(&mut self, reference: ObjectRef) {
        self.created.insert(reference);
    }

    /// Record a modification; objects created in the same transaction
    /// stay in the created category only
    pub fn record_modified(&mut self, reference: ObjectRef) {
        if !self.created.contains(&reference) {
            self.modified.insert(reference);
        }
    }

    /// Record a deletion.
    ///
    /// An object created and deleted in the same transaction vanishes
    /// from the change-set entirely; it was never observable.
    pub fn record_deleted(&mut self, object: DeletedObject) {
        if self.created.shift_remove(&object.reference) {
            self.modified.shift_remove(&object.reference);
            return;
        }
        self.modified.shift_remove(&object.reference);
        if !self
            .deleted
            .iter()
            .any(|d| d.reference == object.reference)
        {
            self.deleted.push(object);
        }
    }

    pub fn created(&self) -> &IndexSet<ObjectRef> {
        &self.created
    }

    pub fn modified(&self) -> &IndexSet<ObjectRef> {
        &self.modified
    }

    pub fn deleted(&self) -> &[DeletedObject] {
        &self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Move the collected changes out, leaving this set empty
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.created.clear();
        self.modified.clear();
        self.deleted.clear();
    }
}

/// The context threaded through a unit of work
pub struct TxContext<'s, 't> {
    service: &'s GraphService,
    security: SecurityContext,
    native: &'t mut NativeTx<'s>,
    changes: &'t mut ChangeSet,
    deferred: &'t mut Option<FrameworkError>,
    tx_id: u64,
    depth: u32,
}

impl<'s, 't> TxContext<'s, 't> {
    pub(crate) fn new(
        service: &'s GraphService,
        security: SecurityContext,
        native: &'t mut NativeTx<'s>,
        changes: &'t mut ChangeSet,
        deferred: &'t mut Option<FrameworkError>,
        tx_id: u64,
    ) -> Self {
        TxContext {
            service,
            security,
            native,
            changes,
            deferred,
            tx_id,
            depth: 0,
        }
    }

    pub fn service(&self) -> &'s GraphService {
        self.service
    }

    pub fn security(&self) -> &SecurityContext {
        &self.security
    }

    pub fn transaction_id(&self) -> u64 {
        self.tx_id
    }

    /// True for the outermost transaction of a nested sequence
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }

    pub fn native(&self) -> &NativeTx<'s> {
        self.native
    }

    pub fn native_mut(&mut self) -> &mut NativeTx<'s> {
        self.native
    }

    pub fn record_created(&mut self, reference: ObjectRef) {
        self.changes.record_created(reference);
    }

    pub fn record_modified(&mut self, reference: ObjectRef) {
        self.changes.record_modified(reference);
    }

    pub fn record_deleted(&mut self, object: DeletedObject) {
        self.changes.record_deleted(object);
    }

    /// Park an error to be surfaced if the commit fails; the first
    /// deferred error wins
    pub fn defer_error(&mut self, error: FrameworkError) {
        if self.deferred.is_none() {
            *self.deferred = Some(error);
        }
    }

    /// Run an inner unit of work in the same native transaction scope.
    ///
    /// Only the outermost transaction runs post-processing and clears
    /// the change-set. A failed subtransaction marks the whole primary
    /// transaction failed.
    pub fn subtransaction<T, F>(&mut self, work: F) -> FrameworkResult<T>
    where
        F: FnOnce(&mut TxContext<'s, 't>) -> FrameworkResult<T>,
    {
        self.depth += 1;
        let result = work(self);
        self.depth -= 1;
        if result.is_err() {
            self.native.mark_failure();
        }
        result
    }

    /// Apply buffered work mid-transaction (manual commit control for
    /// batch units of work)
    pub fn checkpoint(&mut self) -> FrameworkResult<()> {
        self.native.checkpoint()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_objects_do_not_appear_as_modified() {
        let mut changes = ChangeSet::default();
        let node = ObjectRef::Node(NodeId::new(1));

        changes.record_created(node);
        changes.record_modified(node);

        assert_eq!(changes.created().len(), 1);
        assert!(changes.modified().is_empty());
    }

    #[test]
    fn test_created_then_deleted_vanishes() {
        let mut changes = ChangeSet::default();
        let node = ObjectRef::Node(NodeId::new(1));

        changes.record_created(node);
        changes.record_deleted(DeletedObject {
            reference: node,
            type_name: "Page".to_string(),
            uuid: None,
        });

        assert!(changes.is_empty());
    }

    #[test]
    fn test_modified_then_deleted_only_deleted_remains() {
        let mut changes = ChangeSet::default();
        let node = ObjectRef::Node(NodeId::new(1));

        changes.record_modified(node);
        changes.record_deleted(DeletedObject {
            reference: node,
            type_name: "Page".to_string(),
            uuid: Some("u".to_string()),
        });

        assert!(changes.modified().is_empty());
        assert_eq!(changes.deleted().len(), 1);
    }

    #[test]
    fn test_take_leaves_empty_set() {
        let mut changes = ChangeSet::default();
        changes.record_created(ObjectRef::Node(NodeId::new(1)));

        let taken = changes.take();
        assert_eq!(taken.created().len(), 1);
        assert!(changes.is_empty());
    }
}
