//! Typed node wrapper
//!
//! A `TypedNode` pairs a node id with its resolved type definition.
//! Property writes go through the transaction context so that the
//! change-set and the named indices stay in step with the store.

use crate::command::context::{ObjectRef, TxContext};
use crate::command::index_node::IndexNodeCommand;
use crate::error::{FrameworkError, FrameworkResult};
use crate::graph::{keys, NativeTx, NodeId, NodeRecord, PropertyValue};
use crate::schema::NodeTypeDef;
use std::sync::Arc;

#[derive(Clone)]
pub struct TypedNode {
    id: NodeId,
    type_def: Arc<NodeTypeDef>,
}

impl TypedNode {
    pub fn new(id: NodeId, type_def: Arc<NodeTypeDef>) -> Self {
        TypedNode { id, type_def }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The registered type definition backing this wrapper.
    ///
    /// Note that for unregistered type names this is the generic type;
    /// the persisted `type` property keeps the original name.
    pub fn type_def(&self) -> &Arc<NodeTypeDef> {
        &self.type_def
    }

    pub fn property(&self, tx: &NativeTx<'_>, key: &str) -> Option<PropertyValue> {
        tx.node(self.id)
            .and_then(|record| record.properties.get(key).cloned())
    }

    pub fn bool_property(&self, tx: &NativeTx<'_>, key: &str) -> bool {
        self.property(tx, key)
            .and_then(|v| v.as_boolean())
            .unwrap_or(false)
    }

    pub fn uuid(&self, tx: &NativeTx<'_>) -> Option<String> {
        tx.node(self.id)
            .and_then(|record| record.uuid().map(str::to_string))
    }

    /// The persisted type name
    pub fn type_name(&self, tx: &NativeTx<'_>) -> String {
        tx.node(self.id)
            .map(|record| record.type_name().to_string())
            .unwrap_or_default()
    }

    pub fn record(&self, tx: &NativeTx<'_>) -> Option<NodeRecord> {
        tx.node(self.id)
    }

    /// Write a property.
    ///
    /// Records the node as modified and updates the named indices for
    /// searchable keys. Writing a uuid that is already taken defers a
    /// validation error; the commit-time uniqueness check will fail the
    /// transaction and the deferred error carries the precise cause.
    pub fn set_property(
        &self,
        ctx: &mut TxContext<'_, '_>,
        key: &str,
        value: PropertyValue,
    ) -> FrameworkResult<()> {
        if key == keys::UUID {
            if let PropertyValue::String(uuid) = &value {
                let taken = ctx
                    .native()
                    .node_id_by_uuid(uuid)
                    .map_or(false, |existing| existing != self.id);
                if taken {
                    ctx.defer_error(FrameworkError::Validation {
                        type_name: self.type_def.name().to_string(),
                        key: keys::UUID.to_string(),
                        reason: format!("uuid {} is already taken", uuid),
                    });
                }
            }
        }

        ctx.native_mut().set_node_property(self.id, key, value)?;
        ctx.record_modified(ObjectRef::Node(self.id));

        let index = IndexNodeCommand::new(ctx.service(), ctx.security().clone());
        index.update_property(ctx.native_mut(), self, key);
        Ok(())
    }

    /// Remove a property and its index entries
    pub fn remove_property(&self, ctx: &mut TxContext<'_, '_>, key: &str) -> FrameworkResult<()> {
        let index = IndexNodeCommand::new(ctx.service(), ctx.security().clone());
        index.remove_property(ctx.native_mut(), self, key);

        ctx.native_mut().remove_node_property(self.id, key)?;
        ctx.record_modified(ObjectRef::Node(self.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GENERIC_TYPE;
    use crate::service::GraphService;

    #[test]
    fn test_wrapper_reads_through_transaction() {
        let service = GraphService::new_default();
        let mut tx = service.store().begin_tx().unwrap();

        let mut props = crate::graph::PropertyMap::new();
        props.insert(keys::NAME.to_string(), "Home".into());
        let id = tx.create_node(props);

        let node = TypedNode::new(id, service.registry().generic());
        assert_eq!(node.type_def().name(), GENERIC_TYPE);
        assert_eq!(
            node.property(&tx, keys::NAME).unwrap().as_string(),
            Some("Home")
        );
        assert_eq!(node.uuid(&tx), None);
        assert!(!node.bool_property(&tx, keys::HIDDEN));
    }
}
