//! Node deletion command
//!
//! Removes a node, its relationships and all of its index entries, and
//! records deletion snapshots so the after-deletion hooks can fire in
//! post-processing.

use super::context::{DeletedObject, ObjectRef, TxContext};
use crate::entity::TypedNode;
use crate::error::FrameworkResult;
use crate::graph::{Direction, StoreError};
use crate::security::SecurityContext;
use crate::service::GraphService;
use tracing::debug;

pub struct DeleteNodeCommand<'a> {
    service: &'a GraphService,
    security: SecurityContext,
}

impl<'a> DeleteNodeCommand<'a> {
    pub fn new(service: &'a GraphService, security: SecurityContext) -> Self {
        DeleteNodeCommand { service, security }
    }

    pub fn execute(&self, ctx: &mut TxContext<'_, '_>, node: &TypedNode) -> FrameworkResult<()> {
        let id = node.id();
        let record = ctx
            .native()
            .node(id)
            .ok_or(StoreError::NodeNotFound(id))?;

        // index entries have the same lifecycle as the node; drop them all
        self.service.indexes().remove_node_everywhere(id);

        for rel in ctx.native().relationships(id, None, Direction::Both) {
            ctx.native_mut().delete_relationship(rel.id)?;
            ctx.record_deleted(DeletedObject {
                reference: ObjectRef::Relationship(rel.id),
                type_name: rel.rel_type.as_str().to_string(),
                uuid: rel.uuid().map(str::to_string),
            });
        }

        ctx.native_mut().delete_node(id)?;
        ctx.record_deleted(DeletedObject {
            reference: ObjectRef::Node(id),
            type_name: record.type_name().to_string(),
            uuid: record.uuid().map(str::to_string),
        });

        debug!(
            "node {} deleted by {}",
            id,
            self.security
                .user()
                .map(|u| u.name.as_str())
                .unwrap_or("super-user")
        );
        Ok(())
    }
}
