//! Relationship creation command

use super::context::{ObjectRef, TxContext};
use crate::entity::TypedRelationship;
use crate::error::FrameworkResult;
use crate::graph::{keys, Direction, NodeId, PropertyMap, PropertyValue, RelationshipType};
use crate::security::SecurityContext;
use tracing::debug;
use uuid::Uuid;

pub struct CreateRelationshipCommand {
    security: SecurityContext,
}

impl CreateRelationshipCommand {
    pub fn new(security: SecurityContext) -> Self {
        CreateRelationshipCommand { security }
    }

    /// Create a relationship between two nodes.
    ///
    /// With `check_duplicates`, an existing relationship of the same
    /// type between the same pair is returned instead of creating a
    /// second one, making security relationship creation idempotent.
    pub fn execute(
        &self,
        ctx: &mut TxContext<'_, '_>,
        source: NodeId,
        target: NodeId,
        rel_type: RelationshipType,
        check_duplicates: bool,
    ) -> FrameworkResult<TypedRelationship> {
        if check_duplicates {
            for existing in ctx
                .native()
                .relationships(source, Some(&rel_type), Direction::Outgoing)
            {
                if existing.target == target {
                    debug!(
                        "duplicate {} relationship between {} and {} avoided",
                        rel_type, source, target
                    );
                    return Ok(TypedRelationship::new(existing.id, rel_type));
                }
            }
        }

        let id = ctx
            .native_mut()
            .create_relationship(source, target, rel_type.clone(), PropertyMap::new())?;
        ctx.record_created(ObjectRef::Relationship(id));

        let uuid = Uuid::new_v4().simple().to_string();
        ctx.native_mut()
            .set_relationship_property(id, keys::UUID, PropertyValue::String(uuid))?;

        debug!(
            "relationship {} of type {} created by {}",
            id,
            rel_type,
            self.security
                .user()
                .map(|u| u.name.as_str())
                .unwrap_or("super-user")
        );
        Ok(TypedRelationship::new(id, rel_type))
    }
}
