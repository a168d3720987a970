//! Typed relationship wrapper

use crate::command::context::{ObjectRef, TxContext};
use crate::error::FrameworkResult;
use crate::graph::{keys, NativeTx, PropertyValue, RelationshipId, RelationshipType};
use crate::security::Permission;

#[derive(Clone)]
pub struct TypedRelationship {
    id: RelationshipId,
    rel_type: RelationshipType,
}

impl TypedRelationship {
    pub fn new(id: RelationshipId, rel_type: RelationshipType) -> Self {
        TypedRelationship { id, rel_type }
    }

    pub fn id(&self) -> RelationshipId {
        self.id
    }

    pub fn rel_type(&self) -> &RelationshipType {
        &self.rel_type
    }

    pub fn property(&self, tx: &NativeTx<'_>, key: &str) -> Option<PropertyValue> {
        tx.relationship(self.id)
            .and_then(|record| record.properties.get(key).cloned())
    }

    pub fn uuid(&self, tx: &NativeTx<'_>) -> Option<String> {
        tx.relationship(self.id)
            .and_then(|record| record.uuid().map(str::to_string))
    }

    pub fn set_property(
        &self,
        ctx: &mut TxContext<'_, '_>,
        key: &str,
        value: PropertyValue,
    ) -> FrameworkResult<()> {
        ctx.native_mut()
            .set_relationship_property(self.id, key, value)?;
        ctx.record_modified(ObjectRef::Relationship(self.id));
        Ok(())
    }

    /// Grant permissions on this (security) relationship
    pub fn set_allowed(
        &self,
        ctx: &mut TxContext<'_, '_>,
        permissions: &[Permission],
    ) -> FrameworkResult<()> {
        let tokens = permissions
            .iter()
            .map(|p| PropertyValue::String(p.as_str().to_string()))
            .collect();
        self.set_property(ctx, keys::ALLOWED, PropertyValue::Array(tokens))
    }
}
