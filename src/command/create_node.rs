//! Node creation command
//!
//! Determines the node type from the `type` property (generic default),
//! creates the raw node, establishes ownership for authenticated
//! non-super users, stamps timestamps, writes the type before all other
//! properties, and finally runs the creation hook and the registered
//! post-creation transformations in ascending priority order.

use super::context::{ObjectRef, TxContext};
use super::create_relationship::CreateRelationshipCommand;
use super::index_node::IndexNodeCommand;
use super::node_factory::NodeFactory;
use crate::entity::TypedNode;
use crate::error::{FrameworkError, FrameworkResult};
use crate::graph::{keys, PropertyMap, PropertyValue, RelationshipType};
use crate::security::{Permission, SecurityContext, SECURITY_RELATIONSHIP};
use crate::service::GraphService;
use chrono::Utc;
use tracing::{debug, warn};

pub struct CreateNodeCommand<'a> {
    service: &'a GraphService,
    security: SecurityContext,
}

impl<'a> CreateNodeCommand<'a> {
    pub fn new(service: &'a GraphService, security: SecurityContext) -> Self {
        CreateNodeCommand { service, security }
    }

    /// Convenience form taking key/value attributes in construction order
    pub fn execute_with_attributes(
        &self,
        ctx: &mut TxContext<'_, '_>,
        attributes: Vec<(String, PropertyValue)>,
    ) -> FrameworkResult<TypedNode> {
        let mut properties = PropertyMap::new();
        for (key, value) in attributes {
            properties.insert(key, value);
        }
        self.execute(ctx, properties)
    }

    pub fn execute(
        &self,
        ctx: &mut TxContext<'_, '_>,
        attributes: PropertyMap,
    ) -> FrameworkResult<TypedNode> {
        let mut properties = attributes;

        // Determine node type
        let node_type = properties
            .get(keys::TYPE)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.service.registry().generic_type_name().to_string());

        let now = Utc::now().timestamp_millis();

        let id = ctx.native_mut().create_node(PropertyMap::new());
        ctx.record_created(ObjectRef::Node(id));

        // wrap with a super-user factory so the fresh, flagless record
        // passes the read check
        let factory = NodeFactory::new(self.service, SecurityContext::super_user());
        let node = factory
            .instantiate_with_type(ctx, id, &node_type, false, false)?
            .ok_or_else(|| FrameworkError::domain("created node is not readable"))?;

        if !self.security.is_super_user() {
            if let Some(user) = self.security.user().cloned() {
                match ctx.native().node_id_by_uuid(&user.uuid) {
                    Some(owner_id) => {
                        node.set_property(
                            ctx,
                            keys::OWNER_ID,
                            PropertyValue::String(user.uuid.clone()),
                        )?;

                        let create_rel =
                            CreateRelationshipCommand::new(self.security.clone());
                        // avoid duplicates
                        let security_rel = create_rel.execute(
                            ctx,
                            owner_id,
                            id,
                            RelationshipType::new(SECURITY_RELATIONSHIP),
                            true,
                        )?;
                        security_rel.set_allowed(ctx, &Permission::all())?;
                        debug!("all permissions granted to user {}", user.name);

                        node.set_property(
                            ctx,
                            keys::CREATED_BY,
                            PropertyValue::String(user.uuid.clone()),
                        )?;
                    }
                    None => {
                        warn!(
                            "user {} has no backing node, skipping ownership",
                            user.name
                        );
                    }
                }
            }
        }

        node.set_property(ctx, keys::CREATED_DATE, PropertyValue::DateTime(now))?;
        node.set_property(ctx, keys::LAST_MODIFIED_DATE, PropertyValue::DateTime(now))?;
        debug!("node {} created", id);

        // set type first!!
        node.set_property(ctx, keys::TYPE, PropertyValue::String(node_type.clone()))?;
        properties.shift_remove(keys::TYPE);

        for (key, value) in properties {
            node.set_property(ctx, &key, value)?;
        }

        // notify node of its creation
        if let Some(hook) = node.type_def().hooks.on_creation.clone() {
            (*hook)(ctx, &node)?;
        }

        // iterate post creation transformations
        for transformation in self.service.registry().creation_transforms_for(&node_type) {
            transformation.apply(ctx, &node)?;
        }

        // the node has its uuid now; index all searchable properties
        let index = IndexNodeCommand::new(self.service, self.security.clone());
        index.add_node(ctx.native_mut(), &node);

        Ok(node)
    }
}
