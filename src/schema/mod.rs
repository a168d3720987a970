//! Type registry and lifecycle hooks
//!
//! Type names resolve to definitions through a registry populated at
//! startup; no runtime reflection. Unknown type names fall back to the
//! generic node type. Post-creation transformations are registered with
//! a priority and applied in ascending priority order.

use crate::command::context::{DeletedObject, TxContext};
use crate::entity::{TypedNode, TypedRelationship};
use crate::error::FrameworkResult;
use crate::graph::{keys, PropertyValue};
use crate::index::IndexKind;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Fallback type for unregistered type names
pub const GENERIC_TYPE: &str = "GenericNode";

/// Hook invoked with a typed node inside a transaction context
pub type NodeHook = Arc<
    dyn for<'s, 't> Fn(&mut TxContext<'s, 't>, &TypedNode) -> FrameworkResult<()> + Send + Sync,
>;

/// Hook invoked with a typed relationship
pub type RelationshipHook = Arc<
    dyn for<'s, 't> Fn(&mut TxContext<'s, 't>, &TypedRelationship) -> FrameworkResult<()>
        + Send
        + Sync,
>;

/// Hook invoked with the snapshot of a deleted object
pub type DeletionHook = Arc<
    dyn for<'s, 't> Fn(&mut TxContext<'s, 't>, &DeletedObject) -> FrameworkResult<()>
        + Send
        + Sync,
>;

pub fn node_hook<F>(f: F) -> NodeHook
where
    F: for<'s, 't> Fn(&mut TxContext<'s, 't>, &TypedNode) -> FrameworkResult<()>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

pub fn relationship_hook<F>(f: F) -> RelationshipHook
where
    F: for<'s, 't> Fn(&mut TxContext<'s, 't>, &TypedRelationship) -> FrameworkResult<()>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

pub fn deletion_hook<F>(f: F) -> DeletionHook
where
    F: for<'s, 't> Fn(&mut TxContext<'s, 't>, &DeletedObject) -> FrameworkResult<()>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Lifecycle callbacks of a node type
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    /// Fired when a raw record is wrapped by the factory
    pub on_instantiation: Option<NodeHook>,
    /// Fired inside the creating transaction, right after property writes
    pub on_creation: Option<NodeHook>,
    /// Fired in the post-processing transaction
    pub after_creation: Option<NodeHook>,
    pub after_modification: Option<NodeHook>,
    pub after_deletion: Option<DeletionHook>,
}

/// Lifecycle callbacks of a relationship type
#[derive(Clone, Default)]
pub struct RelationshipHooks {
    pub after_creation: Option<RelationshipHook>,
    pub after_modification: Option<RelationshipHook>,
    pub after_deletion: Option<DeletionHook>,
}

/// Definition of one node type
pub struct NodeTypeDef {
    name: String,
    is_principal: bool,
    searchable: HashMap<IndexKind, IndexSet<String>>,
    pub hooks: LifecycleHooks,
}

impl NodeTypeDef {
    /// A definition with the default searchable keys: `type`, `name` and
    /// `uuid` in the keyword index, `name` in the fulltext index
    pub fn new(name: impl Into<String>) -> Self {
        let mut searchable: HashMap<IndexKind, IndexSet<String>> = HashMap::new();
        let mut keyword = IndexSet::new();
        keyword.insert(keys::TYPE.to_string());
        keyword.insert(keys::NAME.to_string());
        keyword.insert(keys::UUID.to_string());
        searchable.insert(IndexKind::Keyword, keyword);

        let mut fulltext = IndexSet::new();
        fulltext.insert(keys::NAME.to_string());
        searchable.insert(IndexKind::Fulltext, fulltext);

        NodeTypeDef {
            name: name.into(),
            is_principal: false,
            searchable,
            hooks: LifecycleHooks::default(),
        }
    }

    /// Mark this type as a principal (user) type; name and email are
    /// mirrored into the user index
    pub fn principal(mut self) -> Self {
        self.is_principal = true;
        self
    }

    /// Add a searchable property for an index
    pub fn searchable(mut self, kind: IndexKind, key: impl Into<String>) -> Self {
        self.searchable.entry(kind).or_default().insert(key.into());
        self
    }

    pub fn on_instantiation(mut self, hook: NodeHook) -> Self {
        self.hooks.on_instantiation = Some(hook);
        self
    }

    pub fn on_creation(mut self, hook: NodeHook) -> Self {
        self.hooks.on_creation = Some(hook);
        self
    }

    pub fn after_creation(mut self, hook: NodeHook) -> Self {
        self.hooks.after_creation = Some(hook);
        self
    }

    pub fn after_modification(mut self, hook: NodeHook) -> Self {
        self.hooks.after_modification = Some(hook);
        self
    }

    pub fn after_deletion(mut self, hook: DeletionHook) -> Self {
        self.hooks.after_deletion = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_principal(&self) -> bool {
        self.is_principal
    }

    /// Searchable property keys for one index kind
    pub fn searchable_keys(&self, kind: IndexKind) -> Vec<String> {
        self.searchable
            .get(&kind)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_searchable(&self, kind: IndexKind, key: &str) -> bool {
        self.searchable
            .get(&kind)
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }
}

/// Definition of one relationship type
pub struct RelationshipTypeDef {
    name: String,
    pub hooks: RelationshipHooks,
}

impl RelationshipTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        RelationshipTypeDef {
            name: name.into(),
            hooks: RelationshipHooks::default(),
        }
    }

    pub fn after_creation(mut self, hook: RelationshipHook) -> Self {
        self.hooks.after_creation = Some(hook);
        self
    }

    pub fn after_modification(mut self, hook: RelationshipHook) -> Self {
        self.hooks.after_modification = Some(hook);
        self
    }

    pub fn after_deletion(mut self, hook: DeletionHook) -> Self {
        self.hooks.after_deletion = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A post-creation transformation with a priority; lower priority
/// numbers run first
pub struct CreationTransform {
    priority: i32,
    func: NodeHook,
}

impl CreationTransform {
    pub fn new(priority: i32, func: NodeHook) -> Self {
        CreationTransform { priority, func }
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn apply(&self, ctx: &mut TxContext<'_, '_>, node: &TypedNode) -> FrameworkResult<()> {
        (*self.func)(ctx, node)
    }
}

fn assign_uuid_when_absent(ctx: &mut TxContext<'_, '_>, node: &TypedNode) -> FrameworkResult<()> {
    let current = node.property(ctx.native(), keys::UUID);
    let blank = match &current {
        None | Some(PropertyValue::Null) => true,
        Some(PropertyValue::String(s)) => s.trim().is_empty(),
        _ => false,
    };
    if blank {
        let uuid = Uuid::new_v4().simple().to_string();
        node.set_property(ctx, keys::UUID, PropertyValue::String(uuid))?;
    }
    Ok(())
}

/// The built-in uuid transformation: assigns a fresh hyphen-less uuid to
/// nodes that have none. Runs first.
pub fn uuid_creation_transform() -> CreationTransform {
    CreationTransform::new(0, node_hook(assign_uuid_when_absent))
}

/// Registry resolving type names to definitions and transformations
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<NodeTypeDef>>>,
    relationship_types: RwLock<HashMap<String, Arc<RelationshipTypeDef>>>,
    global_transforms: RwLock<Vec<Arc<CreationTransform>>>,
    type_transforms: RwLock<HashMap<String, Vec<Arc<CreationTransform>>>>,
    generic: Arc<NodeTypeDef>,
}

impl TypeRegistry {
    /// An empty registry with the generic fallback type and the uuid
    /// transformation registered
    pub fn new() -> Self {
        let registry = TypeRegistry {
            types: RwLock::new(HashMap::new()),
            relationship_types: RwLock::new(HashMap::new()),
            global_transforms: RwLock::new(Vec::new()),
            type_transforms: RwLock::new(HashMap::new()),
            generic: Arc::new(NodeTypeDef::new(GENERIC_TYPE)),
        };
        registry.register_creation_transform(uuid_creation_transform());
        registry
    }

    pub fn register(&self, def: NodeTypeDef) -> Arc<NodeTypeDef> {
        let def = Arc::new(def);
        self.types
            .write()
            .unwrap()
            .insert(def.name().to_string(), Arc::clone(&def));
        def
    }

    pub fn register_relationship(&self, def: RelationshipTypeDef) -> Arc<RelationshipTypeDef> {
        let def = Arc::new(def);
        self.relationship_types
            .write()
            .unwrap()
            .insert(def.name().to_string(), Arc::clone(&def));
        def
    }

    pub fn node_type(&self, name: &str) -> Option<Arc<NodeTypeDef>> {
        self.types.read().unwrap().get(name).cloned()
    }

    /// Resolve a type name, falling back to the generic node type
    pub fn node_type_or_generic(&self, name: &str) -> Arc<NodeTypeDef> {
        self.node_type(name)
            .unwrap_or_else(|| Arc::clone(&self.generic))
    }

    pub fn relationship_type(&self, name: &str) -> Option<Arc<RelationshipTypeDef>> {
        self.relationship_types.read().unwrap().get(name).cloned()
    }

    pub fn generic(&self) -> Arc<NodeTypeDef> {
        Arc::clone(&self.generic)
    }

    pub fn generic_type_name(&self) -> &str {
        self.generic.name()
    }

    /// Register a transformation applied after every node creation
    pub fn register_creation_transform(&self, transform: CreationTransform) {
        self.global_transforms
            .write()
            .unwrap()
            .push(Arc::new(transform));
    }

    /// Register a transformation applied after creations of one type
    pub fn register_creation_transform_for(
        &self,
        type_name: impl Into<String>,
        transform: CreationTransform,
    ) {
        self.type_transforms
            .write()
            .unwrap()
            .entry(type_name.into())
            .or_default()
            .push(Arc::new(transform));
    }

    /// All transformations applying to a type, ascending by priority
    pub fn creation_transforms_for(&self, type_name: &str) -> Vec<Arc<CreationTransform>> {
        let mut transforms: Vec<Arc<CreationTransform>> =
            self.global_transforms.read().unwrap().iter().cloned().collect();
        if let Some(per_type) = self.type_transforms.read().unwrap().get(type_name) {
            transforms.extend(per_type.iter().cloned());
        }
        transforms.sort_by_key(|t| t.priority());
        transforms
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
