//! Security contexts and read-visibility rules
//!
//! A `SecurityContext` carries the acting principal for exactly one
//! logical operation. It lives on the call stack and is never persisted.

use crate::graph::{keys, Direction, NativeTx, NodeRecord, RelationshipType};
use serde::{Deserialize, Serialize};

/// Relationship type that grants permissions between a principal and a node
pub const SECURITY_RELATIONSHIP: &str = "SECURITY";

/// Permissions grantable through a security relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    Read,
    Write,
    Delete,
    AccessControl,
}

impl Permission {
    pub fn all() -> [Permission; 4] {
        [
            Permission::Read,
            Permission::Write,
            Permission::Delete,
            Permission::AccessControl,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
            Permission::AccessControl => "accessControl",
        }
    }
}

/// The acting user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub uuid: String,
    pub name: String,
    pub email: Option<String>,
}

impl Principal {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Principal {
            uuid: uuid.into(),
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Per-operation security scope
#[derive(Debug, Clone)]
pub struct SecurityContext {
    user: Option<Principal>,
    super_user: bool,
}

impl SecurityContext {
    /// The all-powerful context used by internal machinery
    pub fn super_user() -> Self {
        SecurityContext {
            user: None,
            super_user: true,
        }
    }

    /// An authenticated user
    pub fn authenticated(user: Principal) -> Self {
        SecurityContext {
            user: Some(user),
            super_user: false,
        }
    }

    /// An unauthenticated (public) caller
    pub fn anonymous() -> Self {
        SecurityContext {
            user: None,
            super_user: false,
        }
    }

    pub fn is_super_user(&self) -> bool {
        self.super_user
    }

    pub fn user(&self) -> Option<&Principal> {
        self.user.as_ref()
    }

    /// Read-visibility check applied when wrapping raw records.
    ///
    /// Callers treat an unreadable node as filtered from the result set,
    /// never as an error.
    pub fn is_readable(
        &self,
        tx: &NativeTx<'_>,
        record: &NodeRecord,
        include_deleted_and_hidden: bool,
        public_only: bool,
    ) -> bool {
        if self.super_user {
            return true;
        }

        let deleted = record.bool_property(keys::DELETED);
        let hidden = record.bool_property(keys::HIDDEN);
        if (deleted || hidden) && !include_deleted_and_hidden {
            return false;
        }

        let visible_to_public = record.bool_property(keys::VISIBLE_TO_PUBLIC_USERS);
        if public_only {
            return visible_to_public;
        }
        if visible_to_public {
            return true;
        }

        let Some(user) = &self.user else {
            return false;
        };

        if record.bool_property(keys::VISIBLE_TO_AUTHENTICATED_USERS) {
            return true;
        }

        // the owner reads their own nodes
        if let Some(owner_id) = record
            .properties
            .get(keys::OWNER_ID)
            .and_then(|v| v.as_string())
        {
            if owner_id == user.uuid {
                return true;
            }
        }

        // a principal always reads its own node
        if record.uuid() == Some(user.uuid.as_str()) {
            return true;
        }

        // granted read permission through a security relationship
        let security = RelationshipType::new(SECURITY_RELATIONSHIP);
        for rel in tx.relationships(record.id, Some(&security), Direction::Incoming) {
            let granted = rel.allowed().contains(&Permission::Read.as_str());
            if !granted {
                continue;
            }
            if let Some(source) = tx.node(rel.source) {
                if source.uuid() == Some(user.uuid.as_str()) {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, PropertyMap, PropertyValue};

    fn record_with(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        let mut map = PropertyMap::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    #[test]
    fn test_super_user_reads_everything() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let id = tx.create_node(record_with(&[(keys::DELETED, true.into())]));
        let record = tx.node(id).unwrap();

        let ctx = SecurityContext::super_user();
        assert!(ctx.is_readable(&tx, &record, false, false));
    }

    #[test]
    fn test_deleted_and_hidden_filtering() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let id = tx.create_node(record_with(&[
            (keys::HIDDEN, true.into()),
            (keys::VISIBLE_TO_PUBLIC_USERS, true.into()),
        ]));
        let record = tx.node(id).unwrap();

        let ctx = SecurityContext::anonymous();
        assert!(!ctx.is_readable(&tx, &record, false, false));
        assert!(ctx.is_readable(&tx, &record, true, false));
    }

    #[test]
    fn test_public_visibility() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let visible = tx.create_node(record_with(&[(keys::VISIBLE_TO_PUBLIC_USERS, true.into())]));
        let invisible = tx.create_node(PropertyMap::new());

        let visible = tx.node(visible).unwrap();
        let invisible = tx.node(invisible).unwrap();

        let ctx = SecurityContext::anonymous();
        assert!(ctx.is_readable(&tx, &visible, false, false));
        assert!(!ctx.is_readable(&tx, &invisible, false, false));

        // public_only restricts to the public flag even for authenticated users
        let ctx = SecurityContext::authenticated(Principal::new("u1", "alice"));
        assert!(!ctx.is_readable(&tx, &invisible, false, true));
    }

    #[test]
    fn test_owner_reads_own_node() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let id = tx.create_node(record_with(&[(keys::OWNER_ID, "u1".into())]));
        let record = tx.node(id).unwrap();

        let owner = SecurityContext::authenticated(Principal::new("u1", "alice"));
        let other = SecurityContext::authenticated(Principal::new("u2", "bob"));
        assert!(owner.is_readable(&tx, &record, false, false));
        assert!(!other.is_readable(&tx, &record, false, false));
    }

    #[test]
    fn test_security_relationship_grants_read() {
        let store = GraphStore::new();
        let mut tx = store.begin_tx().unwrap();
        let user_node = tx.create_node(record_with(&[(keys::UUID, "u1".into())]));
        let target = tx.create_node(PropertyMap::new());
        let rel = tx
            .create_relationship(
                user_node,
                target,
                RelationshipType::new(SECURITY_RELATIONSHIP),
                PropertyMap::new(),
            )
            .unwrap();
        tx.set_relationship_property(
            rel,
            keys::ALLOWED,
            PropertyValue::Array(vec![Permission::Read.as_str().into()]),
        )
        .unwrap();

        let record = tx.node(target).unwrap();
        let ctx = SecurityContext::authenticated(Principal::new("u1", "alice"));
        assert!(ctx.is_readable(&tx, &record, false, false));

        let stranger = SecurityContext::authenticated(Principal::new("u9", "mallory"));
        assert!(!stranger.is_readable(&tx, &record, false, false));
    }
}
