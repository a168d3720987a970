//! Raw stored records for nodes and relationships
//!
//! Records are what the store persists; the command layer wraps them in
//! typed entities before handing them to callers.

use super::property::{keys, PropertyMap, PropertyValue};
use super::types::{NodeId, RelationshipId, RelationshipType};
use serde::{Deserialize, Serialize};

/// A raw node record: id plus ordered property map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub properties: PropertyMap,
}

impl NodeRecord {
    pub fn new(id: NodeId, properties: PropertyMap) -> Self {
        NodeRecord { id, properties }
    }

    /// The stored uuid, if one has been assigned
    pub fn uuid(&self) -> Option<&str> {
        match self.properties.get(keys::UUID) {
            Some(PropertyValue::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// The stored type name, empty when not yet set
    pub fn type_name(&self) -> &str {
        self.properties
            .get(keys::TYPE)
            .and_then(|v| v.as_string())
            .unwrap_or("")
    }

    /// Boolean property, false when absent or not a boolean
    pub fn bool_property(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .and_then(|v| v.as_boolean())
            .unwrap_or(false)
    }
}

/// A raw relationship record: id, endpoints, type, and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: RelationshipId,
    pub source: NodeId,
    pub target: NodeId,
    pub rel_type: RelationshipType,
    pub properties: PropertyMap,
}

impl RelationshipRecord {
    pub fn new(
        id: RelationshipId,
        source: NodeId,
        target: NodeId,
        rel_type: RelationshipType,
        properties: PropertyMap,
    ) -> Self {
        RelationshipRecord {
            id,
            source,
            target,
            rel_type,
            properties,
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        match self.properties.get(keys::UUID) {
            Some(PropertyValue::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Permission tokens stored under the `allowed` key
    pub fn allowed(&self) -> Vec<&str> {
        match self.properties.get(keys::ALLOWED) {
            Some(PropertyValue::Array(values)) => {
                values.iter().filter_map(|v| v.as_string()).collect()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_record_accessors() {
        let mut props = PropertyMap::new();
        props.insert(keys::TYPE.to_string(), "Page".into());
        props.insert(keys::UUID.to_string(), "abc123".into());
        props.insert(keys::HIDDEN.to_string(), true.into());

        let record = NodeRecord::new(NodeId::new(1), props);
        assert_eq!(record.type_name(), "Page");
        assert_eq!(record.uuid(), Some("abc123"));
        assert!(record.bool_property(keys::HIDDEN));
        assert!(!record.bool_property(keys::DELETED));
    }

    #[test]
    fn test_empty_uuid_is_absent() {
        let mut props = PropertyMap::new();
        props.insert(keys::UUID.to_string(), "".into());

        let record = NodeRecord::new(NodeId::new(2), props);
        assert_eq!(record.uuid(), None);
    }

    #[test]
    fn test_relationship_allowed_tokens() {
        let mut props = PropertyMap::new();
        props.insert(
            keys::ALLOWED.to_string(),
            PropertyValue::Array(vec!["read".into(), "write".into()]),
        );

        let record = RelationshipRecord::new(
            RelationshipId::new(1),
            NodeId::new(1),
            NodeId::new(2),
            RelationshipType::new("SECURITY"),
            props,
        );
        assert_eq!(record.allowed(), vec!["read", "write"]);
    }
}
