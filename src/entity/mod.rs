//! Typed wrappers over raw graph records

pub mod node;
pub mod relationship;

pub use node::TypedNode;
pub use relationship::TypedRelationship;
