//! The transactional command layer

pub mod context;
pub mod create_node;
pub mod create_relationship;
pub mod delete_node;
pub mod index_node;
pub mod node_factory;
pub mod search;
pub mod transaction;

pub use context::{ChangeSet, DeletedObject, ObjectRef, TxContext};
pub use create_node::CreateNodeCommand;
pub use create_relationship::CreateRelationshipCommand;
pub use delete_node::DeleteNodeCommand;
pub use index_node::IndexNodeCommand;
pub use node_factory::{NodeFactory, ResultList};
pub use search::{SearchNodeCommand, IMPROBABLE_SEARCH_VALUE};
pub use transaction::TransactionCommand;
