//! Graph data model and embedded store

pub mod property;
pub mod record;
pub mod store;
pub mod tx;
pub mod types;

pub use property::{keys, PropertyMap, PropertyValue};
pub use record::{NodeRecord, RelationshipRecord};
pub use store::{GraphStore, StoreError, StoreResult};
pub use tx::NativeTx;
pub use types::{Direction, NodeId, RelationshipId, RelationshipType};
