//! Named node indices
//!
//! Each named index is guarded by its own mutex; all structural mutation
//! of one index is a single critical section across threads.

pub mod provider;
pub mod spatial;
pub mod text;

pub use provider::IndexProvider;
pub use spatial::{GeoHit, SpatialIndex};
pub use text::{IndexTerm, TextIndex};

use crate::graph::NodeId;

/// The named indices kept by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Fulltext,
    Keyword,
    Uuid,
    User,
    Layer,
}

impl IndexKind {
    /// The text-backed index kinds, iterated when indexing whole nodes
    pub const TEXT_KINDS: [IndexKind; 4] = [
        IndexKind::Fulltext,
        IndexKind::Keyword,
        IndexKind::Uuid,
        IndexKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Fulltext => "fulltext",
            IndexKind::Keyword => "keyword",
            IndexKind::Uuid => "uuid",
            IndexKind::User => "user",
            IndexKind::Layer => "layer",
        }
    }
}

/// Raw hits returned from index lookups, before typed wrapping
#[derive(Debug, Clone)]
pub enum IndexHits {
    /// Node ids from a text index lookup
    Nodes(Vec<NodeId>),
    /// Geometry hits from the layer index; each must be resolved back to
    /// a graph node by its numeric id
    Spatial(Vec<GeoHit>),
}

impl IndexHits {
    pub fn len(&self) -> usize {
        match self {
            IndexHits::Nodes(ids) => ids.len(),
            IndexHits::Spatial(hits) => hits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
