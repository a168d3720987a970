//! Owner of all named indices
//!
//! The underlying index structures are not safe for concurrent
//! structural mutation, so every named index sits behind its own mutex
//! and all access to it is serialized.

use super::spatial::SpatialIndex;
use super::text::{IndexTerm, TextIndex};
use super::IndexKind;
use crate::graph::NodeId;
use std::sync::Mutex;

/// All named indices of one service
#[derive(Debug, Default)]
pub struct IndexProvider {
    fulltext: Mutex<TextIndex>,
    keyword: Mutex<TextIndex>,
    uuid: Mutex<TextIndex>,
    user: Mutex<TextIndex>,
    layer: Mutex<SpatialIndex>,
}

impl IndexProvider {
    pub fn new() -> Self {
        IndexProvider::default()
    }

    fn text(&self, kind: IndexKind) -> Option<&Mutex<TextIndex>> {
        match kind {
            IndexKind::Fulltext => Some(&self.fulltext),
            IndexKind::Keyword => Some(&self.keyword),
            IndexKind::Uuid => Some(&self.uuid),
            IndexKind::User => Some(&self.user),
            IndexKind::Layer => None,
        }
    }

    /// The layer (spatial) index; callers lock it for the duration of
    /// one mutation or query
    pub fn layer(&self) -> &Mutex<SpatialIndex> {
        &self.layer
    }

    pub fn add(&self, kind: IndexKind, node: NodeId, key: &str, term: IndexTerm) {
        if let Some(index) = self.text(kind) {
            index.lock().unwrap().add(node, key, term);
        }
    }

    pub fn remove(&self, kind: IndexKind, node: NodeId, key: &str) {
        if let Some(index) = self.text(kind) {
            index.lock().unwrap().remove(node, key);
        }
    }

    /// Remove a node from every named index, the layer index included
    pub fn remove_node_everywhere(&self, node: NodeId) {
        for kind in IndexKind::TEXT_KINDS {
            if let Some(index) = self.text(kind) {
                index.lock().unwrap().remove_node(node);
            }
        }
        self.layer.lock().unwrap().remove(node);
    }

    pub fn exact(&self, kind: IndexKind, key: &str, term: &IndexTerm) -> Vec<NodeId> {
        match self.text(kind) {
            Some(index) => index.lock().unwrap().exact(key, term),
            None => Vec::new(),
        }
    }

    pub fn numeric_range(&self, kind: IndexKind, key: &str, from: f64, to: f64) -> Vec<NodeId> {
        match self.text(kind) {
            Some(index) => index.lock().unwrap().numeric_range(key, from, to),
            None => Vec::new(),
        }
    }
}
