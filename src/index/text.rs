//! Ordered postings for one named text index
//!
//! Numeric values are indexed under numeric-aware terms so that range
//! queries work; everything else is an opaque token. Postings are kept in
//! a B-Tree per property key, value -> set of node ids.

use crate::graph::{NodeId, PropertyValue};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// A single indexed term
///
/// Numeric terms order among themselves by value and sort before all
/// token terms, so numeric range scans never cross into opaque tokens.
#[derive(Debug, Clone)]
pub enum IndexTerm {
    Numeric(f64),
    Token(String),
}

impl IndexTerm {
    /// Convert a property value to its indexed term.
    ///
    /// Returns `None` for null values; the caller substitutes the
    /// improbable-search-value sentinel before indexing.
    pub fn from_value(value: &PropertyValue) -> Option<IndexTerm> {
        match value {
            PropertyValue::Null => None,
            PropertyValue::Integer(i) => Some(IndexTerm::Numeric(*i as f64)),
            PropertyValue::Float(f) => Some(IndexTerm::Numeric(*f)),
            PropertyValue::DateTime(dt) => Some(IndexTerm::Numeric(*dt as f64)),
            PropertyValue::Boolean(b) => Some(IndexTerm::Token(b.to_string())),
            PropertyValue::String(s) => Some(IndexTerm::Token(s.clone())),
            PropertyValue::Array(_) => Some(IndexTerm::Token(value.to_string())),
        }
    }

    pub fn token(value: impl Into<String>) -> IndexTerm {
        IndexTerm::Token(value.into())
    }
}

impl PartialEq for IndexTerm {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexTerm {}

impl PartialOrd for IndexTerm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexTerm {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexTerm::Numeric(a), IndexTerm::Numeric(b)) => a.total_cmp(b),
            (IndexTerm::Token(a), IndexTerm::Token(b)) => a.cmp(b),
            (IndexTerm::Numeric(_), IndexTerm::Token(_)) => Ordering::Less,
            (IndexTerm::Token(_), IndexTerm::Numeric(_)) => Ordering::Greater,
        }
    }
}

/// Postings for one named index
#[derive(Debug, Default)]
pub struct TextIndex {
    /// property key -> term -> node ids
    postings: HashMap<String, BTreeMap<IndexTerm, FxHashSet<NodeId>>>,
}

impl TextIndex {
    pub fn new() -> Self {
        TextIndex::default()
    }

    pub fn add(&mut self, node: NodeId, key: &str, term: IndexTerm) {
        self.postings
            .entry(key.to_string())
            .or_default()
            .entry(term)
            .or_default()
            .insert(node);
    }

    /// Remove every posting of a node under a property key
    pub fn remove(&mut self, node: NodeId, key: &str) {
        if let Some(terms) = self.postings.get_mut(key) {
            terms.retain(|_, nodes| {
                nodes.remove(&node);
                !nodes.is_empty()
            });
            if terms.is_empty() {
                self.postings.remove(key);
            }
        }
    }

    /// Remove a node from all postings of this index
    pub fn remove_node(&mut self, node: NodeId) {
        self.postings.retain(|_, terms| {
            terms.retain(|_, nodes| {
                nodes.remove(&node);
                !nodes.is_empty()
            });
            !terms.is_empty()
        });
    }

    pub fn exact(&self, key: &str, term: &IndexTerm) -> Vec<NodeId> {
        let mut hits: Vec<NodeId> = self
            .postings
            .get(key)
            .and_then(|terms| terms.get(term))
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default();
        hits.sort();
        hits
    }

    /// Inclusive numeric range scan
    pub fn numeric_range(&self, key: &str, from: f64, to: f64) -> Vec<NodeId> {
        let mut hits = Vec::new();
        if let Some(terms) = self.postings.get(key) {
            let range = (
                std::ops::Bound::Included(IndexTerm::Numeric(from)),
                std::ops::Bound::Included(IndexTerm::Numeric(to)),
            );
            for (_, nodes) in terms.range(range) {
                hits.extend(nodes.iter().copied());
            }
        }
        hits.sort();
        hits
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_exact_lookup() {
        let mut index = TextIndex::new();
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);

        index.add(n1, "name", IndexTerm::token("Home"));
        index.add(n2, "name", IndexTerm::token("Home"));

        let hits = index.exact("name", &IndexTerm::token("Home"));
        assert_eq!(hits, vec![n1, n2]);
        assert!(index.exact("name", &IndexTerm::token("About")).is_empty());
    }

    #[test]
    fn test_remove_leaves_no_stale_postings() {
        let mut index = TextIndex::new();
        let n1 = NodeId::new(1);

        index.add(n1, "name", IndexTerm::token("Old"));
        index.remove(n1, "name");
        index.add(n1, "name", IndexTerm::token("New"));

        assert!(index.exact("name", &IndexTerm::token("Old")).is_empty());
        assert_eq!(index.exact("name", &IndexTerm::token("New")), vec![n1]);

        index.remove(n1, "name");
        assert!(index.is_empty());
    }

    #[test]
    fn test_numeric_range() {
        let mut index = TextIndex::new();
        for i in 1..=10i64 {
            index.add(
                NodeId::new(i as u64),
                "size",
                IndexTerm::from_value(&PropertyValue::Integer(i)).unwrap(),
            );
        }

        let hits = index.numeric_range("size", 3.0, 7.0);
        assert_eq!(hits.len(), 5);
        for i in 3..=7u64 {
            assert!(hits.contains(&NodeId::new(i)));
        }
    }

    #[test]
    fn test_numeric_terms_do_not_collide_with_tokens() {
        let mut index = TextIndex::new();
        index.add(NodeId::new(1), "mixed", IndexTerm::Numeric(5.0));
        index.add(NodeId::new(2), "mixed", IndexTerm::token("5"));

        // the numeric term and the token "5" are distinct postings
        assert_eq!(index.exact("mixed", &IndexTerm::Numeric(5.0)).len(), 1);
        assert_eq!(index.exact("mixed", &IndexTerm::token("5")).len(), 1);
        assert_eq!(index.numeric_range("mixed", 0.0, 10.0).len(), 1);
    }

    #[test]
    fn test_remove_node_clears_all_keys() {
        let mut index = TextIndex::new();
        let n1 = NodeId::new(1);
        index.add(n1, "name", IndexTerm::token("a"));
        index.add(n1, "title", IndexTerm::token("b"));

        index.remove_node(n1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_datetime_indexes_numerically() {
        let term = IndexTerm::from_value(&PropertyValue::DateTime(1_000)).unwrap();
        assert_eq!(term, IndexTerm::Numeric(1_000.0));
    }
}
