//! Node search command
//!
//! Thin query surface over the named indices: exact-term, numeric-range
//! and bounding-box lookups, paged through the node factory.

use super::context::TxContext;
use super::node_factory::{NodeFactory, ResultList};
use crate::entity::TypedNode;
use crate::error::FrameworkResult;
use crate::graph::{keys, PropertyValue};
use crate::index::{IndexHits, IndexKind, IndexTerm};
use crate::security::SecurityContext;
use crate::service::GraphService;

/// Fixed placeholder indexed in place of null or empty values, so that
/// "no value" stays a distinct, queryable token instead of vanishing
/// from the index
pub const IMPROBABLE_SEARCH_VALUE: &str = "\u{1}improbable-search-value\u{1}";

/// The indexed representation of a property value.
///
/// Null and empty values map to the improbable-search-value sentinel;
/// searching for an empty value finds exactly the nodes indexed that way.
pub(crate) fn indexed_term(value: Option<&PropertyValue>) -> IndexTerm {
    match value {
        None | Some(PropertyValue::Null) => IndexTerm::token(IMPROBABLE_SEARCH_VALUE),
        Some(PropertyValue::String(s)) if s.is_empty() => {
            IndexTerm::token(IMPROBABLE_SEARCH_VALUE)
        }
        Some(value) => IndexTerm::from_value(value)
            .unwrap_or_else(|| IndexTerm::token(IMPROBABLE_SEARCH_VALUE)),
    }
}

pub struct SearchNodeCommand<'a> {
    service: &'a GraphService,
    security: SecurityContext,
}

impl<'a> SearchNodeCommand<'a> {
    pub fn new(service: &'a GraphService, security: SecurityContext) -> Self {
        SearchNodeCommand { service, security }
    }

    fn factory(&self) -> NodeFactory<'a> {
        NodeFactory::new(self.service, self.security.clone())
    }

    /// Exact-term lookup in one named index
    pub fn exact(
        &self,
        ctx: &mut TxContext<'_, '_>,
        kind: IndexKind,
        key: &str,
        value: &PropertyValue,
        page_size: usize,
        page: usize,
    ) -> FrameworkResult<ResultList> {
        let term = indexed_term(Some(value));
        let ids = self.service.indexes().exact(kind, key, &term);
        self.factory()
            .instantiate_page(ctx, IndexHits::Nodes(ids), false, false, page_size, page)
    }

    /// Inclusive numeric range lookup
    pub fn numeric_range(
        &self,
        ctx: &mut TxContext<'_, '_>,
        kind: IndexKind,
        key: &str,
        from: f64,
        to: f64,
        page_size: usize,
        page: usize,
    ) -> FrameworkResult<ResultList> {
        let ids = self.service.indexes().numeric_range(kind, key, from, to);
        self.factory()
            .instantiate_page(ctx, IndexHits::Nodes(ids), false, false, page_size, page)
    }

    /// Bounding-box lookup in the layer index
    pub fn within_bbox(
        &self,
        ctx: &mut TxContext<'_, '_>,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
        page_size: usize,
        page: usize,
    ) -> FrameworkResult<ResultList> {
        let hits = self
            .service
            .indexes()
            .layer()
            .lock()
            .unwrap()
            .within_bbox(min_lat, max_lat, min_lon, max_lon);
        self.factory()
            .instantiate_page(ctx, IndexHits::Spatial(hits), false, false, page_size, page)
    }

    /// Resolve a node through the dedicated uuid index
    pub fn by_uuid(
        &self,
        ctx: &mut TxContext<'_, '_>,
        uuid: &str,
    ) -> FrameworkResult<Option<TypedNode>> {
        let ids = self
            .service
            .indexes()
            .exact(IndexKind::Uuid, keys::UUID, &IndexTerm::token(uuid));
        let factory = self.factory();
        for id in ids {
            if let Some(node) = factory.instantiate(ctx, id)? {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }
}
