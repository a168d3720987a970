//! Node factory
//!
//! Wraps raw store records in typed nodes. This exists because typed
//! wrapping is the most-used operation of the command layer: every read
//! path goes through it. The factory applies the read-visibility check
//! of its security context; an unreadable node wraps to `None` and is
//! filtered from result sets, never an error.

use super::context::TxContext;
use crate::entity::TypedNode;
use crate::error::FrameworkResult;
use crate::graph::NodeId;
use crate::index::IndexHits;
use crate::security::SecurityContext;
use crate::service::GraphService;
use tracing::{debug, error};

/// A page of typed nodes plus the raw (pre-filter) result count
#[derive(Default)]
pub struct ResultList {
    pub nodes: Vec<TypedNode>,
    pub raw_result_count: usize,
}

impl ResultList {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypedNode> {
        self.nodes.iter()
    }
}

pub struct NodeFactory<'a> {
    service: &'a GraphService,
    security: SecurityContext,
}

impl<'a> NodeFactory<'a> {
    pub fn new(service: &'a GraphService, security: SecurityContext) -> Self {
        NodeFactory { service, security }
    }

    /// Wrap a single node, reading the type from its record
    pub fn instantiate(
        &self,
        ctx: &mut TxContext<'_, '_>,
        id: NodeId,
    ) -> FrameworkResult<Option<TypedNode>> {
        self.instantiate_filtered(ctx, id, false, false)
    }

    /// Wrap a single node with explicit visibility filters
    pub fn instantiate_filtered(
        &self,
        ctx: &mut TxContext<'_, '_>,
        id: NodeId,
        include_deleted_and_hidden: bool,
        public_only: bool,
    ) -> FrameworkResult<Option<TypedNode>> {
        let Some(record) = ctx.native().node(id) else {
            return Ok(None);
        };
        let type_name = record.type_name().to_string();
        self.instantiate_with_type(ctx, id, &type_name, include_deleted_and_hidden, public_only)
    }

    /// Wrap a single node with an explicit type hint.
    ///
    /// Resolves the registered definition (generic fallback), runs the
    /// instantiation hook, then applies the read check.
    pub fn instantiate_with_type(
        &self,
        ctx: &mut TxContext<'_, '_>,
        id: NodeId,
        type_name: &str,
        include_deleted_and_hidden: bool,
        public_only: bool,
    ) -> FrameworkResult<Option<TypedNode>> {
        let def = self.service.registry().node_type_or_generic(type_name);
        let node = TypedNode::new(id, def);

        if let Some(hook) = node.type_def().hooks.on_instantiation.clone() {
            (*hook)(ctx, &node)?;
        }

        let Some(record) = ctx.native().node(id) else {
            return Ok(None);
        };
        if self
            .security
            .is_readable(ctx.native(), &record, include_deleted_and_hidden, public_only)
        {
            Ok(Some(node))
        } else {
            Ok(None)
        }
    }

    /// Wrap every readable node of an id list
    pub fn instantiate_all(
        &self,
        ctx: &mut TxContext<'_, '_>,
        ids: &[NodeId],
    ) -> FrameworkResult<ResultList> {
        let mut nodes = Vec::new();
        for id in ids {
            if let Some(node) = self.instantiate(ctx, *id)? {
                nodes.push(node);
            }
        }
        Ok(ResultList {
            nodes,
            raw_result_count: ids.len(),
        })
    }

    /// Wrap index hits with paging.
    ///
    /// offset = (page - 1) * page_size for page > 0; the page size is
    /// capped by the configured maximum, and 0 means "one full page at
    /// the cap". Spatial hits are resolved back to graph nodes by their
    /// numeric id first; a missing backing node is logged and skipped.
    pub fn instantiate_page(
        &self,
        ctx: &mut TxContext<'_, '_>,
        hits: IndexHits,
        include_deleted_and_hidden: bool,
        public_only: bool,
        page_size: usize,
        page: usize,
    ) -> FrameworkResult<ResultList> {
        let cap = self.service.config().max_page_size;
        let effective = if page_size == 0 {
            cap
        } else {
            page_size.min(cap)
        };
        let offset = if page > 0 { (page - 1) * effective } else { 0 };

        let raw_result_count = hits.len();
        let mut nodes = Vec::new();
        let mut position = 0usize;
        let mut count = 0usize;

        let ids: Vec<NodeId> = match hits {
            IndexHits::Nodes(ids) => ids,
            IndexHits::Spatial(geo_hits) => {
                let mut resolved = Vec::with_capacity(geo_hits.len());
                for hit in geo_hits {
                    let id = NodeId::new(hit.raw_id);
                    if ctx.native().node(id).is_none() {
                        error!("node with id {} not found", hit.raw_id);
                        debug!(
                            "stale layer entry at ({}, {})",
                            hit.latitude, hit.longitude
                        );
                        continue;
                    }
                    resolved.push(id);
                }
                resolved
            }
        };

        for id in ids {
            let Some(node) =
                self.instantiate_filtered(ctx, id, include_deleted_and_hidden, public_only)?
            else {
                continue;
            };
            position += 1;
            if position > offset {
                count += 1;
                // stop if we got enough nodes
                if count > effective {
                    return Ok(ResultList {
                        nodes,
                        raw_result_count,
                    });
                }
                nodes.push(node);
            }
        }

        Ok(ResultList {
            nodes,
            raw_result_count,
        })
    }
}
