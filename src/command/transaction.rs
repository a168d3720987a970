//! Transaction command
//!
//! Wraps a unit of work in a store transaction. When the outermost
//! transaction commits, a second, independent transaction runs the
//! after-creation / after-modification / after-deletion hooks for every
//! object collected in the change-set, and the change-set is cleared
//! whether that secondary transaction succeeds or not. Post-processing
//! never runs after a primary failure, and its own failures are logged,
//! never surfaced.

use super::context::{ChangeSet, DeletedObject, ObjectRef, TxContext};
use crate::entity::{TypedNode, TypedRelationship};
use crate::error::{FrameworkError, FrameworkResult};
use crate::security::SecurityContext;
use crate::service::GraphService;
use tracing::{debug, error, warn};

pub struct TransactionCommand<'a> {
    service: &'a GraphService,
    security: SecurityContext,
}

impl<'a> TransactionCommand<'a> {
    pub fn new(service: &'a GraphService, security: SecurityContext) -> Self {
        TransactionCommand { service, security }
    }

    /// Run a unit of work transactionally, returning its result or
    /// propagating its domain error after rollback.
    pub fn execute<T, F>(&self, work: F) -> FrameworkResult<T>
    where
        F: FnOnce(&mut TxContext<'_, '_>) -> FrameworkResult<T>,
    {
        self.run(work)
    }

    /// Second unit-of-work shape: batch work that drives manual commit
    /// control through [`TxContext::checkpoint`].
    pub fn execute_batch<T, F>(&self, work: F) -> FrameworkResult<T>
    where
        F: FnOnce(&mut TxContext<'_, '_>) -> FrameworkResult<T>,
    {
        self.run(work)
    }

    fn run<T, F>(&self, work: F) -> FrameworkResult<T>
    where
        F: FnOnce(&mut TxContext<'_, '_>) -> FrameworkResult<T>,
    {
        let store = self.service.store();

        let mut native = match store.begin_tx() {
            Ok(tx) => tx,
            Err(e) => {
                if e.is_deadlock() {
                    error!("store detected a deadlock: {}", e);
                } else {
                    warn!("could not begin transaction: {}", e);
                }
                return Err(FrameworkError::Store(e));
            }
        };

        let tx_id = store.next_transaction_id();
        let mut changes = ChangeSet::default();
        let mut deferred: Option<FrameworkError> = None;

        let outcome = {
            let mut ctx = TxContext::new(
                self.service,
                self.security.clone(),
                &mut native,
                &mut changes,
                &mut deferred,
                tx_id,
            );
            work(&mut ctx)
        };

        let result = match outcome {
            Ok(value) => {
                native.mark_success();
                debug!("transaction {} successful", tx_id);
                Ok(value)
            }
            Err(e) => {
                native.mark_failure();
                if e.is_deadlock() {
                    error!("transaction {}: store detected a deadlock: {}", tx_id, e);
                } else {
                    warn!("transaction {} failure: {}", tx_id, e);
                }
                Err(e)
            }
        };

        let result = match native.finish() {
            Ok(()) => result,
            Err(finish_error) => {
                // commit errors from the store are frequently wrappers
                // around the real cause; prefer the error deferred while
                // this transaction ran
                let cause = deferred
                    .take()
                    .unwrap_or(FrameworkError::Store(finish_error));
                warn!("transaction {} failed at commit: {}", tx_id, cause);
                Err(cause)
            }
        };

        match result {
            Ok(value) => {
                // only the top-level transaction post-processes
                self.post_process(&mut changes);
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    /// Run the secondary transaction that fires the collected hooks:
    /// creations, then modifications, then deletions. Unordered within
    /// each category.
    fn post_process(&self, changes: &mut ChangeSet) {
        if changes.is_empty() {
            return;
        }
        let collected = changes.take();

        let store = self.service.store();
        let mut post = match store.begin_tx() {
            Ok(tx) => tx,
            Err(e) => {
                warn!("post-processing transaction could not begin: {}", e);
                changes.clear();
                return;
            }
        };

        let tx_id = store.next_transaction_id();
        let mut post_changes = ChangeSet::default();
        let mut deferred: Option<FrameworkError> = None;

        let result = {
            let mut ctx = TxContext::new(
                self.service,
                self.security.clone(),
                &mut post,
                &mut post_changes,
                &mut deferred,
                tx_id,
            );
            Self::fire_hooks(&mut ctx, &collected)
        };

        match result {
            Ok(()) => post.mark_success(),
            Err(e) => {
                post.mark_failure();
                warn!("post-processing failure in transaction {}: {}", tx_id, e);
            }
        }

        if let Err(e) = post.finish() {
            debug!("post-processing transaction {} failed to finish: {}", tx_id, e);
        }

        // aggregated transaction data is cleared no matter what happened
        changes.clear();
    }

    fn fire_hooks(ctx: &mut TxContext<'_, '_>, collected: &ChangeSet) -> FrameworkResult<()> {
        for reference in collected.created() {
            Self::fire_created(ctx, *reference)?;
        }
        for reference in collected.modified() {
            Self::fire_modified(ctx, *reference)?;
        }
        for deleted in collected.deleted() {
            Self::fire_deleted(ctx, deleted)?;
        }
        Ok(())
    }

    fn fire_created(ctx: &mut TxContext<'_, '_>, reference: ObjectRef) -> FrameworkResult<()> {
        match reference {
            ObjectRef::Node(id) => {
                let Some(record) = ctx.native().node(id) else {
                    return Ok(());
                };
                let def = ctx
                    .service()
                    .registry()
                    .node_type_or_generic(record.type_name());
                if let Some(hook) = def.hooks.after_creation.clone() {
                    let node = TypedNode::new(id, def);
                    (*hook)(ctx, &node)?;
                }
            }
            ObjectRef::Relationship(id) => {
                let Some(record) = ctx.native().relationship(id) else {
                    return Ok(());
                };
                let def = ctx
                    .service()
                    .registry()
                    .relationship_type(record.rel_type.as_str());
                if let Some(def) = def {
                    if let Some(hook) = def.hooks.after_creation.clone() {
                        let rel = TypedRelationship::new(id, record.rel_type.clone());
                        (*hook)(ctx, &rel)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn fire_modified(ctx: &mut TxContext<'_, '_>, reference: ObjectRef) -> FrameworkResult<()> {
        match reference {
            ObjectRef::Node(id) => {
                let Some(record) = ctx.native().node(id) else {
                    return Ok(());
                };
                let def = ctx
                    .service()
                    .registry()
                    .node_type_or_generic(record.type_name());
                if let Some(hook) = def.hooks.after_modification.clone() {
                    let node = TypedNode::new(id, def);
                    (*hook)(ctx, &node)?;
                }
            }
            ObjectRef::Relationship(id) => {
                let Some(record) = ctx.native().relationship(id) else {
                    return Ok(());
                };
                let def = ctx
                    .service()
                    .registry()
                    .relationship_type(record.rel_type.as_str());
                if let Some(def) = def {
                    if let Some(hook) = def.hooks.after_modification.clone() {
                        let rel = TypedRelationship::new(id, record.rel_type.clone());
                        (*hook)(ctx, &rel)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn fire_deleted(ctx: &mut TxContext<'_, '_>, deleted: &DeletedObject) -> FrameworkResult<()> {
        let hook = match deleted.reference {
            ObjectRef::Node(_) => ctx
                .service()
                .registry()
                .node_type_or_generic(&deleted.type_name)
                .hooks
                .after_deletion
                .clone(),
            ObjectRef::Relationship(_) => ctx
                .service()
                .registry()
                .relationship_type(&deleted.type_name)
                .and_then(|def| def.hooks.after_deletion.clone()),
        };
        if let Some(hook) = hook {
            (*hook)(ctx, deleted)?;
        }
        Ok(())
    }
}
