//! Statement analysis context.
//!
//! All state the binder consults is threaded explicitly through
//! [`AnalysisContext`]: session variables, the catalog snapshot, the CTE
//! lexical scope chain, the statement-local table cache and the shared id
//! generator. There are no hidden singletons; the generator is an atomic
//! process-wide object shared between concurrently analyzing statements.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use derive_more::Display;

use crate::catalog::{CatalogReader, TableHandle};
use crate::parser::PlanParser;
use crate::plan::Plan;
use crate::session::SessionVariables;

/// Identity of one scan/consumer node. Unique within a plan tree, allocated
/// from a process-wide counter so concurrent statements never collide.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub struct RelationId(pub u64);

/// Stable identity of one output column of a bound operator.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SlotId(pub u64);

/// Stable identity of a common-table-expression definition.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub struct CteId(pub u64);

/// Process-wide id allocator. Lock-free; share one instance across all
/// sessions via `Arc`.
#[derive(Debug, Default)]
pub struct IdGen {
    relation: AtomicU64,
    slot: AtomicU64,
    cte: AtomicU64,
}

impl IdGen {
    pub fn next_relation_id(&self) -> RelationId {
        RelationId(self.relation.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_slot_id(&self) -> SlotId {
        SlotId(self.slot.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_cte_id(&self) -> CteId {
        CteId(self.cte.fetch_add(1, Ordering::Relaxed))
    }
}

/// One registered CTE. `plan` is `None` until the definition-time analysis
/// rule caches the bound body; the bind rule only ever consumes cached state.
#[derive(Clone, Debug)]
pub struct CteEntry {
    id: CteId,
    plan: Option<Arc<Plan>>,
}

impl CteEntry {
    pub fn id(&self) -> CteId {
        self.id
    }

    /// The analyzed body, if the CTE has already been bound.
    pub fn analyzed_plan(&self) -> Option<Arc<Plan>> {
        self.plan.clone()
    }
}

pub struct AnalysisContext {
    session: SessionVariables,
    catalog: Arc<dyn CatalogReader>,
    parser: Arc<dyn PlanParser>,
    id_gen: Arc<IdGen>,
    /// Tables extracted from the statement up front; consulted before the
    /// catalog for bare single-part names.
    table_cache: HashMap<String, Arc<TableHandle>>,
    /// Lexical scope chain, innermost last. Read-and-append within one
    /// statement's analysis.
    cte_scopes: Mutex<Vec<HashMap<String, CteEntry>>>,
    /// Which consumer relations reference each CTE, for fan-out tracking by
    /// later optimizer passes. Shared with nested (view) contexts.
    cte_consumers: Arc<Mutex<HashMap<CteId, Vec<RelationId>>>>,
}

impl AnalysisContext {
    pub fn new(
        session: SessionVariables,
        catalog: Arc<dyn CatalogReader>,
        parser: Arc<dyn PlanParser>,
    ) -> Self {
        Self::with_id_gen(session, catalog, parser, Arc::new(IdGen::default()))
    }

    pub fn with_id_gen(
        session: SessionVariables,
        catalog: Arc<dyn CatalogReader>,
        parser: Arc<dyn PlanParser>,
        id_gen: Arc<IdGen>,
    ) -> Self {
        Self {
            session,
            catalog,
            parser,
            id_gen,
            table_cache: HashMap::new(),
            cte_scopes: Mutex::new(vec![HashMap::new()]),
            cte_consumers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_cached_tables(
        mut self,
        tables: HashMap<String, Arc<TableHandle>>,
    ) -> Self {
        self.table_cache = tables;
        self
    }

    /// Child context for a nested analysis pass (view expansion).
    ///
    /// Shares the statement's global bookkeeping (id generator, consumer
    /// registry, catalog, session) but starts a fresh CTE scope chain: a
    /// view's stored text cannot see the outer statement's WITH clause.
    pub fn nested(&self) -> Self {
        Self {
            session: self.session.clone(),
            catalog: self.catalog.clone(),
            parser: self.parser.clone(),
            id_gen: self.id_gen.clone(),
            table_cache: self.table_cache.clone(),
            cte_scopes: Mutex::new(vec![HashMap::new()]),
            cte_consumers: self.cte_consumers.clone(),
        }
    }

    pub fn session(&self) -> &SessionVariables {
        &self.session
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogReader> {
        &self.catalog
    }

    pub fn parser(&self) -> &Arc<dyn PlanParser> {
        &self.parser
    }

    pub fn id_gen(&self) -> &Arc<IdGen> {
        &self.id_gen
    }

    pub fn cached_table(&self, name: &str) -> Option<Arc<TableHandle>> {
        self.table_cache.get(name).cloned()
    }

    /// Open a nested CTE scope (entering a WITH clause).
    pub fn push_cte_scope(&self) {
        self.cte_scopes.lock().unwrap().push(HashMap::new());
    }

    pub fn pop_cte_scope(&self) {
        let mut scopes = self.cte_scopes.lock().unwrap();
        if scopes.len() > 1 {
            scopes.pop();
        }
    }

    /// Register a CTE definition in the innermost scope. Called by the
    /// definition-time registration rule, not by the bind rule.
    pub fn register_cte(&self, name: impl Into<String>, plan: Option<Arc<Plan>>) -> CteId {
        let id = self.id_gen.next_cte_id();
        let entry = CteEntry { id, plan };
        self.cte_scopes
            .lock()
            .unwrap()
            .last_mut()
            .expect("at least one CTE scope")
            .insert(name.into(), entry);
        id
    }

    /// Cache the analyzed body for an already-registered CTE.
    pub fn cache_cte_plan(&self, name: &str, plan: Arc<Plan>) {
        let mut scopes = self.cte_scopes.lock().unwrap();
        for scope in scopes.iter_mut().rev() {
            if let Some(entry) = scope.get_mut(name) {
                entry.plan = Some(plan);
                return;
            }
        }
    }

    /// Find a CTE by name, searching scopes inner to outer.
    pub fn find_cte(&self, name: &str) -> Option<CteEntry> {
        let scopes = self.cte_scopes.lock().unwrap();
        scopes.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    pub fn register_cte_consumer(&self, cte_id: CteId, relation_id: RelationId) {
        self.cte_consumers
            .lock()
            .unwrap()
            .entry(cte_id)
            .or_default()
            .push(relation_id);
    }

    /// Consumer relations registered against a CTE so far.
    pub fn cte_consumers(&self, cte_id: CteId) -> Vec<RelationId> {
        self.cte_consumers
            .lock()
            .unwrap()
            .get(&cte_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::parser::NullParser;

    fn context() -> AnalysisContext {
        AnalysisContext::new(
            SessionVariables::default(),
            Arc::new(MemoryCatalog::new()),
            Arc::new(NullParser),
        )
    }

    #[test]
    fn test_id_gen_is_monotonic() {
        let gen = IdGen::default();
        let a = gen.next_relation_id();
        let b = gen.next_relation_id();
        assert!(b.0 > a.0);
    }

    #[test]
    fn test_cte_scope_chain_shadowing() {
        let ctx = context();
        let outer = ctx.register_cte("t", None);
        ctx.push_cte_scope();
        let inner = ctx.register_cte("t", None);

        // Inner scope wins.
        assert_eq!(ctx.find_cte("t").unwrap().id(), inner);
        ctx.pop_cte_scope();
        assert_eq!(ctx.find_cte("t").unwrap().id(), outer);
    }

    #[test]
    fn test_consumer_registry_tracks_fanout() {
        let ctx = context();
        let cte = ctx.register_cte("t", None);
        let r1 = ctx.id_gen().next_relation_id();
        let r2 = ctx.id_gen().next_relation_id();
        ctx.register_cte_consumer(cte, r1);
        ctx.register_cte_consumer(cte, r2);

        assert_eq!(ctx.cte_consumers(cte), vec![r1, r2]);
    }

    #[test]
    fn test_nested_context_shares_bookkeeping() {
        let ctx = context();
        ctx.register_cte("outer_cte", None);

        let nested = ctx.nested();
        // Fresh CTE scope chain.
        assert!(nested.find_cte("outer_cte").is_none());
        // Shared id namespace.
        let a = ctx.id_gen().next_slot_id();
        let b = nested.id_gen().next_slot_id();
        assert!(b.0 > a.0);
    }
}
