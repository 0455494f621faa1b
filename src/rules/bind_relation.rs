//! Binds every unresolved relation to the catalog.
//!
//! This is the single entry point the rewrite engine fires on each
//! [`UnboundRelation`] leaf: resolve the dotted name (CTE scope chain,
//! statement table cache, then catalog), synthesize the scan variant for
//! the table's storage kind, validate any partition restriction, inject the
//! implicit delete-marker filter where the storage engine needs it, and
//! expand views through a nested analysis pass. The call is pure from the
//! engine's point of view: old subtree in, new subtree out, with no side
//! effects beyond id allocation and CTE consumer registration.

use std::sync::Arc;

use anyhow::anyhow;
use itertools::Itertools;

use crate::analyzer::Analyzer;
use crate::catalog::{
    MergePolicy, NativeMeta, Partition, PartitionId, TableHandle, TableKind,
    DELETE_MARKER,
};
use crate::context::{AnalysisContext, CteId};
use crate::error::{AnalysisResult, AnalyzerError};
use crate::expr::{Expr, Literal};
use crate::operator::{
    CteConsumer, FileScan, Filter, JdbcScan, NativeScan, Operator, SchemaScan,
    SearchScan, SubqueryAlias, UnboundRelation,
};
use crate::plan::Plan;
use crate::rules::RuleId::BindRelation;
use crate::rules::{OptExpression, Pattern, Rule, RuleId, RulePromise, RuleResult};

#[rustfmt::skip::macros(lazy_static)]
lazy_static! {
    static ref BIND_RELATION_PATTERN: Pattern = {
        Pattern::new_leaf(|op| {
            matches!(op, Operator::UnboundRelation(_))
        })
    };
}

/// Relation binding rule.
#[derive(Clone, Default)]
pub struct BindRelationRule {}

impl BindRelationRule {
    pub fn new() -> Self {
        Self {}
    }
}

impl Rule for BindRelationRule {
    fn apply<A: Analyzer>(
        &self,
        input: OptExpression<A>,
        ctx: &A,
        result: &mut RuleResult<A>,
    ) -> AnalysisResult<()> {
        let relation = match input.get_operator(ctx)? {
            Operator::UnboundRelation(relation) => relation.clone(),
            op => {
                return Err(anyhow!("pattern mismatch: {:?}", op).into());
            }
        };

        result.add(bind(&relation, ctx)?);
        Ok(())
    }

    fn pattern(&self) -> &Pattern {
        &BIND_RELATION_PATTERN
    }

    fn rule_id(&self) -> RuleId {
        BindRelation
    }

    fn rule_promise(&self) -> RulePromise {
        RulePromise::High
    }
}

/// Bind one unresolved relation to a bound subtree.
pub fn bind<A: Analyzer>(
    relation: &UnboundRelation,
    analyzer: &A,
) -> AnalysisResult<OptExpression<A>> {
    match relation.name_parts().len() {
        // Bare table name: may be a CTE, resolves against the session's
        // current database otherwise.
        1 => bind_with_current_db(relation, analyzer),
        // `db.table` or `catalog.db.table`; CTE names are not considered.
        2 | 3 => bind_qualified(relation, analyzer),
        _ => Err(AnalyzerError::MalformedName {
            name: relation.table_name(),
        }),
    }
}

fn bind_with_current_db<A: Analyzer>(
    relation: &UnboundRelation,
    analyzer: &A,
) -> AnalysisResult<OptExpression<A>> {
    let ctx = analyzer.context();
    let name = &relation.name_parts()[0];

    if let Some(entry) = ctx.find_cte(name) {
        // Only an already-analyzed CTE is consumable here; definition-time
        // analysis belongs to the CTE registration rule.
        if let Some(plan) = entry.analyzed_plan() {
            return bind_cte_consumer(name, entry.id(), plan, ctx);
        }
    }

    let qualifier = qualified_name(ctx, relation.name_parts());
    // Cache and catalog can transiently disagree, so a cache miss always
    // falls through to a direct catalog lookup.
    let table = match ctx.cached_table(name) {
        Some(table) => table,
        None => resolve_table(ctx, &qualifier)?,
    };

    synthesize_scan(table, relation, &qualifier, analyzer)
}

fn bind_qualified<A: Analyzer>(
    relation: &UnboundRelation,
    analyzer: &A,
) -> AnalysisResult<OptExpression<A>> {
    let ctx = analyzer.context();
    let qualifier = qualified_name(ctx, relation.name_parts());
    let table = resolve_table(ctx, &qualifier)?;
    synthesize_scan(table, relation, &qualifier, analyzer)
}

/// Fill in session defaults to get `[catalog, database, table]`.
fn qualified_name(ctx: &AnalysisContext, name_parts: &[String]) -> [String; 3] {
    let session = ctx.session();
    match name_parts {
        [table] => [
            session.default_catalog().to_string(),
            session.default_database().to_string(),
            table.clone(),
        ],
        [db, table] => [
            session.default_catalog().to_string(),
            db.clone(),
            table.clone(),
        ],
        [catalog, db, table] => [catalog.clone(), db.clone(), table.clone()],
        // Part count is validated in `bind`.
        _ => unreachable!("name part count validated before qualification"),
    }
}

fn resolve_table(
    ctx: &AnalysisContext,
    qualifier: &[String; 3],
) -> AnalysisResult<Arc<TableHandle>> {
    ctx.catalog()
        .resolve_table(&qualifier[0], &qualifier[1], &qualifier[2])
        .ok_or_else(|| AnalyzerError::TableNotFound {
            name: qualifier.join("."),
        })
}

/// Dispatch on the storage kind. Exhaustive by construction: a new kind in
/// [`TableKind`] fails compilation here instead of falling into a default.
fn synthesize_scan<A: Analyzer>(
    table: Arc<TableHandle>,
    relation: &UnboundRelation,
    qualifier: &[String; 3],
    analyzer: &A,
) -> AnalysisResult<OptExpression<A>> {
    let ctx = analyzer.context();
    let database = qualifier[1].clone();
    let id_gen = ctx.id_gen();

    if !relation.partitions().is_empty() && table.as_native().is_none() {
        return Err(AnalyzerError::PartitionOnNonNative {
            table: table.name().to_string(),
            kind: table.kind_name(),
        });
    }

    match table.kind() {
        TableKind::Native(_) => make_native_scan(table, relation, qualifier, ctx),
        TableKind::View { definition, .. } => {
            let definition = definition.clone();
            expand_view(&definition, qualifier, analyzer)
        }
        TableKind::HiveExternal { .. } => Ok(Operator::FileScan(FileScan::new(
            id_gen.next_relation_id(),
            table.clone(),
            database,
            id_gen,
        ))
        .into()),
        TableKind::JdbcExternal { .. } => Ok(Operator::JdbcScan(JdbcScan::new(
            id_gen.next_relation_id(),
            table.clone(),
            database,
            id_gen,
        ))
        .into()),
        TableKind::SearchExternal { .. } => Ok(Operator::SearchScan(SearchScan::new(
            id_gen.next_relation_id(),
            table.clone(),
            database,
            id_gen,
        ))
        .into()),
        TableKind::Schema { .. } => Ok(Operator::SchemaScan(SchemaScan::new(
            id_gen.next_relation_id(),
            table.clone(),
            database,
            id_gen,
        ))
        .into()),
    }
}

fn make_native_scan<A: Analyzer>(
    table: Arc<TableHandle>,
    relation: &UnboundRelation,
    qualifier: &[String; 3],
    ctx: &AnalysisContext,
) -> AnalysisResult<OptExpression<A>> {
    let partition_ids = select_partitions(&table, relation)?;
    let id_gen = ctx.id_gen();
    let scan = if partition_ids.is_empty() {
        NativeScan::new(
            id_gen.next_relation_id(),
            table,
            qualifier[1].clone(),
            relation.hints().to_vec(),
            id_gen,
        )
    } else {
        NativeScan::with_partitions(
            id_gen.next_relation_id(),
            table,
            qualifier[1].clone(),
            partition_ids,
            relation.hints().to_vec(),
            id_gen,
        )
    };

    inject_delete_marker_filter(scan, ctx)
}

/// Map requested partition names to validated ids, in request order.
/// Duplicates are preserved: the request reflects user intent.
fn select_partitions(
    table: &TableHandle,
    relation: &UnboundRelation,
) -> AnalysisResult<Vec<PartitionId>> {
    if relation.partitions().is_empty() {
        return Ok(vec![]);
    }

    let meta: &NativeMeta =
        table
            .as_native()
            .ok_or_else(|| AnalyzerError::PartitionOnNonNative {
                table: table.name().to_string(),
                kind: table.kind_name(),
            })?;

    relation
        .partitions()
        .iter()
        .map(|name| {
            meta.partition(name, relation.is_temp_partition())
                .map(Partition::id)
                .ok_or_else(|| AnalyzerError::PartitionNotFound {
                    partition: name.clone(),
                    table: table.name().to_string(),
                })
        })
        .try_collect()
}

/// Wrap a native scan in the implicit `delete_marker = 0` filter when the
/// table marks deleted rows with a hidden column and the session has not
/// opted out.
fn inject_delete_marker_filter<A: Analyzer>(
    scan: NativeScan,
    ctx: &AnalysisContext,
) -> AnalysisResult<OptExpression<A>> {
    let session = ctx.session();
    let meta = scan
        .table()
        .as_native()
        .ok_or_else(|| anyhow!("native scan over non-native table handle"))?;

    if !meta.has_delete_marker()
        || session.show_hidden_columns()
        || session.skip_delete_marker()
    {
        return Ok(Operator::NativeScan(scan).into());
    }

    let marker_slot = scan
        .output()
        .iter()
        .find(|slot| slot.name() == DELETE_MARKER)
        .cloned()
        .ok_or_else(|| {
            AnalyzerError::SchemaConsistency(format!(
                "delete marker column [{}] declared by table [{}] is missing from scan output",
                DELETE_MARKER,
                scan.table().name()
            ))
        })?;

    // With merge-on-read, deleted rows survive until this very filter, so
    // pre-aggregating below it would see them.
    let merge_policy = meta.merge_policy();
    let scan = if merge_policy != MergePolicy::MergeOnWrite {
        scan.with_pre_agg_off(format!("{} is used as conjuncts", DELETE_MARKER))
    } else {
        scan
    };

    let conjunct = Expr::eq(
        Expr::Literal(Literal::not_deleted()),
        Expr::Slot(marker_slot),
    );
    Ok(OptExpression::with_operator(
        Operator::Filter(Filter::new(vec![conjunct])),
        vec![Operator::NativeScan(scan).into()],
    ))
}

/// Parse and analyze a view's stored definition in a nested pass, then
/// splice the bound body under an alias carrying the view's qualified name.
fn expand_view<A: Analyzer>(
    definition: &str,
    qualifier: &[String; 3],
    analyzer: &A,
) -> AnalysisResult<OptExpression<A>> {
    let view_name = qualifier.join(".");

    let parsed = analyzer
        .context()
        .parser()
        .parse(definition)
        .map_err(|source| AnalyzerError::ViewDefinition {
            view: view_name.clone(),
            source: Box::new(source),
        })?;

    let bound = analyzer
        .analyze_nested(parsed)
        .map_err(|source| AnalyzerError::ViewDefinition {
            view: view_name.clone(),
            source: Box::new(source),
        })?;

    Ok(OptExpression::with_operator(
        Operator::SubqueryAlias(SubqueryAlias::new(qualifier.to_vec())),
        vec![OptExpression::from_plan_node(&bound.root())],
    ))
}

fn bind_cte_consumer<A: Analyzer>(
    name: &str,
    cte_id: CteId,
    plan: Arc<Plan>,
    ctx: &AnalysisContext,
) -> AnalysisResult<OptExpression<A>> {
    let relation_id = ctx.id_gen().next_relation_id();
    let consumer = CteConsumer::new(relation_id, cte_id, name, plan);
    ctx.register_cte_consumer(cte_id, relation_id);
    Ok(Operator::CteConsumer(consumer).into())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::catalog::Column;
    use crate::operator::{Join, JoinType, PreAggStatus};
    use crate::plan::{PlanNode, PlanNodeRef};
    use crate::test_utils::{
        build_analyzer_for_test, plan_of, test_catalog, test_context, test_session,
        unbound_plan, CannedParser,
    };
    use arrow_schema::DataType;

    fn analyze(plan: Plan, session: crate::session::SessionVariables) -> Plan {
        build_analyzer_for_test(plan, test_context(session))
            .analyze()
            .unwrap()
    }

    fn analyze_relation(
        relation: UnboundRelation,
        session: crate::session::SessionVariables,
    ) -> AnalysisResult<Plan> {
        build_analyzer_for_test(
            plan_of(Operator::UnboundRelation(relation)),
            test_context(session),
        )
        .analyze()
    }

    fn join_of(left: PlanNodeRef, right: PlanNodeRef) -> Plan {
        Plan::new(Arc::new(PlanNode::new(
            9,
            Operator::Join(Join::new(JoinType::Cross, None)),
            vec![left, right],
        )))
    }

    #[test]
    fn test_bind_bare_name_with_default_db() {
        let bound = analyze(unbound_plan(vec!["orders"]), test_session());

        let root = bound.root();
        let scan = root.operator().as_native_scan().unwrap();
        assert_eq!(scan.table().name(), "orders");
        assert_eq!(scan.qualifier(), ["sales"]);
        assert!(scan.partitions().is_empty());
        assert!(scan.pre_agg().is_on());

        let output = root.logical_prop().unwrap().output();
        let names: Vec<&str> = output.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["id", "amount"]);
        assert!(output
            .iter()
            .all(|s| s.qualifier() == ["sales", "orders"]));
    }

    #[test]
    fn test_malformed_name_part_count() {
        let relation = UnboundRelation::new(vec!["a", "b", "c", "d"]);
        let err = analyze_relation(relation, test_session()).unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedName { .. }));
        assert!(err.to_string().contains("a.b.c.d"));
    }

    #[test]
    fn test_table_not_found() {
        let err = analyze_relation(UnboundRelation::new(vec!["nope"]), test_session())
            .unwrap_err();
        assert!(err.to_string().contains("internal.sales.nope"));
    }

    #[test]
    fn test_partition_list_preserves_request_order_and_duplicates() {
        let relation = UnboundRelation::new(vec!["t"])
            .with_partitions(vec!["p2", "p1", "p2"], false);
        let bound = analyze_relation(
            relation,
            test_session().with_skip_delete_marker(true),
        )
        .unwrap();

        let root = bound.root();
        let scan = root.operator().as_native_scan().unwrap();
        let ids: Vec<u64> = scan.partitions().iter().map(|p| p.0).collect();
        assert_eq!(ids, [2, 1, 2]);
    }

    #[test]
    fn test_temporary_partitions_are_a_distinct_namespace() {
        let relation =
            UnboundRelation::new(vec!["t"]).with_partitions(vec!["tp1"], true);
        let bound = analyze_relation(
            relation,
            test_session().with_skip_delete_marker(true),
        )
        .unwrap();
        let root = bound.root();
        let scan = root.operator().as_native_scan().unwrap();
        assert_eq!(scan.partitions(), [PartitionId(3)]);

        // A permanent partition name does not resolve in the temporary
        // namespace.
        let relation =
            UnboundRelation::new(vec!["t"]).with_partitions(vec!["p1"], true);
        let err = analyze_relation(relation, test_session()).unwrap_err();
        assert!(matches!(err, AnalyzerError::PartitionNotFound { .. }));
    }

    #[test]
    fn test_partition_not_found_names_the_partition() {
        let relation =
            UnboundRelation::new(vec!["t"]).with_partitions(vec!["p9999"], false);
        let err = analyze_relation(relation, test_session()).unwrap_err();
        match err {
            AnalyzerError::PartitionNotFound { partition, table } => {
                assert_eq!(partition, "p9999");
                assert_eq!(table, "t");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_partitions_rejected_on_every_non_native_kind() {
        for table in ["hive_t", "jdbc_t", "search_t", "schema_t", "v_orders"] {
            let relation =
                UnboundRelation::new(vec![table]).with_partitions(vec!["p1"], false);
            let err = analyze_relation(relation, test_session()).unwrap_err();
            assert!(
                matches!(err, AnalyzerError::PartitionOnNonNative { .. }),
                "kind of {} should reject partitions, got: {}",
                table,
                err
            );
        }
    }

    #[test]
    fn test_delete_marker_filter_wraps_scan() {
        let bound = analyze(unbound_plan(vec!["t"]), test_session());

        let root = bound.root();
        let filter = root.operator().as_filter().unwrap();
        assert_eq!(filter.conjuncts().len(), 1);
        match &filter.conjuncts()[0] {
            Expr::Eq(left, right) => {
                assert_eq!(**left, Expr::Literal(Literal::not_deleted()));
                match &**right {
                    Expr::Slot(slot) => {
                        assert_eq!(slot.name(), DELETE_MARKER);
                        assert!(slot.is_hidden());
                    }
                    other => panic!("unexpected conjunct operand: {}", other),
                }
            }
            other => panic!("unexpected conjunct: {}", other),
        }

        let scan = root.inputs()[0].operator().as_native_scan().unwrap();
        assert_eq!(scan.table().name(), "t");
        // The filter sees its input's full output, marker included.
        assert_eq!(
            root.logical_prop().unwrap().output().len(),
            scan.output().len()
        );
    }

    #[test]
    fn test_merge_on_read_turns_pre_agg_off() {
        let bound = analyze(unbound_plan(vec!["t"]), test_session());
        let root = bound.root();
        let scan = root.inputs()[0].operator().as_native_scan().unwrap();
        match scan.pre_agg() {
            PreAggStatus::Off(reason) => {
                assert!(reason.contains(DELETE_MARKER));
            }
            PreAggStatus::On => panic!("pre-agg should be off under merge-on-read"),
        }
    }

    #[test]
    fn test_merge_on_write_keeps_pre_agg_on() {
        let bound = analyze(unbound_plan(vec!["t_mow"]), test_session());
        let root = bound.root();
        // Still filtered, but pre-agg stays untouched.
        assert!(root.operator().as_filter().is_some());
        let scan = root.inputs()[0].operator().as_native_scan().unwrap();
        assert!(scan.pre_agg().is_on());
    }

    #[test]
    fn test_session_opt_outs_skip_the_filter() {
        for session in [
            test_session().with_show_hidden_columns(true),
            test_session().with_skip_delete_marker(true),
        ] {
            let bound = analyze(unbound_plan(vec!["t"]), session);
            let root = bound.root();
            assert!(root.operator().as_native_scan().is_some());
            assert!(root.inputs().is_empty());
        }
    }

    #[test]
    fn test_external_kinds_build_their_scan_variant() {
        let cases = [
            ("hive_t", "FileScan"),
            ("jdbc_t", "JdbcScan"),
            ("search_t", "SearchScan"),
            ("schema_t", "SchemaScan"),
        ];
        for (table, expected) in cases {
            let bound = analyze(unbound_plan(vec![table]), test_session());
            let root = bound.root();
            let display = root.operator().to_string();
            assert!(
                display.starts_with(expected),
                "binding {} produced {}",
                table,
                display
            );
            let output = root.logical_prop().unwrap().output();
            assert!(output
                .iter()
                .all(|slot| slot.qualifier() == ["sales", table]));
        }
    }

    #[test]
    fn test_view_expands_to_bound_subquery_alias() {
        let bound = analyze(unbound_plan(vec!["v_orders"]), test_session());

        let root = bound.root();
        let alias = root.operator().as_subquery_alias().unwrap();
        assert_eq!(alias.alias_name(), "internal.sales.v_orders");

        assert!(!bound.contains_unbound());
        let inner = root.inputs()[0].operator().as_native_scan().unwrap();
        assert_eq!(inner.table().name(), "orders");

        // Outer references resolve through the view's name.
        let output = root.logical_prop().unwrap().output();
        assert!(output
            .iter()
            .all(|slot| slot.qualifier() == ["internal", "sales", "v_orders"]));
        // Aliasing keeps the inner slot ids.
        let inner_ids: Vec<_> = inner.output().iter().map(|s| s.id()).collect();
        let outer_ids: Vec<_> = output.iter().map(|s| s.id()).collect();
        assert_eq!(inner_ids, outer_ids);
    }

    #[test]
    fn test_view_definition_parse_failure_names_the_view() {
        let catalog = test_catalog();
        // No canned plan registered, so expanding any view fails to parse.
        let context = AnalysisContext::new(
            test_session(),
            catalog,
            Arc::new(CannedParser::default()),
        );
        let err = build_analyzer_for_test(unbound_plan(vec!["v_orders"]), context)
            .analyze()
            .unwrap_err();
        match err {
            AnalyzerError::ViewDefinition { view, .. } => {
                assert_eq!(view, "internal.sales.v_orders");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cte_consumers_share_one_bound_body() {
        let context = test_context(test_session());
        // Definition-time analysis of the CTE body, cached up front.
        let body = Arc::new(
            context
                .parser()
                .parse("SELECT * FROM orders")
                .and_then(|plan| {
                    build_analyzer_for_test(plan, context.nested()).analyze()
                })
                .unwrap(),
        );
        let cte_id = context.register_cte("c", Some(body.clone()));
        let probe = context.nested();

        let unbound = |id| {
            Arc::new(PlanNode::new(
                id,
                Operator::UnboundRelation(UnboundRelation::new(vec!["c"])),
                vec![],
            ))
        };
        let bound = build_analyzer_for_test(join_of(unbound(1), unbound(2)), context)
            .analyze()
            .unwrap();

        let root = bound.root();
        let left = root.inputs()[0].operator().as_cte_consumer().unwrap();
        let right = root.inputs()[1].operator().as_cte_consumer().unwrap();
        assert_ne!(left.relation_id(), right.relation_id());
        assert!(Arc::ptr_eq(left.plan(), right.plan()));
        assert_eq!(left.cte_id(), cte_id);

        // Both consumers registered for fan-out tracking.
        assert_eq!(probe.cte_consumers(cte_id).len(), 2);
    }

    #[test]
    fn test_qualified_names_never_match_ctes() {
        let context = test_context(test_session());
        let body = Arc::new(
            build_analyzer_for_test(unbound_plan(vec!["t_mow"]), context.nested())
                .analyze()
                .unwrap(),
        );
        // Same name as a real table.
        context.register_cte("orders", Some(body));

        let bound = build_analyzer_for_test(
            unbound_plan(vec!["sales", "orders"]),
            context,
        )
        .analyze()
        .unwrap();
        assert!(bound.root().operator().as_native_scan().is_some());
    }

    #[test]
    fn test_cte_shadows_same_named_table_for_bare_names() {
        let context = test_context(test_session());
        let body = Arc::new(
            build_analyzer_for_test(unbound_plan(vec!["t_mow"]), context.nested())
                .analyze()
                .unwrap(),
        );
        context.register_cte("orders", Some(body));

        let bound = build_analyzer_for_test(unbound_plan(vec!["orders"]), context)
            .analyze()
            .unwrap();
        assert!(bound.root().operator().as_cte_consumer().is_some());
    }

    #[test]
    fn test_statement_table_cache_wins_over_catalog() {
        // The cache maps the bare name to a hive handle, while the catalog
        // has a native `orders`; a cache hit must be visible in the result.
        let cached = Arc::new(TableHandle::new(
            "orders",
            TableKind::HiveExternal {
                columns: vec![Column::new("id", DataType::Int64)],
            },
        ));
        let mut cache = HashMap::new();
        cache.insert("orders".to_string(), cached);
        let context = test_context(test_session()).with_cached_tables(cache);

        let bound = build_analyzer_for_test(unbound_plan(vec!["orders"]), context)
            .analyze()
            .unwrap();
        assert!(bound.root().operator().as_file_scan().is_some());
    }

    #[test]
    fn test_cache_miss_falls_back_to_catalog() {
        let mut cache = HashMap::new();
        cache.insert(
            "something_else".to_string(),
            Arc::new(TableHandle::new(
                "something_else",
                TableKind::Schema { columns: vec![] },
            )),
        );
        let context = test_context(test_session()).with_cached_tables(cache);

        let bound = build_analyzer_for_test(unbound_plan(vec!["orders"]), context)
            .analyze()
            .unwrap();
        assert!(bound.root().operator().as_native_scan().is_some());
    }

    #[test]
    fn test_slot_ids_grow_left_to_right() {
        let unbound = |id, name: &str| {
            Arc::new(PlanNode::new(
                id,
                Operator::UnboundRelation(UnboundRelation::new(vec![name])),
                vec![],
            ))
        };
        let bound = analyze(
            join_of(unbound(1, "orders"), unbound(2, "t_mow")),
            test_session(),
        );

        let root = bound.root();
        let left_scan = root.inputs()[0].operator().as_native_scan().unwrap();
        let right = &root.inputs()[1];
        let right_scan = right.inputs()[0].operator().as_native_scan().unwrap();

        let left_max = left_scan.output().iter().map(|s| s.id()).max().unwrap();
        let right_min = right_scan.output().iter().map(|s| s.id()).min().unwrap();
        assert!(left_max < right_min);

        // The join's output is left slots then right slots.
        let join_output = root.logical_prop().unwrap().output();
        assert_eq!(
            join_output.len(),
            left_scan.output().len() + right.logical_prop().unwrap().output().len()
        );
    }

    #[test]
    fn test_nested_join_slot_ids_follow_appearance_order() {
        // Join(Join(orders, t_mow), t): appearance order is orders, t_mow, t,
        // with the rightmost table the shallowest. Binding must still visit
        // the deeper left relations first.
        let unbound = |id, name: &str| {
            Arc::new(PlanNode::new(
                id,
                Operator::UnboundRelation(UnboundRelation::new(vec![name])),
                vec![],
            ))
        };
        let inner = Arc::new(PlanNode::new(
            8,
            Operator::Join(Join::new(JoinType::Cross, None)),
            vec![unbound(1, "orders"), unbound(2, "t_mow")],
        ));
        let bound = analyze(
            Plan::new(Arc::new(PlanNode::new(
                9,
                Operator::Join(Join::new(JoinType::Cross, None)),
                vec![inner, unbound(3, "t")],
            ))),
            test_session(),
        );

        let root = bound.root();
        let inner_join = &root.inputs()[0];
        let orders = inner_join.inputs()[0].operator().as_native_scan().unwrap();
        let t_mow = inner_join.inputs()[1].inputs()[0]
            .operator()
            .as_native_scan()
            .unwrap();
        let t = root.inputs()[1].inputs()[0]
            .operator()
            .as_native_scan()
            .unwrap();

        let range = |scan: &NativeScan| {
            let ids: Vec<_> = scan.output().iter().map(|s| s.id()).collect();
            (*ids.iter().min().unwrap(), *ids.iter().max().unwrap())
        };
        let (_, orders_max) = range(orders);
        let (t_mow_min, t_mow_max) = range(t_mow);
        let (t_min, _) = range(t);
        assert!(orders_max < t_mow_min);
        assert!(t_mow_max < t_min);
    }
}
