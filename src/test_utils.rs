//! Shared fixtures for binder tests.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_schema::DataType;

use crate::catalog::{
    Column, MemoryCatalog, MergePolicy, NativeMeta, Partition, PartitionId,
    TableHandle, TableKind, DELETE_MARKER,
};
use crate::context::AnalysisContext;
use crate::operator::{Operator, UnboundRelation};
use crate::parser::PlanParser;
use crate::plan::{Plan, PlanNode, PlanNodeRef};
use crate::rewrite::{MatchOrder, RewriteAnalyzer};
use crate::rules::BindRelationRule;
use crate::session::{SessionVariables, DEFAULT_CATALOG};

/// Parser stand-in that answers from a canned text-to-plan table. Plans are
/// shared by `Arc`, which is safe since plan nodes are immutable.
#[derive(Default)]
pub struct CannedParser {
    plans: HashMap<String, PlanNodeRef>,
}

impl CannedParser {
    pub fn with_plan<S: Into<String>>(mut self, sql: S, plan: &Plan) -> Self {
        self.plans.insert(sql.into(), plan.root());
        self
    }
}

impl PlanParser for CannedParser {
    fn parse(&self, sql: &str) -> crate::error::AnalysisResult<Plan> {
        self.plans
            .get(sql)
            .map(|root| Plan::new(root.clone()))
            .ok_or_else(|| {
                crate::error::AnalyzerError::Parse(format!("unexpected sql: {}", sql))
            })
    }
}

fn plain_columns() -> Vec<Column> {
    vec![
        Column::new("id", DataType::Int64),
        Column::new("amount", DataType::Int64),
    ]
}

fn marked_columns() -> Vec<Column> {
    vec![
        Column::new("id", DataType::Int64),
        Column::new("amount", DataType::Int64),
        Column::hidden(DELETE_MARKER, DataType::Int8),
    ]
}

/// Catalog with one table per interesting shape, all under `internal.sales`:
///
/// - `orders`: native, no hidden columns, merge-on-write
/// - `t`: native, delete marker, merge-on-read, partitions `p1`/`p2` and
///   temporary partition `tp1`
/// - `t_mow`: native, delete marker, merge-on-write
/// - `hive_t` / `jdbc_t` / `search_t` / `schema_t`: one per external kind
/// - `v_orders`: view defined as `SELECT * FROM orders`
pub fn test_catalog() -> Arc<MemoryCatalog> {
    let catalog = MemoryCatalog::new();

    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "orders",
            TableKind::Native(NativeMeta::new(plain_columns(), MergePolicy::MergeOnWrite)),
        ),
    );
    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "t",
            TableKind::Native(
                NativeMeta::new(marked_columns(), MergePolicy::MergeOnRead)
                    .add_partition(Partition::new(PartitionId(1), "p1"))
                    .add_partition(Partition::new(PartitionId(2), "p2"))
                    .add_temp_partition(Partition::new(PartitionId(3), "tp1")),
            ),
        ),
    );
    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "t_mow",
            TableKind::Native(NativeMeta::new(
                marked_columns(),
                MergePolicy::MergeOnWrite,
            )),
        ),
    );
    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "hive_t",
            TableKind::HiveExternal {
                columns: plain_columns(),
            },
        ),
    );
    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "jdbc_t",
            TableKind::JdbcExternal {
                columns: plain_columns(),
            },
        ),
    );
    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "search_t",
            TableKind::SearchExternal {
                columns: plain_columns(),
            },
        ),
    );
    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "schema_t",
            TableKind::Schema {
                columns: plain_columns(),
            },
        ),
    );
    catalog.register_table(
        DEFAULT_CATALOG,
        "sales",
        TableHandle::new(
            "v_orders",
            TableKind::View {
                definition: "SELECT * FROM orders".to_string(),
                columns: plain_columns(),
            },
        ),
    );

    Arc::new(catalog)
}

pub fn test_session() -> SessionVariables {
    SessionVariables::new(DEFAULT_CATALOG, "sales")
}

pub fn test_context(session: SessionVariables) -> AnalysisContext {
    let catalog = test_catalog();
    // A view over `orders` is enough: its definition is parsed through this
    // canned table during expansion.
    let inner = unbound_plan(vec!["orders"]);
    let parser = CannedParser::default().with_plan("SELECT * FROM orders", &inner);
    AnalysisContext::new(session, catalog, Arc::new(parser))
}

/// Single unbound relation as a one-node plan.
pub fn unbound_plan<S: Into<String>>(name_parts: Vec<S>) -> Plan {
    plan_of(Operator::UnboundRelation(UnboundRelation::new(name_parts)))
}

pub fn plan_of(operator: Operator) -> Plan {
    Plan::new(Arc::new(PlanNode::new(1, operator, vec![])))
}

pub fn plan_with_input(operator: Operator, input: PlanNodeRef) -> Plan {
    Plan::new(Arc::new(PlanNode::new(2, operator, vec![input])))
}

/// Rewrite analyzer wired with the bind rule and the fixture catalog.
pub fn build_analyzer_for_test(plan: Plan, context: AnalysisContext) -> RewriteAnalyzer {
    RewriteAnalyzer::new(
        MatchOrder::TopDown,
        usize::MAX,
        vec![BindRelationRule::new().into()],
        plan,
        context,
    )
    .unwrap()
}
