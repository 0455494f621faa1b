use std::collections::HashMap;

use anyhow::anyhow;
use log::{debug, trace};
use petgraph::Direction;

use crate::analyzer::{Analyzer, AnalyzerExpr};
use crate::context::AnalysisContext;
use crate::error::AnalysisResult;
use crate::operator::{Operator, OperatorTrait};
use crate::plan::{Plan, PlanNodeId};
use crate::rewrite::binding::Binding;
use crate::rewrite::{PlanGraph, RewriteNode, RewriteNodeId};
use crate::rules::OptExprNode::{ExprHandleNode, GroupHandleNode, OperatorNode};
use crate::rules::{OptExpression, Rule, RuleImpl, RuleResult};

/// Match order of plan tree.
#[derive(Copy, Clone)]
pub enum MatchOrder {
    BottomUp,
    TopDown,
}

pub struct RewriteAnalyzer {
    match_order: MatchOrder,
    /// Max number of iteration
    max_iter_times: usize,
    rules: Vec<RuleImpl>,
    pub(super) graph: PlanGraph,
    context: AnalysisContext,
}

impl Analyzer for RewriteAnalyzer {
    type Expr = RewriteNode;
    type ExprHandle = RewriteNodeId;
    type Group = RewriteNode;
    type GroupHandle = RewriteNodeId;

    fn context(&self) -> &AnalysisContext {
        &self.context
    }

    fn group_at(&self, group_handle: RewriteNodeId) -> &RewriteNode {
        &self.graph.graph[group_handle]
    }

    fn expr_at(&self, expr_handle: RewriteNodeId) -> &RewriteNode {
        &self.graph.graph[expr_handle]
    }

    fn analyze(mut self) -> AnalysisResult<Plan> {
        for _times in 0..self.max_iter_times {
            // The plan no longer changes after iteration
            let mut fixed_point = true;
            let rules = self.rules.clone();
            let node_ids = self.graph.nodes_iter(self.match_order);
            'nodes: for node_id in node_ids {
                for rule in &rules {
                    trace!(
                        "trying to apply rule {:?} to expression {}",
                        rule,
                        self.expr_at(node_id).operator()
                    );
                    if self.apply_rule(rule, node_id)? {
                        debug!("plan changed by rule {:?}", rule);
                        fixed_point = false;
                        break 'nodes;
                    }
                }
            }

            if fixed_point {
                break;
            }
        }

        self.materialize_output()?;
        Ok(self.graph.to_plan())
    }

    fn analyze_nested(&self, plan: Plan) -> AnalysisResult<Plan> {
        RewriteAnalyzer::new(
            self.match_order,
            self.max_iter_times,
            self.rules.clone(),
            plan,
            self.context.nested(),
        )?
        .analyze()
    }
}

impl RewriteAnalyzer {
    pub fn new(
        match_order: MatchOrder,
        max_iter_times: usize,
        rules: Vec<RuleImpl>,
        plan: Plan,
        context: AnalysisContext,
    ) -> AnalysisResult<Self> {
        let mut analyzer = Self {
            match_order,
            max_iter_times,
            rules,
            graph: PlanGraph::default(),
            context,
        };
        analyzer.init_with_plan(plan)?;
        Ok(analyzer)
    }

    fn apply_rule(
        &mut self,
        rule: &RuleImpl,
        expr_handle: RewriteNodeId,
    ) -> AnalysisResult<bool> {
        let original_node_id = expr_handle;
        if let Some(opt_node) = Binding::new(expr_handle, rule.pattern(), self).next() {
            let mut results = RuleResult::new();
            rule.apply(opt_node, self, &mut results)?;

            let mut results = results.results();
            if let Some(new_expr) = results.next() {
                if results.next().is_some() {
                    return Err(anyhow!(
                        "rewrite rule should return no more than 1 result"
                    )
                    .into());
                }
                return self.replace_opt_expression(new_expr, original_node_id);
            }

            // No transformation generated.
            Ok(false)
        } else {
            Ok(false)
        }
    }

    /// Replace a sub tree with rule output.
    ///
    /// # Return
    ///
    /// Whether the graph changed.
    fn replace_opt_expression(
        &mut self,
        opt_node: OptExpression<RewriteAnalyzer>,
        origin_node_id: RewriteNodeId,
    ) -> AnalysisResult<bool> {
        let new_node_id = self.insert_opt_node(&opt_node)?;
        if new_node_id != origin_node_id {
            let parent_node_ids: Vec<RewriteNodeId> = self
                .graph
                .graph
                .neighbors_directed(origin_node_id, Direction::Incoming)
                .collect();
            for parent in parent_node_ids {
                self.graph.redirect_child(parent, origin_node_id, new_node_id);
            }
            self.graph.graph.remove_node(origin_node_id);

            if self.graph.root == origin_node_id {
                self.graph.root = new_node_id;
            }

            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn insert_opt_node(
        &mut self,
        opt_expr: &OptExpression<RewriteAnalyzer>,
    ) -> AnalysisResult<RewriteNodeId> {
        match opt_expr.node() {
            ExprHandleNode(expr_handle) => Ok(*expr_handle),
            GroupHandleNode(group_handle) => Ok(*group_handle),
            OperatorNode(operator) => {
                let input_node_ids: Vec<RewriteNodeId> = opt_expr
                    .inputs()
                    .iter()
                    .map(|input_expr| self.insert_opt_node(input_expr))
                    .collect::<AnalysisResult<Vec<RewriteNodeId>>>()?;

                let node = RewriteNode {
                    // Fake until the graph assigns the real index.
                    id: RewriteNodeId::default(),
                    operator: operator.clone(),
                    logical_prop: None,
                };

                let new_node_id = self.graph.graph.add_node(node);
                self.graph.graph[new_node_id].id = new_node_id;
                for input_node_id in input_node_ids {
                    self.graph.graph.add_edge(new_node_id, input_node_id, ());
                }

                self.try_derive_logical_prop(new_node_id)?;
                Ok(new_node_id)
            }
        }
    }

    /// Materialize the output of a node as soon as it and its inputs are
    /// bound. Skipped silently otherwise; the post-fixpoint pass picks up
    /// whatever is left.
    fn try_derive_logical_prop(&mut self, node_id: RewriteNodeId) -> AnalysisResult<()> {
        let operator = self.graph.graph[node_id].operator.clone();
        if !operator.is_bound() {
            return Ok(());
        }
        let inputs_ready = self
            .graph
            .children(node_id)
            .iter()
            .all(|child| self.graph.graph[*child].logical_prop.is_some());
        if !inputs_ready {
            return Ok(());
        }

        let logical_prop = operator.derive_logical_prop(node_id, &*self)?;
        self.graph.graph[node_id].logical_prop = Some(logical_prop);
        Ok(())
    }

    /// One eager bottom-up pass after fixpoint: every node must be bound by
    /// now, and every node gets its output slots.
    fn materialize_output(&mut self) -> AnalysisResult<()> {
        let node_ids: Vec<RewriteNodeId> =
            self.graph.nodes_iter(MatchOrder::BottomUp).collect();
        for node_id in node_ids {
            let operator = self.graph.graph[node_id].operator.clone();
            if let Operator::UnboundRelation(relation) = &operator {
                return Err(anyhow!(
                    "relation [{}] remains unbound after analysis reached fixpoint",
                    relation.table_name()
                )
                .into());
            }
            if self.graph.graph[node_id].logical_prop.is_none() {
                let logical_prop = operator.derive_logical_prop(node_id, &*self)?;
                self.graph.graph[node_id].logical_prop = Some(logical_prop);
            }
        }
        Ok(())
    }

    fn init_with_plan(&mut self, plan: Plan) -> AnalysisResult<()> {
        let mut node_id_map = HashMap::<PlanNodeId, RewriteNodeId>::new();

        // Reverse BFS: inputs are inserted before the nodes that use them.
        for plan_node in plan.bfs_iterator().collect::<Vec<_>>().into_iter().rev() {
            let inputs: Vec<OptExpression<RewriteAnalyzer>> = plan_node
                .inputs()
                .iter()
                .map(|input| {
                    OptExpression::with_expr_handle(node_id_map[&input.id()], vec![])
                })
                .collect();
            let opt_expr =
                OptExpression::with_operator(plan_node.operator().clone(), inputs);
            let node_id = self.insert_opt_node(&opt_expr)?;
            node_id_map.insert(plan_node.id(), node_id);
        }

        self.graph.root = node_id_map[&plan.root().id()];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogReader;
    use crate::context::IdGen;
    use crate::operator::NativeScan;
    use crate::test_utils::{
        build_analyzer_for_test, plan_of, test_catalog, test_context, test_session,
        unbound_plan,
    };

    fn analyzer_without_rules(plan: Plan) -> RewriteAnalyzer {
        RewriteAnalyzer::new(
            MatchOrder::TopDown,
            usize::MAX,
            vec![],
            plan,
            test_context(test_session()),
        )
        .unwrap()
    }

    #[test]
    fn test_unbound_relation_surviving_fixpoint_is_an_error() {
        let err = analyzer_without_rules(unbound_plan(vec!["orders"]))
            .analyze()
            .unwrap_err();
        assert!(err.to_string().contains("orders"));
        assert!(err.to_string().contains("unbound"));
    }

    #[test]
    fn test_bound_plan_round_trips_with_output_materialized() {
        let catalog = test_catalog();
        let table = catalog
            .resolve_table("internal", "sales", "orders")
            .unwrap();
        let id_gen = IdGen::default();
        let scan = NativeScan::new(
            id_gen.next_relation_id(),
            table,
            "sales".to_string(),
            vec![],
            &id_gen,
        );

        let bound = analyzer_without_rules(plan_of(Operator::NativeScan(scan.clone())))
            .analyze()
            .unwrap();
        let root = bound.root();
        assert_eq!(root.operator(), &Operator::NativeScan(scan));
        // Materialization fills in the property no rule derived.
        let output = root.logical_prop().unwrap().output();
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn test_analysis_reaches_fixpoint_and_binds_every_leaf() {
        let bound =
            build_analyzer_for_test(unbound_plan(vec!["orders"]), test_context(test_session()))
                .analyze()
                .unwrap();
        assert!(!bound.contains_unbound());
        assert!(bound
            .bfs_iterator()
            .all(|node| node.logical_prop().is_some()));
    }

    #[test]
    fn test_nested_analysis_shares_the_id_namespace() {
        let context = test_context(test_session());
        let outer = build_analyzer_for_test(unbound_plan(vec!["orders"]), context);
        let nested_bound = outer.analyze_nested(unbound_plan(vec!["t_mow"])).unwrap();
        let bound = outer.analyze().unwrap();

        let nested_scan = nested_bound.root();
        let nested_scan = nested_scan.inputs()[0].operator().as_native_scan().unwrap();
        let outer_scan = bound.root();
        let outer_scan = outer_scan.operator().as_native_scan().unwrap();
        // Ids allocated across the two passes never collide.
        assert_ne!(nested_scan.relation_id(), outer_scan.relation_id());
    }
}
