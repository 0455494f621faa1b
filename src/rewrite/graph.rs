use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use petgraph::prelude::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use crate::analyzer::{AnalyzerExpr, AnalyzerGroup, ExprHandle, GroupHandle};
use crate::operator::Operator;
use crate::plan::{Plan, PlanNodeBuilder, PlanNodeId, PlanNodeIdGen, PlanNodeRef};
use crate::properties::LogicalProperty;
use crate::rewrite::{MatchOrder, RewriteAnalyzer};

type RewriteGraph = StableGraph<RewriteNode, (), Directed, PlanNodeId>;
pub type RewriteNodeId = NodeIndex<PlanNodeId>;

pub struct RewriteNode {
    pub(super) id: RewriteNodeId,
    pub(super) operator: Operator,
    pub(super) logical_prop: Option<LogicalProperty>,
}

/// A plan as a single-root dag of graph nodes, edges pointing from operator
/// to input.
#[derive(Default)]
pub(super) struct PlanGraph {
    pub(super) graph: RewriteGraph,
    pub(super) root: RewriteNodeId,
}

impl PlanGraph {
    pub(super) fn nodes_iter(
        &self,
        match_order: MatchOrder,
    ) -> Box<dyn Iterator<Item = RewriteNodeId>> {
        match match_order {
            MatchOrder::TopDown => Box::new(self.top_down_node_iters()),
            MatchOrder::BottomUp => Box::new(self.bottom_up_node_iters()),
        }
    }

    /// Inputs of a node in left-to-right order. petgraph reports the most
    /// recently added edge first, hence the reverse.
    pub(super) fn children(&self, id: RewriteNodeId) -> Vec<RewriteNodeId> {
        let mut ids: Vec<RewriteNodeId> = self
            .graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect();
        ids.reverse();
        ids
    }

    /// Depth-first preorder from the root, children visited left to right,
    /// so the leftmost-deepest unresolved relation is always reached before
    /// anything to its right. Slot id allocation order depends on this, so
    /// it must stay deterministic.
    fn top_down_node_iters(&self) -> impl Iterator<Item = RewriteNodeId> {
        let mut ids = Vec::with_capacity(self.graph.node_count());
        let mut visited = HashSet::new();
        let mut stack = vec![self.root];
        visited.insert(self.root);

        while let Some(id) = stack.pop() {
            ids.push(id);
            for child in self.children(id).into_iter().rev() {
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }

        ids.into_iter()
    }

    /// Same order reversed: every node after all of its inputs.
    fn bottom_up_node_iters(&self) -> impl Iterator<Item = RewriteNodeId> {
        let ids: Vec<RewriteNodeId> = self.top_down_node_iters().collect();
        ids.into_iter().rev()
    }

    /// Swap one child of `parent` for another node, keeping child order.
    /// Edges are rebuilt left to right because relative order would
    /// otherwise drift with petgraph's most-recent-first reporting.
    pub(super) fn redirect_child(
        &mut self,
        parent: RewriteNodeId,
        from: RewriteNodeId,
        to: RewriteNodeId,
    ) {
        let children: Vec<RewriteNodeId> = self
            .children(parent)
            .into_iter()
            .map(|child| if child == from { to } else { child })
            .collect();

        let edges: Vec<_> = self
            .graph
            .edges_directed(parent, Direction::Outgoing)
            .map(|edge| edge.id())
            .collect();
        for edge in edges {
            self.graph.remove_edge(edge);
        }
        for child in children {
            self.graph.add_edge(parent, child, ());
        }
    }

    pub(super) fn to_plan(&self) -> Plan {
        let mut plan_node_id_gen = PlanNodeIdGen::new();
        let mut node_to_plan_node = HashMap::<RewriteNodeId, PlanNodeRef>::new();
        // Bottom up, so a node's inputs are always in the map already.
        for node_id in self.bottom_up_node_iters() {
            let node = &self.graph[node_id];
            let inputs: Vec<PlanNodeRef> = self
                .children(node_id)
                .iter()
                .map(|child| node_to_plan_node.get(child).unwrap().clone())
                .collect();

            let plan_node = PlanNodeBuilder::new(plan_node_id_gen.next(), &node.operator)
                .with_logical_prop(node.logical_prop.clone())
                .add_inputs(inputs)
                .build();
            node_to_plan_node.insert(node_id, Arc::new(plan_node));
        }

        node_to_plan_node
            .get(&self.root)
            .map(|plan_node| Plan::new(plan_node.clone()))
            .unwrap()
    }
}

impl AnalyzerGroup for RewriteNode {
    fn logical_prop(&self) -> Option<&LogicalProperty> {
        self.logical_prop.as_ref()
    }
}

impl AnalyzerExpr for RewriteNode {
    type A = RewriteAnalyzer;
    type InputHandle = RewriteNodeId;

    fn operator(&self) -> &Operator {
        &self.operator
    }

    fn inputs_len(&self, analyzer: &RewriteAnalyzer) -> usize {
        analyzer.graph.children(self.id).len()
    }

    fn input_at(&self, idx: usize, analyzer: &RewriteAnalyzer) -> RewriteNodeId {
        analyzer.graph.children(self.id)[idx]
    }
}

impl ExprHandle for RewriteNodeId {
    type A = RewriteAnalyzer;
}

impl GroupHandle for RewriteNodeId {
    type A = RewriteAnalyzer;
}
