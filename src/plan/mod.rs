//! Immutable plan trees.
//!
//! A plan is a single-root dag of `Arc`'d nodes. Rewrites never mutate a
//! node in place; replacing a node produces a new tree, which keeps the
//! fixpoint detection of the rewrite driver honest.

use std::collections::HashSet;
use std::mem::swap;
use std::sync::Arc;

mod explain;
pub use explain::*;

use crate::operator::Operator;
use crate::properties::LogicalProperty;

pub type PlanNodeId = u32;

pub type PlanNodeRef = Arc<PlanNode>;

#[derive(Default)]
pub struct PlanNodeIdGen {
    next: PlanNodeId,
}

impl PlanNodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> PlanNodeId {
        self.next += 1;
        self.next
    }
}

/// One node in a plan.
#[derive(Debug)]
pub struct PlanNode {
    id: PlanNodeId,
    operator: Operator,
    inputs: Vec<PlanNodeRef>,
    logical_prop: Option<LogicalProperty>,
}

/// The `eq` ignores `id`.
impl PartialEq for PlanNode {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator
            && self.inputs == other.inputs
            && self.logical_prop == other.logical_prop
    }
}

impl PlanNode {
    pub fn new(id: PlanNodeId, operator: Operator, inputs: Vec<PlanNodeRef>) -> Self {
        Self {
            id,
            operator,
            inputs,
            logical_prop: None,
        }
    }

    pub fn id(&self) -> PlanNodeId {
        self.id
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn inputs(&self) -> &[PlanNodeRef] {
        &self.inputs
    }

    pub fn logical_prop(&self) -> Option<&LogicalProperty> {
        self.logical_prop.as_ref()
    }
}

pub struct PlanNodeBuilder {
    plan_node: PlanNode,
}

impl PlanNodeBuilder {
    pub fn new(id: PlanNodeId, operator: &Operator) -> Self {
        Self {
            plan_node: PlanNode {
                id,
                operator: operator.clone(),
                inputs: vec![],
                logical_prop: None,
            },
        }
    }

    pub fn add_inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = PlanNodeRef>,
    {
        self.plan_node.inputs.extend(inputs);
        self
    }

    pub fn with_logical_prop(mut self, logical_prop: Option<LogicalProperty>) -> Self {
        self.plan_node.logical_prop = logical_prop;
        self
    }

    pub fn build(self) -> PlanNode {
        self.plan_node
    }
}

/// A query plan: a single-root dag.
#[derive(PartialEq, Debug)]
pub struct Plan {
    root: PlanNodeRef,
}

impl Plan {
    pub fn new(root: PlanNodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> PlanNodeRef {
        self.root.clone()
    }

    pub fn bfs_iterator(&self) -> impl Iterator<Item = PlanNodeRef> {
        let mut visited = HashSet::new();
        visited.insert(self.root.id);

        BfsPlanNodeIter {
            cur_level: vec![self.root.clone()],
            next_level: vec![],
            visited,
        }
    }

    /// Whether any unresolved relation is still reachable.
    pub fn contains_unbound(&self) -> bool {
        self.bfs_iterator()
            .any(|node| !node.operator().is_bound())
    }
}

/// Breadth first iterator of a single-root dag plan.
struct BfsPlanNodeIter {
    visited: HashSet<PlanNodeId>,
    cur_level: Vec<PlanNodeRef>,
    next_level: Vec<PlanNodeRef>,
}

impl Iterator for BfsPlanNodeIter {
    type Item = PlanNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur_level.is_empty() {
            swap(&mut self.cur_level, &mut self.next_level);
        }

        if let Some(p) = self.cur_level.pop() {
            for input in &p.inputs {
                if !self.visited.contains(&input.id) {
                    self.next_level.push(input.clone());
                    self.visited.insert(input.id);
                }
            }

            Some(p)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::UnboundRelation;

    fn unbound(id: PlanNodeId, name: &str) -> PlanNodeRef {
        Arc::new(PlanNode::new(
            id,
            Operator::UnboundRelation(UnboundRelation::new(vec![name])),
            vec![],
        ))
    }

    #[test]
    fn test_bfs_visits_every_node_once() {
        let left = unbound(1, "t1");
        let right = unbound(2, "t2");
        let root = Arc::new(PlanNode::new(
            3,
            Operator::Join(crate::operator::Join::new(
                crate::operator::JoinType::Cross,
                None,
            )),
            vec![left, right],
        ));
        let plan = Plan::new(root);

        let ids: Vec<PlanNodeId> = plan.bfs_iterator().map(|n| n.id()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], 3);
        assert!(plan.contains_unbound());
    }

    #[test]
    fn test_plan_node_eq_ignores_id() {
        let a = PlanNode::new(
            1,
            Operator::UnboundRelation(UnboundRelation::new(vec!["t"])),
            vec![],
        );
        let b = PlanNode::new(
            9,
            Operator::UnboundRelation(UnboundRelation::new(vec!["t"])),
            vec![],
        );
        assert_eq!(a, b);
    }
}
