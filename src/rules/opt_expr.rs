use std::fmt::{Debug, Formatter};
use std::ops::Index;

use anyhow::anyhow;

use crate::analyzer::{Analyzer, AnalyzerExpr};
use crate::error::AnalysisResult;
use crate::operator::Operator;
use crate::plan::PlanNodeRef;
use crate::rules::OptExprNode::{ExprHandleNode, GroupHandleNode, OperatorNode};
use crate::rules::OptExprVec;

/// One node in [`OptExpression`].
pub enum OptExprNode<A: Analyzer> {
    OperatorNode(Operator),
    ExprHandleNode(A::ExprHandle),
    GroupHandleNode(A::GroupHandle),
}

impl<A: Analyzer> Clone for OptExprNode<A> {
    fn clone(&self) -> Self {
        match self {
            OperatorNode(op) => OperatorNode(op.clone()),
            ExprHandleNode(handle) => ExprHandleNode(handle.clone()),
            GroupHandleNode(handle) => GroupHandleNode(handle.clone()),
        }
    }
}

impl<A: Analyzer> Debug for OptExprNode<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatorNode(op) => write!(f, "OperatorNode: {:?}", op),
            ExprHandleNode(handle) => write!(f, "ExprHandleNode: {:?}", handle),
            GroupHandleNode(handle) => write!(f, "GroupHandleNode: {:?}", handle),
        }
    }
}

impl<A: Analyzer> From<Operator> for OptExprNode<A> {
    fn from(t: Operator) -> Self {
        OperatorNode(t)
    }
}

/// Expression tree matched by a rule pattern; used as rule input and output.
///
/// When used as input, `node` is a handle into the analyzer's internal plan
/// representation. When used as output, freshly created nodes are
/// [`Operator`]s while reused original nodes stay handles.
pub struct OptExpression<A: Analyzer> {
    node: OptExprNode<A>,
    inputs: OptExprVec<A>,
}

impl<A: Analyzer> Clone for OptExpression<A> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            inputs: self.inputs.clone(),
        }
    }
}

impl<A: Analyzer> OptExpression<A> {
    pub fn with_operator<I>(operator: Operator, inputs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self {
            node: OperatorNode(operator),
            inputs: inputs.into_iter().collect(),
        }
    }

    pub fn with_expr_handle<I>(handle: A::ExprHandle, inputs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self {
            node: ExprHandleNode(handle),
            inputs: inputs.into_iter().collect(),
        }
    }

    /// Creates an opt expression with group handle.
    ///
    /// A group handle can only be a leaf node, so it never has inputs.
    pub fn with_group_handle(handle: A::GroupHandle) -> Self {
        Self {
            node: GroupHandleNode(handle),
            inputs: vec![],
        }
    }

    /// Deep-copy a bound plan subtree into operator nodes, e.g. an expanded
    /// view body about to be spliced under an alias.
    pub fn from_plan_node(node: &PlanNodeRef) -> Self {
        Self::with_operator(
            node.operator().clone(),
            node.inputs().iter().map(Self::from_plan_node),
        )
    }

    pub fn clone_with_inputs(&self, operator: Operator) -> Self {
        Self {
            node: OperatorNode(operator),
            inputs: self.inputs.clone(),
        }
    }

    pub fn inputs(&self) -> &[Self] {
        &self.inputs
    }

    pub fn node(&self) -> &OptExprNode<A> {
        &self.node
    }

    pub fn get_operator<'a>(&'a self, analyzer: &'a A) -> AnalysisResult<&'a Operator> {
        match &self.node {
            ExprHandleNode(handle) => Ok(analyzer.expr_at(handle.clone()).operator()),
            OperatorNode(op) => Ok(op),
            GroupHandleNode(_) => {
                Err(anyhow!("can't get operator from group handle").into())
            }
        }
    }
}

impl<A: Analyzer> Debug for OptExpression<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format(f, 0)
    }
}

/// Creates a leaf opt expression from operator.
impl<A: Analyzer> From<Operator> for OptExpression<A> {
    fn from(op: Operator) -> Self {
        OptExpression::<A>::with_operator(op, vec![])
    }
}

impl<A: Analyzer> OptExpression<A> {
    fn format(&self, f: &mut Formatter<'_>, level: usize) -> std::fmt::Result {
        let prefix = if level > 0 {
            let mut buffer = String::with_capacity(2 * level);
            for _ in 0..(level - 1) {
                buffer.push_str("  ");
            }
            buffer.push_str("--");
            buffer
        } else {
            "".to_string()
        };

        match &self.node {
            ExprHandleNode(handle) => writeln!(f, "{}{:?}", prefix, handle),
            GroupHandleNode(handle) => writeln!(f, "{}{:?}", prefix, handle),
            OperatorNode(operator) => writeln!(f, "{}{:?}", prefix, operator),
        }?;
        for input in &self.inputs {
            input.format(f, level + 1)?;
        }

        Ok(())
    }
}

/// Index of inputs.
impl<A: Analyzer> Index<usize> for OptExpression<A> {
    type Output = OptExpression<A>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.inputs[index]
    }
}
