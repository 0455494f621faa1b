//! Analyzer interface.
//!
//! Rules are written against this trait rather than a concrete engine, so
//! the same rule set can run in the fixpoint rewrite analyzer and any future
//! memo-based engine. The `group`/`group expression` vocabulary is borrowed
//! from cascades-style optimizers; in the rewrite analyzer both are simply a
//! node in the plan graph.

use std::fmt::Debug;

use crate::context::AnalysisContext;
use crate::error::AnalysisResult;
use crate::operator::Operator;
use crate::plan::Plan;
use crate::properties::LogicalProperty;

pub trait Analyzer: Sized {
    type GroupHandle: GroupHandle<A = Self>;
    type ExprHandle: ExprHandle<A = Self>;
    type Group: AnalyzerGroup;
    type Expr: AnalyzerExpr<A = Self, InputHandle = Self::GroupHandle>;

    /// Statement state threaded into every rule application.
    fn context(&self) -> &AnalysisContext;
    fn group_at(&self, group_handle: Self::GroupHandle) -> &Self::Group;
    fn expr_at(&self, expr_handle: Self::ExprHandle) -> &Self::Expr;

    /// Entry point: drive the rule set to fixpoint and materialize output
    /// properties.
    fn analyze(self) -> AnalysisResult<Plan>;

    /// Run an independent nested analysis pass over `plan` to fixpoint, in a
    /// child context with its own node-identity namespace. Used for view
    /// expansion; mutually recursive with the bind rule.
    fn analyze_nested(&self, plan: Plan) -> AnalysisResult<Plan>;
}

pub trait AnalyzerExpr {
    type A: Analyzer;
    type InputHandle: GroupHandle;

    fn operator(&self) -> &Operator;
    fn inputs_len(&self, analyzer: &Self::A) -> usize;
    fn input_at(&self, idx: usize, analyzer: &Self::A) -> Self::InputHandle;
}

pub trait AnalyzerGroup {
    /// `None` while the node (or one of its inputs) is still unbound.
    fn logical_prop(&self) -> Option<&LogicalProperty>;
}

pub trait ExprHandle: Clone + Debug {
    type A: Analyzer<ExprHandle = Self>;
}

pub trait GroupHandle: Clone + Debug {
    type A: Analyzer<GroupHandle = Self>;
}
