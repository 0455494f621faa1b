//! Analysis rules.
//!
//! A rule defines a semantic-preserving rewrite of the plan tree: the
//! rewrite engine locates a sub tree matching the rule's pattern, hands the
//! rule an [`OptExpression`] view of it, and substitutes whatever the rule
//! produces. The engine drives iteration and fixpoint detection; rules only
//! describe transformations, which keeps them independent of the concrete
//! engine implementation.
//!
//! Binding is the sole rule family in this crate: [`BindRelationRule`]
//! rewrites every [`crate::operator::UnboundRelation`] leaf into a bound
//! scan/consumer subtree. Its pattern is a single leaf:
//! ```no
//! static ref BIND_RELATION_PATTERN: Pattern =
//!     Pattern::new_leaf(|op| matches!(op, Operator::UnboundRelation(_)));
//! ```

mod pattern;
pub use pattern::*;
mod opt_expr;
pub use opt_expr::*;
mod bind_relation;
pub use bind_relation::*;

use std::fmt::{Debug, Formatter};

use enum_dispatch::enum_dispatch;
use enumset::EnumSetType;
use std::convert::AsRef;
use strum_macros::AsRefStr;

use crate::analyzer::Analyzer;
use crate::error::AnalysisResult;

pub type OptExprVec<A> = Vec<OptExpression<A>>;

pub struct RuleResult<A: Analyzer> {
    exprs: OptExprVec<A>,
}

impl<A: Analyzer> Default for RuleResult<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Analyzer> RuleResult<A> {
    pub fn new() -> Self {
        Self { exprs: vec![] }
    }

    pub fn add(&mut self, new_expr: OptExpression<A>) {
        self.exprs.push(new_expr);
    }

    pub fn results(self) -> impl Iterator<Item = OptExpression<A>> {
        self.exprs.into_iter()
    }
}

/// A rule should only focus on providing equivalent transformations of plan
/// sub trees.
#[enum_dispatch(RuleImpl)]
pub trait Rule {
    /// Apply the rule to a matched sub tree.
    fn apply<A: Analyzer>(
        &self,
        input: OptExpression<A>,
        ctx: &A,
        result: &mut RuleResult<A>,
    ) -> AnalysisResult<()>;

    /// Pattern for rule.
    fn pattern(&self) -> &Pattern;

    /// Identifies the rule, to avoid applying the same rule repeatedly to
    /// the same expression.
    fn rule_id(&self) -> RuleId;

    /// Relative application order of rules.
    fn rule_promise(&self) -> RulePromise;
}

#[enum_dispatch]
#[derive(Clone, AsRefStr)]
pub enum RuleImpl {
    BindRelationRule,
}

#[derive(EnumSetType, Debug)]
pub enum RuleId {
    BindRelation,
}

pub enum RulePromise {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Debug for RuleImpl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_ref())
    }
}
