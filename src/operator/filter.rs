use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;

use crate::analyzer::{Analyzer, AnalyzerExpr, AnalyzerGroup};
use crate::error::AnalysisResult;
use crate::expr::Expr;
use crate::operator::OperatorTrait;
use crate::properties::LogicalProperty;

/// Row filter over a single input. The binder only ever manufactures the
/// implicit delete-marker conjunct, but the node carries an arbitrary
/// conjunct list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Filter {
    conjuncts: Vec<Expr>,
}

impl Filter {
    pub fn new(conjuncts: Vec<Expr>) -> Self {
        Self { conjuncts }
    }

    pub fn conjuncts(&self) -> &[Expr] {
        &self.conjuncts
    }
}

impl OperatorTrait for Filter {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        handle: A::ExprHandle,
        analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        let input_handle = analyzer.expr_at(handle).input_at(0, analyzer);
        analyzer
            .group_at(input_handle)
            .logical_prop()
            .cloned()
            .ok_or_else(|| anyhow!("filter input has no materialized output").into())
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let predicates: Vec<String> =
            self.conjuncts.iter().map(|c| c.to_string()).collect();
        write!(f, "Filter {{ predicates: [{}] }}", predicates.join(", "))
    }
}
