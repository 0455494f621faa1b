use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;

use crate::analyzer::{Analyzer, AnalyzerExpr, AnalyzerGroup};
use crate::error::AnalysisResult;
use crate::expr::Expr;
use crate::operator::OperatorTrait;
use crate::properties::LogicalProperty;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JoinType {
    Inner,
    Cross,
}

/// Logical join. Binding never creates joins, but they appear in parsed
/// plans above unresolved relations, so output derivation (left slots then
/// right slots) lives here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Join {
    join_type: JoinType,
    condition: Option<Expr>,
}

impl Join {
    pub fn new(join_type: JoinType, condition: Option<Expr>) -> Self {
        Self {
            join_type,
            condition,
        }
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }
}

impl OperatorTrait for Join {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        handle: A::ExprHandle,
        analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        let expr = analyzer.expr_at(handle.clone());
        let left = analyzer
            .group_at(expr.input_at(0, analyzer))
            .logical_prop()
            .ok_or_else(|| anyhow!("join left input has no materialized output"))?;
        let right = analyzer
            .group_at(expr.input_at(1, analyzer))
            .logical_prop()
            .ok_or_else(|| anyhow!("join right input has no materialized output"))?;

        let mut output = left.output().to_vec();
        output.extend_from_slice(right.output());
        Ok(LogicalProperty::new(output))
    }
}

impl Display for Join {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Join {{ type: {:?}", self.join_type)?;
        if let Some(condition) = &self.condition {
            write!(f, ", on: {}", condition)?;
        }
        write!(f, " }}")
    }
}
