use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;

use crate::analyzer::{Analyzer, AnalyzerExpr, AnalyzerGroup};
use crate::error::AnalysisResult;
use crate::operator::OperatorTrait;
use crate::properties::LogicalProperty;

/// Aliasing wrapper around an expanded view body.
///
/// Output slots are the child's with the qualifier replaced by the view's
/// qualified name, so outer column references resolve through the name the
/// view was declared with. Slot ids are preserved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubqueryAlias {
    alias: Vec<String>,
}

impl SubqueryAlias {
    pub fn new(alias: Vec<String>) -> Self {
        Self { alias }
    }

    pub fn alias(&self) -> &[String] {
        &self.alias
    }

    pub fn alias_name(&self) -> String {
        self.alias.join(".")
    }
}

impl OperatorTrait for SubqueryAlias {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        handle: A::ExprHandle,
        analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        let input_handle = analyzer.expr_at(handle).input_at(0, analyzer);
        let input_prop = analyzer
            .group_at(input_handle)
            .logical_prop()
            .ok_or_else(|| {
                anyhow!("subquery alias input has no materialized output")
            })?;
        let output = input_prop
            .output()
            .iter()
            .map(|slot| slot.with_qualifier(self.alias.clone()))
            .collect();
        Ok(LogicalProperty::new(output))
    }
}

impl Display for SubqueryAlias {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SubqueryAlias {{ alias: {} }}", self.alias_name())
    }
}
