use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::context::{CteId, RelationId};
use crate::error::{AnalysisResult, AnalyzerError};
use crate::operator::OperatorTrait;
use crate::plan::Plan;
use crate::properties::LogicalProperty;

/// Reference to an already-analyzed common table expression.
///
/// Every reference to the same CTE gets its own consumer node and relation
/// id, but all consumers share the identical bound body (`Arc`), so reuse
/// never repeats the body's analysis side effects.
#[derive(Clone, Debug, PartialEq)]
pub struct CteConsumer {
    relation_id: RelationId,
    cte_id: CteId,
    name: String,
    plan: Arc<Plan>,
}

impl CteConsumer {
    pub fn new(
        relation_id: RelationId,
        cte_id: CteId,
        name: impl Into<String>,
        plan: Arc<Plan>,
    ) -> Self {
        Self {
            relation_id,
            cte_id,
            name: name.into(),
            plan,
        }
    }

    pub fn relation_id(&self) -> RelationId {
        self.relation_id
    }

    pub fn cte_id(&self) -> CteId {
        self.cte_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared bound body this consumer references.
    pub fn plan(&self) -> &Arc<Plan> {
        &self.plan
    }
}

impl OperatorTrait for CteConsumer {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        _handle: A::ExprHandle,
        _analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        self.plan
            .root()
            .logical_prop()
            .cloned()
            .ok_or_else(|| {
                AnalyzerError::SchemaConsistency(format!(
                    "cached body of CTE [{}] has no materialized output",
                    self.name
                ))
            })
    }
}

impl Display for CteConsumer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CteConsumer {{ name: {}, cte_id: {} }}",
            self.name, self.cte_id
        )
    }
}
