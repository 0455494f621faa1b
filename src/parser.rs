//! Parser collaborator interface.

use crate::error::AnalysisResult;
use crate::plan::Plan;

/// Turns SQL text into an unbound plan tree.
///
/// The real parser lives outside this crate; binding only needs it when a
/// view's stored definition must be re-parsed during expansion.
pub trait PlanParser: Send + Sync {
    fn parse(&self, sql: &str) -> AnalysisResult<Plan>;
}

/// Parser stand-in for sessions that never expand views.
pub struct NullParser;

impl PlanParser for NullParser {
    fn parse(&self, sql: &str) -> AnalysisResult<Plan> {
        Err(crate::error::AnalyzerError::Parse(format!(
            "no parser configured, cannot parse: {}",
            sql
        )))
    }
}
