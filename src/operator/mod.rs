//! Relational operators produced by binding.
//!
//! Everything here is logical: binding happens long before physical plan
//! selection, so there is no physical operator family in this crate. Each
//! operator is immutable once constructed; rewriting a plan always builds
//! new nodes.

mod unbound;
pub use unbound::*;
mod native_scan;
pub use native_scan::*;
mod external;
pub use external::*;
mod filter;
pub use filter::*;
mod subquery_alias;
pub use subquery_alias::*;
mod cte_consumer;
pub use cte_consumer::*;
mod join;
pub use join::*;

use std::fmt::{self, Display, Formatter};

use enum_as_inner::EnumAsInner;
use enum_dispatch::enum_dispatch;

use crate::analyzer::Analyzer;
use crate::catalog::TableHandle;
use crate::context::IdGen;
use crate::error::AnalysisResult;
use crate::expr::SlotRef;
use crate::properties::LogicalProperty;

/// Closed set of plan operators the binder produces or consumes.
#[derive(Clone, Debug, PartialEq, EnumAsInner)]
#[enum_dispatch]
pub enum Operator {
    UnboundRelation(UnboundRelation),
    NativeScan(NativeScan),
    FileScan(FileScan),
    JdbcScan(JdbcScan),
    SearchScan(SearchScan),
    SchemaScan(SchemaScan),
    Filter(Filter),
    SubqueryAlias(SubqueryAlias),
    CteConsumer(CteConsumer),
    Join(Join),
}

impl Operator {
    /// Whether this operator has been resolved against the catalog. Only
    /// bound operators can derive logical properties.
    pub fn is_bound(&self) -> bool {
        !matches!(self, Operator::UnboundRelation(_))
    }
}

#[enum_dispatch(Operator)]
pub trait OperatorTrait {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        handle: A::ExprHandle,
        analyzer: &A,
    ) -> AnalysisResult<LogicalProperty>;
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operator::UnboundRelation(op) => write!(f, "{}", op),
            Operator::NativeScan(op) => write!(f, "{}", op),
            Operator::FileScan(op) => write!(f, "{}", op),
            Operator::JdbcScan(op) => write!(f, "{}", op),
            Operator::SearchScan(op) => write!(f, "{}", op),
            Operator::SchemaScan(op) => write!(f, "{}", op),
            Operator::Filter(op) => write!(f, "{}", op),
            Operator::SubqueryAlias(op) => write!(f, "{}", op),
            Operator::CteConsumer(op) => write!(f, "{}", op),
            Operator::Join(op) => write!(f, "{}", op),
        }
    }
}

/// Allocate output slots for every column of `table`, hidden ones included.
/// Slot qualifiers are `qualifier + table name`.
pub(crate) fn materialize_slots(
    table: &TableHandle,
    qualifier: &[String],
    id_gen: &IdGen,
) -> Vec<SlotRef> {
    let mut slot_qualifier = qualifier.to_vec();
    slot_qualifier.push(table.name().to_string());
    table
        .columns()
        .iter()
        .map(|column| {
            SlotRef::new(
                id_gen.next_slot_id(),
                slot_qualifier.clone(),
                column.name(),
                column.data_type().clone(),
                column.is_hidden(),
            )
        })
        .collect()
}
