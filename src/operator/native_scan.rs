use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::catalog::{PartitionId, TableHandle};
use crate::context::{IdGen, RelationId};
use crate::error::AnalysisResult;
use crate::expr::SlotRef;
use crate::operator::{materialize_slots, OperatorTrait};
use crate::properties::LogicalProperty;

/// Whether pre-aggregation may be pushed into a native scan.
///
/// Turned off with a reason when the scan's output still contains rows that
/// an implicit predicate filters out afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PreAggStatus {
    On,
    Off(String),
}

impl PreAggStatus {
    pub fn off<S: Into<String>>(reason: S) -> Self {
        PreAggStatus::Off(reason.into())
    }

    pub fn is_on(&self) -> bool {
        matches!(self, PreAggStatus::On)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            PreAggStatus::On => None,
            PreAggStatus::Off(reason) => Some(reason),
        }
    }
}

impl Display for PreAggStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PreAggStatus::On => write!(f, "On"),
            PreAggStatus::Off(reason) => write!(f, "Off({})", reason),
        }
    }
}

/// Scan over a native columnar table.
///
/// Output slots are allocated at construction, so the order scans are built
/// in is the order slot ids grow in.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeScan {
    relation_id: RelationId,
    table: Arc<TableHandle>,
    qualifier: Vec<String>,
    /// Validated subset of the table's partitions, empty for the whole
    /// table. Request order preserved, duplicates included.
    partitions: Vec<PartitionId>,
    hints: Vec<String>,
    pre_agg: PreAggStatus,
    output: Vec<SlotRef>,
}

impl NativeScan {
    /// Whole-table scan.
    pub fn new(
        relation_id: RelationId,
        table: Arc<TableHandle>,
        database: String,
        hints: Vec<String>,
        id_gen: &IdGen,
    ) -> Self {
        Self::with_partitions(relation_id, table, database, vec![], hints, id_gen)
    }

    /// Scan restricted to already-validated partition ids.
    pub fn with_partitions(
        relation_id: RelationId,
        table: Arc<TableHandle>,
        database: String,
        partitions: Vec<PartitionId>,
        hints: Vec<String>,
        id_gen: &IdGen,
    ) -> Self {
        let qualifier = vec![database];
        let output = materialize_slots(&table, &qualifier, id_gen);
        Self {
            relation_id,
            table,
            qualifier,
            partitions,
            hints,
            pre_agg: PreAggStatus::On,
            output,
        }
    }

    /// Same scan with pre-aggregation disabled. Slots are kept as-is.
    pub fn with_pre_agg_off<S: Into<String>>(mut self, reason: S) -> Self {
        self.pre_agg = PreAggStatus::off(reason);
        self
    }

    pub fn relation_id(&self) -> RelationId {
        self.relation_id
    }

    pub fn table(&self) -> &Arc<TableHandle> {
        &self.table
    }

    pub fn qualifier(&self) -> &[String] {
        &self.qualifier
    }

    pub fn partitions(&self) -> &[PartitionId] {
        &self.partitions
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn pre_agg(&self) -> &PreAggStatus {
        &self.pre_agg
    }

    pub fn output(&self) -> &[SlotRef] {
        &self.output
    }
}

impl OperatorTrait for NativeScan {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        _handle: A::ExprHandle,
        _analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        Ok(LogicalProperty::new(self.output.clone()))
    }
}

impl Display for NativeScan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NativeScan {{ table: {}.{}",
            self.qualifier.join("."),
            self.table.name()
        )?;
        if !self.partitions.is_empty() {
            let ids: Vec<String> =
                self.partitions.iter().map(|p| p.to_string()).collect();
            write!(f, ", partitions: [{}]", ids.join(", "))?;
        }
        if !self.pre_agg.is_on() {
            write!(f, ", pre_agg: {}", self.pre_agg)?;
        }
        write!(f, " }}")
    }
}
