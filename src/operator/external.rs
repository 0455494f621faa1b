//! Scan variants for non-native storage kinds.
//!
//! These all share the same shape: a relation id, the borrowed table handle
//! and the single-element database qualifier. No partition or delete-marker
//! logic applies to any of them.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::catalog::TableHandle;
use crate::context::{IdGen, RelationId};
use crate::error::AnalysisResult;
use crate::expr::SlotRef;
use crate::operator::{materialize_slots, OperatorTrait};
use crate::properties::LogicalProperty;

/// Scan over a Hive-metastore external table.
#[derive(Clone, Debug, PartialEq)]
pub struct FileScan {
    relation_id: RelationId,
    table: Arc<TableHandle>,
    qualifier: Vec<String>,
    output: Vec<SlotRef>,
}

impl FileScan {
    pub fn new(
        relation_id: RelationId,
        table: Arc<TableHandle>,
        database: String,
        id_gen: &IdGen,
    ) -> Self {
        let qualifier = vec![database];
        let output = materialize_slots(&table, &qualifier, id_gen);
        Self {
            relation_id,
            table,
            qualifier,
            output,
        }
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

    pub fn output(&self) -> &[SlotRef] {
        &self.output
    }
}

impl OperatorTrait for FileScan {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        _handle: A::ExprHandle,
        _analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        Ok(LogicalProperty::new(self.output.clone()))
    }
}

impl Display for FileScan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FileScan {{ table: {}.{} }}",
            self.qualifier.join("."),
            self.table.name()
        )
    }
}

/// Scan over a generic JDBC external table.
#[derive(Clone, Debug, PartialEq)]
pub struct JdbcScan {
    relation_id: RelationId,
    table: Arc<TableHandle>,
    qualifier: Vec<String>,
    output: Vec<SlotRef>,
}

impl JdbcScan {
    pub fn new(
        relation_id: RelationId,
        table: Arc<TableHandle>,
        database: String,
        id_gen: &IdGen,
    ) -> Self {
        let qualifier = vec![database];
        let output = materialize_slots(&table, &qualifier, id_gen);
        Self {
            relation_id,
            table,
            qualifier,
            output,
        }
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

    pub fn output(&self) -> &[SlotRef] {
        &self.output
    }
}

impl OperatorTrait for JdbcScan {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        _handle: A::ExprHandle,
        _analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        Ok(LogicalProperty::new(self.output.clone()))
    }
}

impl Display for JdbcScan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JdbcScan {{ table: {}.{} }}",
            self.qualifier.join("."),
            self.table.name()
        )
    }
}

/// Scan over a search-index external table.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchScan {
    relation_id: RelationId,
    table: Arc<TableHandle>,
    qualifier: Vec<String>,
    output: Vec<SlotRef>,
}

impl SearchScan {
    pub fn new(
        relation_id: RelationId,
        table: Arc<TableHandle>,
        database: String,
        id_gen: &IdGen,
    ) -> Self {
        let qualifier = vec![database];
        let output = materialize_slots(&table, &qualifier, id_gen);
        Self {
            relation_id,
            table,
            qualifier,
            output,
        }
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

    pub fn output(&self) -> &[SlotRef] {
        &self.output
    }
}

impl OperatorTrait for SearchScan {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        _handle: A::ExprHandle,
        _analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        Ok(LogicalProperty::new(self.output.clone()))
    }
}

impl Display for SearchScan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchScan {{ table: {}.{} }}",
            self.qualifier.join("."),
            self.table.name()
        )
    }
}

/// Scan over a pseudo table exposing catalog metadata itself.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaScan {
    relation_id: RelationId,
    table: Arc<TableHandle>,
    qualifier: Vec<String>,
    output: Vec<SlotRef>,
}

impl SchemaScan {
    pub fn new(
        relation_id: RelationId,
        table: Arc<TableHandle>,
        database: String,
        id_gen: &IdGen,
    ) -> Self {
        let qualifier = vec![database];
        let output = materialize_slots(&table, &qualifier, id_gen);
        Self {
            relation_id,
            table,
            qualifier,
            output,
        }
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

    pub fn output(&self) -> &[SlotRef] {
        &self.output
    }
}

impl OperatorTrait for SchemaScan {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        _handle: A::ExprHandle,
        _analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        Ok(LogicalProperty::new(self.output.clone()))
    }
}

impl Display for SchemaScan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SchemaScan {{ table: {}.{} }}",
            self.qualifier.join("."),
            self.table.name()
        )
    }
}
