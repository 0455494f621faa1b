use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use smallvec::SmallVec;

use crate::analyzer::Analyzer;
use crate::error::AnalysisResult;
use crate::operator::OperatorTrait;
use crate::properties::LogicalProperty;

/// A table reference as emitted by the parser: a dotted name of one to
/// three parts, plus optional optimizer hints and a partition restriction.
///
/// Consumed and replaced exactly once by the bind rule; never mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnboundRelation {
    name_parts: SmallVec<[String; 3]>,
    hints: Vec<String>,
    partitions: Vec<String>,
    temp_partitions: bool,
}

impl UnboundRelation {
    pub fn new<I, S>(name_parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name_parts: name_parts.into_iter().map(Into::into).collect(),
            hints: vec![],
            partitions: vec![],
            temp_partitions: false,
        }
    }

    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the scan to the named partitions. `temporary` selects the
    /// temporary partition namespace instead of the permanent one.
    pub fn with_partitions<I, S>(mut self, partitions: I, temporary: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partitions = partitions.into_iter().map(Into::into).collect();
        self.temp_partitions = temporary;
        self
    }

    pub fn name_parts(&self) -> &[String] {
        &self.name_parts
    }

    /// Dotted form of the reference, for diagnostics.
    pub fn table_name(&self) -> String {
        self.name_parts.join(".")
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn partitions(&self) -> &[String] {
        &self.partitions
    }

    pub fn is_temp_partition(&self) -> bool {
        self.temp_partitions
    }
}

impl OperatorTrait for UnboundRelation {
    fn derive_logical_prop<A: Analyzer>(
        &self,
        _handle: A::ExprHandle,
        _analyzer: &A,
    ) -> AnalysisResult<LogicalProperty> {
        Err(anyhow!(
            "logical properties are not available on unbound relation [{}]",
            self.table_name()
        )
        .into())
    }
}

impl Display for UnboundRelation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UnboundRelation {{ name: {} }}", self.table_name())
    }
}
