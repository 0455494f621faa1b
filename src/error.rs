use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalyzerError>;

/// Errors raised during statement analysis.
///
/// None of these are recoverable: a failed bind aborts the enclosing
/// statement's analysis as a unit and propagates to the caller.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A table reference with a name-part count outside 1..=3.
    #[error("table name [{name}] is invalid")]
    MalformedName { name: String },

    #[error("table [{name}] does not exist")]
    TableNotFound { name: String },

    #[error("partition [{partition}] does not exist in table [{table}]")]
    PartitionNotFound { partition: String, table: String },

    /// Partition pruning requested on a storage kind that has no partitions.
    #[error(
        "only native tables support partition selection, table [{table}] is a {kind} table"
    )]
    PartitionOnNonNative { table: String, kind: &'static str },

    /// Catalog metadata describes a storage kind the binder cannot bind.
    ///
    /// Currently every [`crate::catalog::TableKind`] variant is bindable, so
    /// nothing raises this; it is reserved for kinds the binder declines to
    /// bind before their synthesis lands.
    #[error("unsupported table kind {kind} for table [{table}]")]
    UnsupportedTableKind { table: String, kind: &'static str },

    /// Catalog and synthesized plan disagree, e.g. a declared hidden column
    /// is missing from a scan's output.
    #[error("schema desynchronization: {0}")]
    SchemaConsistency(String),

    /// A view's stored definition failed to parse or analyze. Distinct from
    /// a user syntax error: the offending text was persisted earlier.
    #[error("failed to expand view [{view}]: {source}")]
    ViewDefinition {
        view: String,
        #[source]
        source: Box<AnalyzerError>,
    },

    #[error("syntax error: {0}")]
    Parse(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
