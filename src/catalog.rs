//! Catalog-resident table metadata consumed by the binder.
//!
//! The catalog service itself is an external collaborator; this module only
//! defines the read interface ([`CatalogReader`]) plus the metadata shapes a
//! bind call borrows: table handles tagged with a closed storage-kind enum,
//! column definitions (including hidden columns) and partition catalogs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use arrow_schema::DataType;
use derive_more::Display;

/// Name of the hidden boolean-ish column native tables use to mark deleted
/// rows. Rows with a zero marker are live.
pub const DELETE_MARKER: &str = "__delete_mark__";

#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub struct PartitionId(pub u64);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    name: String,
    data_type: DataType,
    hidden: bool,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            hidden: false,
        }
    }

    pub fn hidden<S: Into<String>>(name: S, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            hidden: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    id: PartitionId,
    name: String,
}

impl Partition {
    pub fn new<S: Into<String>>(id: PartitionId, name: S) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> PartitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// How a native table reconciles multiple versions of the same key.
///
/// Under [`MergePolicy::MergeOnRead`] deleted rows are still present in scan
/// output until filtered, which invalidates pre-aggregation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MergePolicy {
    MergeOnWrite,
    MergeOnRead,
}

/// Metadata specific to the native columnar storage kind.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeMeta {
    columns: Vec<Column>,
    partitions: HashMap<String, Partition>,
    temp_partitions: HashMap<String, Partition>,
    merge_policy: MergePolicy,
}

impl NativeMeta {
    pub fn new(columns: Vec<Column>, merge_policy: MergePolicy) -> Self {
        Self {
            columns,
            partitions: HashMap::new(),
            temp_partitions: HashMap::new(),
            merge_policy,
        }
    }

    pub fn add_partition(mut self, partition: Partition) -> Self {
        self.partitions
            .insert(partition.name().to_string(), partition);
        self
    }

    pub fn add_temp_partition(mut self, partition: Partition) -> Self {
        self.temp_partitions
            .insert(partition.name().to_string(), partition);
        self
    }

    /// Look up a partition by name. Temporary and permanent partitions are
    /// distinct namespaces.
    pub fn partition(&self, name: &str, temporary: bool) -> Option<&Partition> {
        if temporary {
            self.temp_partitions.get(name)
        } else {
            self.partitions.get(name)
        }
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.merge_policy
    }

    pub fn has_delete_marker(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.is_hidden() && c.name() == DELETE_MARKER)
    }
}

/// Closed set of storage kinds the engine knows about.
///
/// The binder dispatches with an exhaustive match over this enum, so adding
/// a kind is a compile-time checked change, never a silent default branch.
#[derive(Clone, Debug, PartialEq)]
pub enum TableKind {
    Native(NativeMeta),
    View {
        definition: String,
        columns: Vec<Column>,
    },
    HiveExternal {
        columns: Vec<Column>,
    },
    JdbcExternal {
        columns: Vec<Column>,
    },
    SearchExternal {
        columns: Vec<Column>,
    },
    Schema {
        columns: Vec<Column>,
    },
}

/// Catalog-resident table metadata.
///
/// Owned by the catalog service; the binder borrows a handle for the
/// duration of one bind call and never mutates it.
#[derive(Clone, Debug, PartialEq)]
pub struct TableHandle {
    name: String,
    kind: TableKind,
}

impl TableHandle {
    pub fn new<S: Into<String>>(name: S, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TableKind {
        &self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TableKind::Native(_) => "Native",
            TableKind::View { .. } => "View",
            TableKind::HiveExternal { .. } => "HiveExternal",
            TableKind::JdbcExternal { .. } => "JdbcExternal",
            TableKind::SearchExternal { .. } => "SearchExternal",
            TableKind::Schema { .. } => "Schema",
        }
    }

    pub fn columns(&self) -> &[Column] {
        match &self.kind {
            TableKind::Native(meta) => &meta.columns,
            TableKind::View { columns, .. }
            | TableKind::HiveExternal { columns }
            | TableKind::JdbcExternal { columns }
            | TableKind::SearchExternal { columns }
            | TableKind::Schema { columns } => columns,
        }
    }

    pub fn as_native(&self) -> Option<&NativeMeta> {
        match &self.kind {
            TableKind::Native(meta) => Some(meta),
            _ => None,
        }
    }
}

/// Read access to the shared catalog snapshot.
///
/// Lookups must be safe for concurrent reads across simultaneously
/// analyzing statements; the binder never mutates catalog state.
pub trait CatalogReader: Send + Sync {
    fn resolve_table(
        &self,
        catalog: &str,
        database: &str,
        table: &str,
    ) -> Option<Arc<TableHandle>>;
}

/// In-memory catalog keyed by `catalog.database.table`.
#[derive(Default)]
pub struct MemoryCatalog {
    tables: RwLock<HashMap<String, Arc<TableHandle>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_table(&self, catalog: &str, database: &str, table: TableHandle) {
        let key = format!("{}.{}.{}", catalog, database, table.name());
        self.tables
            .write()
            .unwrap()
            .insert(key, Arc::new(table));
    }
}

impl CatalogReader for MemoryCatalog {
    fn resolve_table(
        &self,
        catalog: &str,
        database: &str,
        table: &str,
    ) -> Option<Arc<TableHandle>> {
        let key = format!("{}.{}.{}", catalog, database, table);
        self.tables.read().unwrap().get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native_with_marker() -> NativeMeta {
        NativeMeta::new(
            vec![
                Column::new("id", DataType::Int64),
                Column::hidden(DELETE_MARKER, DataType::Int8),
            ],
            MergePolicy::MergeOnRead,
        )
    }

    #[test]
    fn test_delete_marker_detection() {
        assert!(native_with_marker().has_delete_marker());

        let plain = NativeMeta::new(
            vec![Column::new("id", DataType::Int64)],
            MergePolicy::MergeOnWrite,
        );
        assert!(!plain.has_delete_marker());

        // A visible column with the marker name does not count.
        let visible = NativeMeta::new(
            vec![Column::new(DELETE_MARKER, DataType::Int8)],
            MergePolicy::MergeOnRead,
        );
        assert!(!visible.has_delete_marker());
    }

    #[test]
    fn test_partition_namespaces_are_distinct() {
        let meta = native_with_marker()
            .add_partition(Partition::new(PartitionId(1), "p1"))
            .add_temp_partition(Partition::new(PartitionId(2), "p1"));

        assert_eq!(meta.partition("p1", false).unwrap().id(), PartitionId(1));
        assert_eq!(meta.partition("p1", true).unwrap().id(), PartitionId(2));
        assert!(meta.partition("p2", false).is_none());
    }

    #[test]
    fn test_memory_catalog_lookup() {
        let catalog = MemoryCatalog::new();
        catalog.register_table(
            "internal",
            "sales",
            TableHandle::new("orders", TableKind::Native(native_with_marker())),
        );

        assert!(catalog.resolve_table("internal", "sales", "orders").is_some());
        assert!(catalog.resolve_table("internal", "sales", "missing").is_none());
        assert!(catalog.resolve_table("internal", "hr", "orders").is_none());
    }
}
