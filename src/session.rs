//! Per-session settings that influence binding.

pub const DEFAULT_CATALOG: &str = "internal";

/// Session state supplied by the connection layer.
///
/// `show_hidden_columns` and `skip_delete_marker` both suppress the implicit
/// delete-marker filter, see [`crate::rules::BindRelationRule`].
#[derive(Clone, Debug)]
pub struct SessionVariables {
    default_catalog: String,
    default_database: String,
    show_hidden_columns: bool,
    skip_delete_marker: bool,
}

impl SessionVariables {
    pub fn new<C: Into<String>, D: Into<String>>(
        default_catalog: C,
        default_database: D,
    ) -> Self {
        Self {
            default_catalog: default_catalog.into(),
            default_database: default_database.into(),
            show_hidden_columns: false,
            skip_delete_marker: false,
        }
    }

    pub fn with_show_hidden_columns(mut self, show: bool) -> Self {
        self.show_hidden_columns = show;
        self
    }

    pub fn with_skip_delete_marker(mut self, skip: bool) -> Self {
        self.skip_delete_marker = skip;
        self
    }

    pub fn default_catalog(&self) -> &str {
        &self.default_catalog
    }

    pub fn default_database(&self) -> &str {
        &self.default_database
    }

    pub fn show_hidden_columns(&self) -> bool {
        self.show_hidden_columns
    }

    pub fn skip_delete_marker(&self) -> bool {
        self.skip_delete_marker
    }
}

impl Default for SessionVariables {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG, "default")
    }
}
