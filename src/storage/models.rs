// storage/models.rs
// Datastore models and types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::SYSTEM_COLUMN_PREFIX;

/// One record as returned by the store, keyed by column id.
///
/// Key order carries no meaning; exported rows are projected onto the
/// resolved column order instead.
pub type Record = Map<String, Value>;

/// A typed column of a datastore table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column identifier
    pub id: String,
    /// Declared type (`int`, `text`, `numeric`, ...)
    #[serde(rename = "type")]
    pub column_type: String,
    /// Dictionary metadata (`label`, `notes`, `type_override`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Map<String, Value>>,
}

impl Column {
    /// Creates a column without dictionary metadata.
    pub fn new(id: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            column_type: column_type.into(),
            info: None,
        }
    }

    /// Whether the column is managed by the store (`_`-prefixed id).
    pub fn is_system(&self) -> bool {
        self.id.starts_with(SYSTEM_COLUMN_PREFIX)
    }

    /// Reads a string entry of `info`, or `""` when absent.
    ///
    /// Non-string values are rendered as compact JSON.
    pub fn info_text(&self, key: &str) -> String {
        match self.info.as_ref().and_then(|info| info.get(key)) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// One bounded batch of records from a single store query.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Columns of the resource, in table order
    pub columns: Vec<Column>,
    /// Records in store order
    pub records: Vec<Record>,
}

impl Page {
    /// Number of records on this page.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}

/// A column definition submitted to [`super::DataStore::apply_schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column identifier
    pub id: String,
    /// Declared type, kept from the server's column list
    #[serde(rename = "type")]
    pub column_type: String,
    /// Replacement dictionary metadata
    pub info: Map<String, Value>,
}

/// Catalog entry of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMeta {
    /// Resource identifier (also the table name)
    pub resource_id: String,
    /// Owning package identifier
    pub package_id: String,
    /// Display name
    pub name: String,
}
