//! Column metadata for client-side filtering and sorting.

use serde::{Deserialize, Serialize};

/// How a column's values compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    /// Whether free-text search looks at this column.
    pub searchable: bool,
}

impl ColumnSpec {
    #[must_use]
    pub fn text(name: &str) -> Self {
        Self { name: name.to_string(), kind: ColumnKind::Text, searchable: true }
    }

    #[must_use]
    pub fn number(name: &str) -> Self {
        Self { name: name.to_string(), kind: ColumnKind::Number, searchable: false }
    }

    #[must_use]
    pub fn date(name: &str) -> Self {
        Self { name: name.to_string(), kind: ColumnKind::Date, searchable: false }
    }

    #[must_use]
    pub const fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }
}

/// Columns of one screen plus the column that identifies a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub key_column: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    #[must_use]
    pub fn new(key_column: &str, columns: Vec<ColumnSpec>) -> Self {
        Self { key_column: key_column.to_string(), columns }
    }

    /// Kind of `column`; unknown columns compare as text.
    #[must_use]
    pub fn kind_of(&self, column: &str) -> ColumnKind {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map_or(ColumnKind::Text, |c| c.kind)
    }

    pub fn searchable_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter(|c| c.searchable).map(|c| c.name.as_str())
    }
}
