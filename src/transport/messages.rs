//! Wire types exchanged with the backend.

use crate::domain::Row;
use serde::{Deserialize, Serialize};

/// Body returned by a successful spreadsheet upload.
///
/// Only the two counters are meaningful to the controller. When the file
/// had no valid rows the backend omits `rows_in_file` and sends a `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub inserted_or_updated: u64,
    #[serde(default)]
    pub rows_in_file: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A full-dataset read for client-side screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetRequest {
    pub path: String,
    /// Query parameters; keys may repeat (`isins=A&isins=B`).
    pub params: Vec<(String, String)>,
}

impl DatasetRequest {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), params: Vec::new() }
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }
}

/// The shapes a dataset endpoint may answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DatasetBody {
    Rows(Vec<Row>),
    Data { data: Vec<Row> },
    Items { items: Vec<Row> },
}

impl DatasetBody {
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) | Self::Data { data: rows } | Self::Items { items: rows } => rows,
        }
    }
}
