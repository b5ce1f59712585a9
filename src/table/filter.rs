//! Case-insensitive substring filtering over the searchable columns.

use super::schema::TableSchema;
use crate::domain::Row;

/// Normalizes user input for matching: trimmed and lowercased.
#[must_use]
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True if any searchable column contains `normalized` (already normalized).
///
/// An empty query matches every row.
#[must_use]
pub fn row_matches(row: &Row, normalized: &str, schema: &TableSchema) -> bool {
    if normalized.is_empty() {
        return true;
    }
    schema
        .searchable_columns()
        .any(|column| row.get(column).display().to_lowercase().contains(normalized))
}

/// Rows matching `text`, in their original relative order.
#[must_use]
pub fn filter_rows(rows: &[Row], text: &str, schema: &TableSchema) -> Vec<Row> {
    let normalized = normalize_query(text);
    rows.iter()
        .filter(|row| row_matches(row, &normalized, schema))
        .cloned()
        .collect()
}
