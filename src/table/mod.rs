//! Client-side filtering, sorting and selection.
//!
//! Used by screens whose whole dataset is already resident. Deriving the
//! view is a pure function of `(rows, query text, sort, schema)`: identical
//! inputs always give the identical ordered output.
//!
//! - [`schema`]: column kinds and the searchable set
//! - [`filter`]: case-insensitive substring predicate
//! - [`sort`]: comparator policy and stable sort
//! - [`selection`]: key-based selection

pub mod filter;
pub mod schema;
pub mod selection;
pub mod sort;

pub use schema::{ColumnKind, ColumnSpec, TableSchema};
pub use selection::Selection;

use crate::domain::{Row, SortSpec};

/// Filters then sorts `rows` into a fresh view.
#[must_use]
pub fn derive_view(
    rows: &[Row],
    text: &str,
    sort: Option<&SortSpec>,
    schema: &TableSchema,
) -> Vec<Row> {
    let _span = tracing::debug_span!(
        "derive_view",
        total_rows = rows.len(),
        query_len = text.len(),
        sort_key = sort.map(|s| s.key.as_str())
    )
    .entered();

    let mut view = filter::filter_rows(rows, text, schema);
    if let Some(spec) = sort {
        sort::sort_rows(&mut view, spec, schema);
    }

    tracing::debug!(visible_rows = view.len(), "view derived");
    view
}
