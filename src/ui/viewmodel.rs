//! Result presenter: the read-only projection a view renders.
//!
//! A [`ViewModel`] is recomputed from `ScreenState` after every event that
//! changes it. It carries no behaviour and owns copies of everything it
//! shows, so subscribers never observe a half-applied transition.

use crate::app::DataModeLabel;
use crate::domain::{ApiFailure, ErrorCategory, Row, SortSpec};
use crate::upload::UploadState;
use serde::Serialize;
use serde_json::Value;

/// Snapshot of one screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub screen: String,
    pub mode: DataModeLabel,

    /// Rows of the current page, in display order.
    pub items: Vec<Row>,
    pub total: u32,
    pub count: u32,
    pub offset: u32,
    pub limit: u32,
    pub can_next: bool,
    pub can_prev: bool,

    /// Raw text of the search box, possibly not yet debounced.
    pub query: String,
    pub sort: Option<SortSpec>,

    /// True while the authoritative listing request is unresolved.
    pub loading: bool,
    /// True while a create, update or delete is in flight.
    pub mutating: bool,

    pub selected: Option<Row>,
    pub status: ListStatus,
    pub error: Option<ErrorView>,
    pub notice: Option<String>,
    pub upload: UploadState,
}

impl ViewModel {
    /// 1-based page number for display.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.offset / self.limit + 1
    }

    #[must_use]
    pub const fn page_count(&self) -> u32 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.limit)
        }
    }
}

/// What the list area should say besides the rows themselves.
///
/// An empty result and an empty query are both ordinary states, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListStatus {
    /// Nothing has been applied yet.
    NotLoaded,
    /// No search text; every row is part of the result.
    ShowingAll { total: u32 },
    /// Search text matched `total` rows.
    Filtered { query: String, total: u32 },
    /// Search text matched nothing.
    NoRowsFound { query: String },
}

impl ListStatus {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::NotLoaded => "Loading...".to_string(),
            Self::ShowingAll { total } => format!("Showing all {total} rows"),
            Self::Filtered { query, total } => format!("{total} rows matching \"{query}\""),
            Self::NoRowsFound { query } => format!("No rows found for \"{query}\""),
        }
    }
}

/// Error banner contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    pub category: ErrorCategory,
    pub status: Option<u16>,
    pub message: String,
    pub user_message: &'static str,
    pub payload: Option<Value>,
}

impl From<&ApiFailure> for ErrorView {
    fn from(failure: &ApiFailure) -> Self {
        Self {
            category: failure.category,
            status: failure.status,
            message: failure.message.clone(),
            user_message: failure.user_message(),
            payload: failure.payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServerStatus;
    use serde_json::json;

    #[test]
    fn test_error_view_keeps_server_payload() {
        let failure = ApiFailure {
            category: ErrorCategory::Server(ServerStatus::Forbidden),
            status: Some(403),
            payload: Some(json!({"detail": "nope"})),
            message: "Forbidden. (HTTP 403)".into(),
        };
        let view = ErrorView::from(&failure);
        assert_eq!(view.user_message, "Forbidden.");
        assert_eq!(view.payload, Some(json!({"detail": "nope"})));
    }

    #[test]
    fn test_status_serializes_with_kind_tag() {
        let value = serde_json::to_value(ListStatus::NoRowsFound { query: "zz".into() }).unwrap();
        assert_eq!(value, json!({"kind": "no_rows_found", "query": "zz"}));
        assert_eq!(ListStatus::ShowingAll { total: 3 }.describe(), "Showing all 3 rows");
    }
}
