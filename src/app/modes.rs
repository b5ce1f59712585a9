//! Data modes and screen presets.
//!
//! A screen either delegates search, sort and paging to the server
//! ([`DataMode::Server`]) or fetches its whole dataset once and derives the
//! view locally ([`DataMode::Local`]). The presets below describe the
//! reference-data screens of the admin tool.

use crate::domain::SortSpec;
use crate::table::{ColumnSpec, TableSchema};
use crate::transport::DatasetRequest;
use serde::Serialize;

/// Where search, sort and paging are evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataMode {
    /// `GET <collection>?q=&limit=&offset=`, one request per interaction.
    Server { collection: String },
    /// The dataset is loaded once per reload and filtered client-side.
    Local { dataset: DatasetRequest },
}

impl DataMode {
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    #[must_use]
    pub const fn label(&self) -> DataModeLabel {
        match self {
            Self::Server { .. } => DataModeLabel::Server,
            Self::Local { .. } => DataModeLabel::Local,
        }
    }
}

/// Serializable tag of a [`DataMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataModeLabel {
    Server,
    Local,
}

/// Everything a screen needs besides its runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenConfig {
    pub name: String,
    pub mode: DataMode,
    pub schema: TableSchema,
    pub default_sort: Option<SortSpec>,
    /// `POST` target for new entities, when the screen supports creation.
    pub create_path: Option<String>,
    /// Prefix for `PUT <prefix>/<id>`.
    pub update_path: Option<String>,
    /// Prefix for `DELETE <prefix>/<id>`.
    pub delete_path: Option<String>,
    /// Multipart endpoint, when the screen accepts spreadsheet uploads.
    pub upload_endpoint: Option<String>,
}

impl ScreenConfig {
    #[must_use]
    pub fn new(name: &str, mode: DataMode, schema: TableSchema) -> Self {
        Self {
            name: name.to_string(),
            mode,
            schema,
            default_sort: None,
            create_path: None,
            update_path: None,
            delete_path: None,
            upload_endpoint: None,
        }
    }

    #[must_use]
    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_create(mut self, path: &str) -> Self {
        self.create_path = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn with_update(mut self, path: &str) -> Self {
        self.update_path = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn with_delete(mut self, path: &str) -> Self {
        self.delete_path = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn with_upload(mut self, endpoint: &str) -> Self {
        self.upload_endpoint = Some(endpoint.to_string());
        self
    }

    /// Portfolio administration: whole list loaded once, searched locally.
    #[must_use]
    pub fn portfolios() -> Self {
        let schema = TableSchema::new(
            "id",
            vec![
                ColumnSpec::number("id"),
                ColumnSpec::text("name"),
                ColumnSpec::text("manager_name"),
                ColumnSpec::text("description"),
                ColumnSpec::date("start_date"),
                ColumnSpec::date("end_date"),
            ],
        );
        Self::new(
            "portfolios",
            DataMode::Local { dataset: DatasetRequest::new("/admin/portfolios") },
            schema,
        )
        .with_default_sort(SortSpec::asc("name"))
        .with_create("/admin/portfolio")
        .with_update("/admin/portfolio")
        .with_delete("/admin/portfolio")
    }

    /// Asset referential: server-side search and paging, spreadsheet upload.
    #[must_use]
    pub fn assets() -> Self {
        let schema = TableSchema::new(
            "symbol",
            vec![
                ColumnSpec::text("symbol"),
                ColumnSpec::text("isin"),
                ColumnSpec::text("name"),
                ColumnSpec::text("currency"),
            ],
        );
        Self::new(
            "assets",
            DataMode::Server { collection: "/referential/assets".to_string() },
            schema,
        )
        .with_upload("/referential/upload-excel")
    }

    /// ETF book dynamic data for a fixed ISIN list.
    ///
    /// `in_millions` asks the backend to scale `SharesOut` and `AumUsd`.
    #[must_use]
    pub fn etf_book<I, S>(isins: I, in_millions: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dataset = isins
            .into_iter()
            .fold(DatasetRequest::new("/etfbook/analytics/dynamic-data"), |req, isin| {
                req.param("isins", isin)
            })
            .param("b_milion", in_millions.to_string());

        let schema = TableSchema::new(
            "Isin",
            vec![
                ColumnSpec::text("Isin"),
                ColumnSpec::text("Name"),
                ColumnSpec::text("Currency"),
                ColumnSpec::date("NavDate"),
                ColumnSpec::number("Nav"),
                ColumnSpec::number("NavUsd"),
                ColumnSpec::number("AdjustedNav"),
                ColumnSpec::number("AumUsd"),
                ColumnSpec::number("SharesOut"),
            ],
        );
        Self::new("etf_book", DataMode::Local { dataset }, schema)
            .with_default_sort(SortSpec::desc("NavDate"))
    }
}
