//! Refdesk: query, pagination and upload controllers for reference-data
//! admin screens backed by a remote HTTP API.
//!
//! A screen lists rows from the backend, lets the user search, sort and page
//! through them, and (on some screens) accepts spreadsheet uploads or simple
//! create, update and delete mutations. Refdesk owns the state behind such a
//! screen:
//! - Debounced search input, so typing does not flood the backend
//! - Request sequencing, so a late response never overwrites a newer one
//! - Offset pagination driven by the server's reported total
//! - Client-side filtering and sorting for datasets loaded once
//! - A single-flight upload state machine with client-side validation
//! - A serializable view model projection for whatever renders the screen
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Runtime (runtime/)                                 │  ← tokio loop
//! │  - Executes actions, arms debounce timers           │
//! │  - Publishes view models on a watch channel         │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling, action emission                  │
//! │  - Screen presets and data modes                    │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ query/        │   │ table/        │   │ upload/       │
//! │ - Debouncer   │   │ - Filter      │   │ - Validation  │
//! │ - Sequencer   │   │ - Sort        │   │ - Coordinator │
//! │ - Pagination  │   │ - Selection   │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Transport (transport/) and Domain (domain/)        │
//! │  - reqwest client, status classification            │
//! │  - Rows, queries, pages, error taxonomy             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: screen state machine with event/action model
//! - [`domain`]: rows, queries, pages, portfolio drafts, errors
//! - [`query`]: debouncer, request sequencer, pagination
//! - [`table`]: client-side filter, sort and selection
//! - [`upload`]: candidate files and the upload coordinator
//! - [`transport`]: `Transport` trait and its reqwest implementation
//! - [`ui`]: view model projection
//! - [`runtime`]: tokio event loop and screen handles
//! - `observability`: tracing subscriber and OpenTelemetry file export
//!
//! # Configuration
//!
//! Settings are read from a TOML file; every key is optional:
//!
//! ```toml
//! base_url = "https://refdata.internal:8000"
//! debounce_ms = 300
//! page_limit = 20
//! request_timeout_secs = 30
//! upload_timeout_secs = 600
//! upload_extensions = ["xlsx", "xls"]
//! upload_endpoint = "/referential/upload-excel"
//! trace_level = "debug"
//! trace_file = "/tmp/refdesk/otlp.json"
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use refdesk::app::{ScreenConfig, ScreenState};
//! use refdesk::runtime::ScreenRuntime;
//! use refdesk::transport::HttpTransport;
//! use refdesk::Config;
//! use std::sync::Arc;
//!
//! # async fn run() -> refdesk::Result<()> {
//! let config = Config::default();
//! let transport = Arc::new(HttpTransport::from_config(&config)?);
//! let state = ScreenState::new(ScreenConfig::assets(), &config);
//! let screen = ScreenRuntime::spawn(state, transport);
//!
//! screen.search("msci world")?;
//! let view = screen.wait_until(|vm| !vm.loading && vm.total > 0).await?;
//! println!("{} assets", view.total);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod query;
pub mod runtime;
pub mod table;
pub mod transport;
pub mod ui;
pub mod upload;

pub mod observability;

pub use app::{handle_event, Action, Event, ScreenConfig, ScreenState};
pub use domain::{ApiFailure, ErrorCategory, RefdeskError, Result, Row};
pub use runtime::{ScreenHandle, ScreenRuntime};
pub use ui::ViewModel;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_PAGE_LIMIT: u32 = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 600;
const DEFAULT_UPLOAD_ENDPOINT: &str = "/referential/upload-excel";

/// Client settings shared by every screen.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root; collection paths are appended to it.
    pub base_url: String,

    /// Quiet period after the last keystroke before a search is issued.
    pub debounce_ms: u64,

    /// Initial page size.
    pub page_limit: u32,

    /// Timeout for ordinary JSON requests.
    pub request_timeout_secs: u64,

    /// Timeout ceiling for spreadsheet uploads.
    pub upload_timeout_secs: u64,

    /// Allow-listed upload extensions, without the dot.
    pub upload_extensions: Vec<String>,

    /// Multipart endpoint used by screens that accept uploads.
    pub upload_endpoint: String,

    /// Tracing level: `trace`, `debug`, `info`, `warn`, `error`.
    ///
    /// `RUST_LOG` takes precedence when set. Default: `"info"`
    pub trace_level: Option<String>,

    /// When set, spans are also exported as OTLP JSON lines to this file.
    pub trace_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
            upload_extensions: default_extensions(),
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            trace_level: None,
            trace_file: None,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["xlsx".to_string(), "xls".to_string()]
}

impl Config {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`RefdeskError::Config`] if the document does not parse or
    /// fails [`Config::validate`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RefdeskError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RefdeskError::Io`] if the file cannot be read, otherwise
    /// see [`Config::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&text)
    }

    /// Builds a configuration from flat key/value settings.
    ///
    /// # Parsing Rules
    ///
    /// - `upload_extensions`: comma-separated, leading dots stripped, empty
    ///   entries dropped; an empty list falls back to the default
    /// - numeric keys fall back to their default when they do not parse
    /// - unknown keys are ignored
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use refdesk::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("upload_extensions".to_string(), ".xlsx, csv".to_string());
    /// map.insert("page_limit".to_string(), "50".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.upload_extensions, vec!["xlsx", "csv"]);
    /// assert_eq!(config.page_limit, 50);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let upload_extensions = map
            .get("upload_extensions")
            .map(|s| {
                s.split(',')
                    .map(|ext| ext.trim().trim_start_matches('.'))
                    .filter(|ext| !ext.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|v: &Vec<String>| !v.is_empty())
            .unwrap_or(defaults.upload_extensions);

        Self {
            base_url: map.get("base_url").cloned().unwrap_or(defaults.base_url),
            debounce_ms: parse_or(map, "debounce_ms", defaults.debounce_ms),
            page_limit: parse_or(map, "page_limit", defaults.page_limit),
            request_timeout_secs: parse_or(
                map,
                "request_timeout_secs",
                defaults.request_timeout_secs,
            ),
            upload_timeout_secs: parse_or(map, "upload_timeout_secs", defaults.upload_timeout_secs),
            upload_extensions,
            upload_endpoint: map
                .get("upload_endpoint")
                .cloned()
                .unwrap_or(defaults.upload_endpoint),
            trace_level: map.get("trace_level").cloned(),
            trace_file: map.get("trace_file").map(PathBuf::from),
        }
    }

    /// Checks the settings that would otherwise fail later and less clearly.
    ///
    /// # Errors
    ///
    /// Returns [`RefdeskError::Config`] for a zero `page_limit` or a
    /// `base_url` that is not an absolute URL.
    pub fn validate(&self) -> Result<()> {
        if self.page_limit == 0 {
            return Err(RefdeskError::Config("page_limit must be positive".to_string()));
        }
        reqwest::Url::parse(&self.base_url).map_err(|e| {
            RefdeskError::Config(format!("invalid base_url {:?}: {e}", self.base_url))
        })?;
        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(map: &BTreeMap<String, String>, key: &str, default: T) -> T {
    map.get(key)
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            base_url = "https://refdata.example.com/api"
            page_limit = 50
            upload_extensions = ["xlsx"]
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://refdata.example.com/api");
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.upload_extensions, vec!["xlsx"]);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.upload_timeout_secs, 600);
    }

    #[test]
    fn test_zero_page_limit_rejected() {
        let err = Config::from_toml_str("page_limit = 0").unwrap_err();
        assert!(matches!(err, RefdeskError::Config(_)));
    }

    #[test]
    fn test_relative_base_url_rejected() {
        let err = Config::from_toml_str(r#"base_url = "localhost""#).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(matches!(
            Config::from_toml_str("page_limit = ").unwrap_err(),
            RefdeskError::Config(_)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms = 150").unwrap();
        writeln!(file, "trace_file = \"/tmp/refdesk.json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.trace_file, Some(PathBuf::from("/tmp/refdesk.json")));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RefdeskError::Io(_)));
    }

    #[test]
    fn test_from_map_falls_back_on_bad_numbers() {
        let mut map = BTreeMap::new();
        map.insert("debounce_ms".to_string(), "soon".to_string());
        map.insert("upload_extensions".to_string(), " , ".to_string());
        map.insert("trace_level".to_string(), "debug".to_string());

        let config = Config::from_map(&map);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.upload_extensions, vec!["xlsx", "xls"]);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
    }
}
