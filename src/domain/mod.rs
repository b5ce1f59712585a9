//! Domain layer for refdesk.
//!
//! Core types shared by every controller, independent of HTTP or tokio.
//!
//! # Organization
//!
//! - [`error`]: crate error, view-facing failure taxonomy
//! - [`row`]: opaque rows and cell values
//! - [`query`]: queries, sort specs and pages
//! - [`portfolio`]: portfolio form drafts and their validation
//!
//! # Examples
//!
//! ```
//! use refdesk::domain::{Query, SortSpec};
//!
//! let mut query = Query::new(20);
//! query.sort = Some(SortSpec::asc("name"));
//! assert_eq!(query.offset, 0);
//! ```

pub mod error;
pub mod portfolio;
pub mod query;
pub mod row;

pub use error::{ApiFailure, ErrorCategory, RefdeskError, Result, ServerStatus, ValidationKind};
pub use portfolio::PortfolioDraft;
pub use query::{Page, Query, SortDir, SortSpec};
pub use row::{CellValue, Row};
