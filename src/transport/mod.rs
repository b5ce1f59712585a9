//! Backend access.
//!
//! Controllers only ever see the [`Transport`] trait. [`HttpTransport`] is
//! the reqwest implementation; tests substitute an in-memory double.

pub mod classify;
pub mod client;
pub mod messages;
#[cfg(test)]
pub mod mock;

pub use classify::{classify_status, classify_transport_error};
pub use client::HttpTransport;
pub use messages::{DatasetBody, DatasetRequest, UploadSummary};

use crate::domain::{ApiFailure, Page, Query, Row};
use crate::upload::CandidateFile;
use async_trait::async_trait;
use serde_json::Value;

/// Outcome of a single remote call.
pub type CallResult<T> = std::result::Result<T, ApiFailure>;

/// The remote API a screen talks to.
///
/// Implementations must be cheap to share across tasks; the runtime holds
/// one behind an `Arc` and calls it from spawned tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET <collection>?q=&limit=&offset=[&sort=&dir=]`
    async fn fetch_page(&self, collection: &str, query: &Query) -> CallResult<Page>;

    /// Full dataset for client-side screens.
    async fn fetch_dataset(&self, request: &DatasetRequest) -> CallResult<Vec<Row>>;

    /// `POST <collection>` with a JSON body.
    async fn create(&self, collection: &str, body: &Value) -> CallResult<Value>;

    /// `PUT <collection>/<id>` with a JSON body.
    async fn update(&self, collection: &str, id: &str, body: &Value) -> CallResult<Value>;

    /// `DELETE <collection>/<id>`
    async fn delete(&self, collection: &str, id: &str) -> CallResult<Value>;

    /// `POST <endpoint>` with the file as a multipart part named `file`.
    async fn upload(&self, endpoint: &str, file: &CandidateFile) -> CallResult<UploadSummary>;
}
