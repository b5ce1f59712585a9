//! Side effects requested by the event handler.
//!
//! [`handle_event`](super::handle_event) never performs I/O itself. It
//! returns actions, the runtime executes them, and their outcomes come back
//! as events tagged with the sequence, generation or job id they were issued
//! under.

use crate::domain::Query;
use crate::transport::DatasetRequest;
use crate::upload::CandidateFile;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replaces the pending debounce timer; on expiry the runtime posts
    /// `Event::DebounceElapsed { generation }`.
    ArmDebounce { generation: u64, delay: Duration },

    /// Server-mode listing request.
    FetchPage { sequence: u64, collection: String, query: Query },

    /// Local-mode dataset load.
    FetchDataset { sequence: u64, request: DatasetRequest },

    /// Multipart transfer of an accepted file.
    Upload { job_id: u64, endpoint: String, file: CandidateFile },

    /// `POST <path>` with a validated JSON body.
    Create { path: String, body: Value },

    /// `PUT <path>/<id>` with a validated JSON body.
    Update { path: String, id: String, body: Value },

    /// `DELETE <path>/<id>`.
    Delete { path: String, id: String },
}

impl Action {
    /// Short name used in logs and span fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ArmDebounce { .. } => "arm_debounce",
            Self::FetchPage { .. } => "fetch_page",
            Self::FetchDataset { .. } => "fetch_dataset",
            Self::Upload { .. } => "upload",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}
