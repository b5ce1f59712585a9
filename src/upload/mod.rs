//! File ingestion: validation plus a single-flight upload state machine.
//!
//! - [`file`]: candidate files and the extension allow-list
//! - [`coordinator`]: `Idle → Validating → Uploading → Succeeded | Failed`

pub mod coordinator;
pub mod file;

pub use coordinator::{OfferOutcome, UploadCoordinator, UploadJob, UploadState};
pub use file::{CandidateFile, ExtensionPolicy, FileSource};
