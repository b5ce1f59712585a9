//! Single-flight upload state machine.
//!
//! ```text
//! Idle ─offer─▶ Validating ─ok─▶ Uploading ─▶ Succeeded | Failed ─ack─▶ Idle
//!                   └──invalid──▶ Failed
//! ```
//!
//! At most one job is ever `Uploading`. A file offered while a job is in
//! flight is turned away as busy and the in-flight job is left untouched.
//! Offering from a terminal state resets implicitly.

use super::file::{CandidateFile, ExtensionPolicy, FileSource};
use crate::domain::ApiFailure;
use crate::transport::UploadSummary;
use serde::Serialize;

/// Observable state of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Validating { file_name: String },
    Uploading { job_id: u64, file_name: String },
    Succeeded { file_name: String, summary: UploadSummary },
    Failed { file_name: String, failure: ApiFailure },
}

impl UploadState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// An accepted file, ready to be transferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub id: u64,
    pub file: CandidateFile,
}

/// Result of offering a file.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferOutcome {
    /// Validation passed; the caller must transfer `job`.
    Started(UploadJob),
    /// Validation failed; nothing is sent.
    Rejected(ApiFailure),
    /// An upload is already in flight; the offer is ignored.
    Busy,
}

#[derive(Debug, Clone, Default)]
pub struct UploadCoordinator {
    policy: ExtensionPolicy,
    state: UploadState,
    last_job_id: u64,
}

impl UploadCoordinator {
    #[must_use]
    pub fn new(policy: ExtensionPolicy) -> Self {
        Self { policy, state: UploadState::Idle, last_job_id: 0 }
    }

    #[must_use]
    pub const fn state(&self) -> &UploadState {
        &self.state
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.state, UploadState::Uploading { .. })
    }

    #[must_use]
    pub const fn policy(&self) -> &ExtensionPolicy {
        &self.policy
    }

    /// Single entry point for drag-and-drop and picker alike.
    pub fn offer(&mut self, file: CandidateFile, source: FileSource) -> OfferOutcome {
        if let UploadState::Uploading { job_id, file_name } = &self.state {
            tracing::debug!(
                in_flight_job = job_id,
                in_flight_file = %file_name,
                offered_file = %file.name,
                ?source,
                "upload busy, offer ignored"
            );
            return OfferOutcome::Busy;
        }

        tracing::debug!(file_name = %file.name, size = file.len(), ?source, "validating upload candidate");
        self.state = UploadState::Validating { file_name: file.name.clone() };

        if let Err(failure) = self.policy.validate(&file) {
            tracing::debug!(file_name = %file.name, error = %failure, "upload candidate rejected");
            self.state = UploadState::Failed { file_name: file.name, failure: failure.clone() };
            return OfferOutcome::Rejected(failure);
        }

        self.last_job_id += 1;
        let id = self.last_job_id;
        tracing::debug!(job_id = id, file_name = %file.name, "upload started");
        self.state = UploadState::Uploading { job_id: id, file_name: file.name.clone() };
        OfferOutcome::Started(UploadJob { id, file })
    }

    /// Records the terminal outcome of `job_id`.
    ///
    /// Returns false (and changes nothing) if `job_id` is not the job in
    /// flight.
    pub fn complete(&mut self, job_id: u64, result: Result<UploadSummary, ApiFailure>) -> bool {
        let file_name = match &self.state {
            UploadState::Uploading { job_id: current, file_name } if *current == job_id => {
                file_name.clone()
            }
            _ => {
                tracing::debug!(job_id, "completion for unknown upload job ignored");
                return false;
            }
        };

        self.state = match result {
            Ok(summary) => {
                tracing::info!(
                    job_id,
                    inserted_or_updated = summary.inserted_or_updated,
                    rows_in_file = summary.rows_in_file,
                    "upload succeeded"
                );
                UploadState::Succeeded { file_name, summary }
            }
            Err(failure) => {
                tracing::warn!(job_id, error = %failure, "upload failed");
                UploadState::Failed { file_name, failure }
            }
        };
        true
    }

    /// Resets a terminal state to `Idle` once the view has shown it.
    pub fn acknowledge(&mut self) -> bool {
        if self.state.is_terminal() {
            self.state = UploadState::Idle;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCategory, ValidationKind};

    fn xlsx(name: &str) -> CandidateFile {
        CandidateFile::new(name, b"PK\x03\x04".to_vec())
    }

    fn started(outcome: OfferOutcome) -> UploadJob {
        match outcome {
            OfferOutcome::Started(job) => job,
            other => panic!("expected Started, got {other:?}"),
        }
    }

    #[test]
    fn test_second_offer_while_uploading_is_busy() {
        let mut coordinator = UploadCoordinator::default();
        let job = started(coordinator.offer(xlsx("a.xlsx"), FileSource::DragDrop));

        assert_eq!(coordinator.offer(xlsx("b.xlsx"), FileSource::Picker), OfferOutcome::Busy);
        assert_eq!(
            coordinator.state(),
            &UploadState::Uploading { job_id: job.id, file_name: "a.xlsx".into() }
        );
    }

    #[test]
    fn test_invalid_format_fails_without_job() {
        let mut coordinator = UploadCoordinator::default();
        let outcome = coordinator.offer(CandidateFile::new("report.pdf", vec![1]), FileSource::Picker);
        assert!(matches!(outcome, OfferOutcome::Rejected(_)));
        match coordinator.state() {
            UploadState::Failed { failure, .. } => assert_eq!(
                failure.category,
                ErrorCategory::Validation(ValidationKind::InvalidFormat)
            ),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_drop_and_picker_behave_identically() {
        let mut dropped = UploadCoordinator::default();
        let mut picked = UploadCoordinator::default();
        let a = dropped.offer(CandidateFile::new("x.csv", vec![1]), FileSource::DragDrop);
        let b = picked.offer(CandidateFile::new("x.csv", vec![1]), FileSource::Picker);
        assert_eq!(a, b);
        assert_eq!(dropped.state(), picked.state());
    }

    #[test]
    fn test_complete_then_acknowledge_returns_to_idle() {
        let mut coordinator = UploadCoordinator::default();
        let job = started(coordinator.offer(xlsx("a.xlsx"), FileSource::Picker));

        assert!(!coordinator.complete(job.id + 1, Ok(UploadSummary::default())));
        assert!(coordinator.is_busy());

        let summary = UploadSummary { inserted_or_updated: 3, rows_in_file: 4, message: None };
        assert!(coordinator.complete(job.id, Ok(summary.clone())));
        assert_eq!(
            coordinator.state(),
            &UploadState::Succeeded { file_name: "a.xlsx".into(), summary }
        );

        assert!(coordinator.acknowledge());
        assert_eq!(coordinator.state(), &UploadState::Idle);
        assert!(!coordinator.acknowledge());
    }

    #[test]
    fn test_offer_from_terminal_state_resets() {
        let mut coordinator = UploadCoordinator::default();
        let job = started(coordinator.offer(xlsx("a.xlsx"), FileSource::Picker));
        coordinator.complete(job.id, Err(ApiFailure::timeout("upload timed out")));

        let next = started(coordinator.offer(xlsx("b.xlsx"), FileSource::Picker));
        assert!(next.id > job.id);
        assert!(coordinator.is_busy());
    }
}
