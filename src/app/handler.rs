//! Event handling and state transitions.
//!
//! Every trigger from the view and every completed side effect arrives as
//! an [`Event`]. [`handle_event`] runs it to completion against the
//! [`ScreenState`] and returns whether the projection changed plus the
//! [`Action`]s to execute.
//!
//! # Event Types
//!
//! - **Input**: `SearchInput`, `Sort`, `NextPage`, `PrevPage`, `SetLimit`,
//!   `Select`, `OfferFile`, `Reload`, `CreateEntity`, `UpdateSelected`,
//!   `DeleteSelected`
//! - **Acknowledgements**: `AcknowledgeUpload`, `DismissError`
//! - **Completions**: `DebounceElapsed`, `PageLoaded`, `DatasetLoaded`,
//!   `UploadFinished`, `EntityCreated`, `EntityUpdated`, `EntityDeleted`

use super::actions::Action;
use super::state::ScreenState;
use crate::domain::{Page, PortfolioDraft, RefdeskError, Result, Row, SortSpec};
use crate::query::Resolution;
use crate::transport::{CallResult, UploadSummary};
use crate::upload::{CandidateFile, FileSource, OfferOutcome};
use serde_json::Value;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Raw search box content after a keystroke.
    SearchInput(String),
    /// A debounce timer expired.
    DebounceElapsed { generation: u64 },
    /// Column header clicked.
    Sort(String),
    NextPage,
    PrevPage,
    SetLimit(u32),
    /// Row clicked (`None` clears the selection).
    Select(Option<String>),
    /// File dropped on the upload zone or chosen in the picker.
    OfferFile { file: CandidateFile, source: FileSource },
    /// Re-fetch the listing or dataset.
    Reload,
    /// The view has shown the terminal upload state.
    AcknowledgeUpload,
    /// Close the error banner and notice.
    DismissError,
    CreateEntity(PortfolioDraft),
    /// Replace the selected entity with the edited form.
    UpdateSelected(PortfolioDraft),
    DeleteSelected,

    PageLoaded { sequence: u64, result: CallResult<Page> },
    DatasetLoaded { sequence: u64, result: CallResult<Vec<Row>> },
    UploadFinished { job_id: u64, result: CallResult<UploadSummary> },
    EntityCreated { result: CallResult<Value> },
    EntityUpdated { id: String, result: CallResult<Value> },
    EntityDeleted { id: String, result: CallResult<Value> },
}

impl Event {
    /// Short name used as a span field; payloads can be large.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SearchInput(_) => "search_input",
            Self::DebounceElapsed { .. } => "debounce_elapsed",
            Self::Sort(_) => "sort",
            Self::NextPage => "next_page",
            Self::PrevPage => "prev_page",
            Self::SetLimit(_) => "set_limit",
            Self::Select(_) => "select",
            Self::OfferFile { .. } => "offer_file",
            Self::Reload => "reload",
            Self::AcknowledgeUpload => "acknowledge_upload",
            Self::DismissError => "dismiss_error",
            Self::CreateEntity(_) => "create_entity",
            Self::UpdateSelected(_) => "update_selected",
            Self::DeleteSelected => "delete_selected",
            Self::PageLoaded { .. } => "page_loaded",
            Self::DatasetLoaded { .. } => "dataset_loaded",
            Self::UploadFinished { .. } => "upload_finished",
            Self::EntityCreated { .. } => "entity_created",
            Self::EntityUpdated { .. } => "entity_updated",
            Self::EntityDeleted { .. } => "entity_deleted",
        }
    }
}

/// Processes an event, mutates the screen state, and returns actions to execute.
///
/// The boolean is true when subscribers must be notified.
///
/// # Errors
///
/// Returns [`RefdeskError::Validation`] for triggers the screen does not
/// support (uploading to a screen without an upload endpoint, or a mutation
/// where no path is configured).
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut ScreenState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!(
        "handle_event",
        screen = %state.config.name,
        event_type = event.name()
    )
    .entered();

    match event {
        Event::SearchInput(text) => {
            state.input.clone_from(text);
            let generation = state.debouncer.on_change(text.as_str(), Instant::now());
            let delay = state.debouncer.delay();
            Ok((true, vec![Action::ArmDebounce { generation, delay }]))
        }
        Event::DebounceElapsed { generation } => {
            let Some(text) = state.debouncer.fire(*generation) else {
                return Ok((false, vec![]));
            };
            tracing::debug!(generation, query = %text, "search triggered");
            state.text = text;
            state.pagination.reset();
            Ok((true, state.issue()))
        }
        Event::Sort(key) => {
            let next = SortSpec::toggled(state.sort.as_ref(), key);
            tracing::debug!(sort_key = %next.key, sort_dir = next.dir.as_str(), "sort changed");
            state.sort = Some(next);
            state.pagination.reset();
            Ok((true, state.issue()))
        }
        Event::NextPage => {
            if !state.pagination.next() {
                tracing::debug!(offset = state.pagination.offset(), "already on last page");
                return Ok((false, vec![]));
            }
            Ok((true, state.issue()))
        }
        Event::PrevPage => {
            if !state.pagination.prev() {
                tracing::debug!("already on first page");
                return Ok((false, vec![]));
            }
            Ok((true, state.issue()))
        }
        Event::SetLimit(limit) => {
            state.pagination.set_limit(*limit);
            Ok((true, state.issue()))
        }
        Event::Select(None) => {
            let changed = state.selection.selected_id().is_some();
            state.selection.clear();
            Ok((changed, vec![]))
        }
        Event::Select(Some(id)) => {
            if !state.contains_key(id) {
                tracing::debug!(id = %id, "selected id not in view, ignoring");
                return Ok((false, vec![]));
            }
            if state.selection.selected_id() == Some(id.as_str()) {
                return Ok((false, vec![]));
            }
            state.selection.select(Some(id.clone()));
            Ok((true, vec![]))
        }
        Event::OfferFile { file, source } => {
            let Some(endpoint) = state.config.upload_endpoint.clone() else {
                return Err(RefdeskError::Validation(format!(
                    "screen {} does not accept uploads",
                    state.config.name
                )));
            };
            match state.upload.offer(file.clone(), *source) {
                OfferOutcome::Started(job) => Ok((
                    true,
                    vec![Action::Upload { job_id: job.id, endpoint, file: job.file }],
                )),
                OfferOutcome::Rejected(_) => Ok((true, vec![])),
                OfferOutcome::Busy => Ok((false, vec![])),
            }
        }
        Event::Reload => Ok((true, state.reload())),
        Event::AcknowledgeUpload => Ok((state.upload.acknowledge(), vec![])),
        Event::DismissError => {
            let changed = state.error.is_some() || state.notice.is_some();
            state.error = None;
            state.notice = None;
            Ok((changed, vec![]))
        }
        Event::CreateEntity(draft) => {
            let Some(path) = state.config.create_path.clone() else {
                return Err(RefdeskError::Validation(format!(
                    "screen {} does not support creation",
                    state.config.name
                )));
            };
            match draft.to_body() {
                Ok(body) => {
                    state.mutating = true;
                    Ok((true, vec![Action::Create { path, body }]))
                }
                Err(failure) => {
                    state.fail(failure);
                    Ok((true, vec![]))
                }
            }
        }
        Event::UpdateSelected(draft) => {
            let Some(path) = state.config.update_path.clone() else {
                return Err(RefdeskError::Validation(format!(
                    "screen {} does not support editing",
                    state.config.name
                )));
            };
            let Some(id) = state.selection.selected_id().map(str::to_string) else {
                tracing::debug!("nothing selected to update");
                return Ok((false, vec![]));
            };
            match draft.to_body() {
                Ok(body) => {
                    state.mutating = true;
                    Ok((true, vec![Action::Update { path, id, body }]))
                }
                Err(failure) => {
                    state.fail(failure);
                    Ok((true, vec![]))
                }
            }
        }
        Event::DeleteSelected => {
            let Some(path) = state.config.delete_path.clone() else {
                return Err(RefdeskError::Validation(format!(
                    "screen {} does not support deletion",
                    state.config.name
                )));
            };
            let Some(id) = state.selection.selected_id().map(str::to_string) else {
                tracing::debug!("nothing selected to delete");
                return Ok((false, vec![]));
            };
            state.mutating = true;
            Ok((true, vec![Action::Delete { path, id }]))
        }
        Event::PageLoaded { sequence, result } => {
            match state.sequencer.resolve(*sequence, result.clone()) {
                Resolution::Applied(page) => {
                    tracing::debug!(
                        sequence,
                        total = page.total,
                        offset = page.offset,
                        count = page.count,
                        "page applied"
                    );
                    state.apply_page(page);
                    Ok((true, vec![]))
                }
                Resolution::Failed(failure) => {
                    state.roll_back();
                    state.fail(failure);
                    Ok((true, vec![]))
                }
                Resolution::Stale => Ok((false, vec![])),
            }
        }
        Event::DatasetLoaded { sequence, result } => {
            match state.sequencer.resolve(*sequence, result.clone()) {
                Resolution::Applied(rows) => {
                    tracing::debug!(sequence, rows = rows.len(), "dataset applied");
                    state.apply_dataset(rows);
                    Ok((true, vec![]))
                }
                Resolution::Failed(failure) => {
                    state.fail(failure);
                    Ok((true, vec![]))
                }
                Resolution::Stale => Ok((false, vec![])),
            }
        }
        Event::UploadFinished { job_id, result } => {
            if !state.upload.complete(*job_id, result.clone()) {
                return Ok((false, vec![]));
            }
            match result {
                Ok(summary) => {
                    state.notice = Some(summary.message.clone().unwrap_or_else(|| {
                        format!(
                            "{} rows inserted or updated ({} in file)",
                            summary.inserted_or_updated, summary.rows_in_file
                        )
                    }));
                    Ok((true, state.reload()))
                }
                Err(_) => Ok((true, vec![])),
            }
        }
        Event::EntityCreated { result } => {
            state.mutating = false;
            match result {
                Ok(_) => {
                    state.notice = Some("Created".to_string());
                    Ok((true, state.reload()))
                }
                Err(failure) => {
                    state.fail(failure.clone());
                    Ok((true, vec![]))
                }
            }
        }
        Event::EntityUpdated { id, result } => {
            state.mutating = false;
            match result {
                Ok(_) => {
                    state.notice = Some(format!("Updated {id}"));
                    Ok((true, state.reload()))
                }
                Err(failure) => {
                    state.fail(failure.clone());
                    Ok((true, vec![]))
                }
            }
        }
        Event::EntityDeleted { id, result } => {
            state.mutating = false;
            match result {
                Ok(_) => {
                    if state.selection.selected_id() == Some(id.as_str()) {
                        state.selection.clear();
                    }
                    state.notice = Some(format!("Deleted {id}"));
                    Ok((true, state.reload()))
                }
                Err(failure) => {
                    state.fail(failure.clone());
                    Ok((true, vec![]))
                }
            }
        }
    }
}
