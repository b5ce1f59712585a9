//! tokio event loop driving one screen.
//!
//! The loop owns the [`ScreenState`] and is its only mutator. Triggers from
//! [`ScreenHandle`]s and completions from spawned transport calls and timers
//! are fed through [`handle_event`] one at a time; every change is published
//! on a `watch` channel.
//!
//! Debounce timers are real tokio tasks. Arming a new one aborts the
//! previous task, and the generation check inside the debouncer discards a
//! timer that fired before its abort landed.

mod handle;

pub use handle::ScreenHandle;

use crate::app::{handle_event, Action, Event, ScreenState};
use crate::transport::Transport;
use crate::ui::viewmodel::ViewModel;
use handle::Command;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::Instrument;

/// Spawner for screen event loops.
pub struct ScreenRuntime {
    state: ScreenState,
    transport: Arc<dyn Transport>,
    completions: mpsc::UnboundedSender<Event>,
    view: watch::Sender<ViewModel>,
    debounce_timer: Option<AbortHandle>,
}

impl ScreenRuntime {
    /// Starts the event loop on the current tokio runtime.
    ///
    /// Nothing is fetched until the caller sends a trigger (typically
    /// [`ScreenHandle::reload`]). The loop ends when every handle is dropped
    /// or [`ScreenHandle::shutdown`] is called.
    #[must_use]
    pub fn spawn(state: ScreenState, transport: Arc<dyn Transport>) -> ScreenHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(state.compute_viewmodel());

        let span = tracing::info_span!("screen", name = %state.config.name);
        let runtime = Self {
            state,
            transport,
            completions: completion_tx,
            view: view_tx,
            debounce_timer: None,
        };
        tokio::spawn(runtime.run(command_rx, completion_rx).instrument(span));

        ScreenHandle::new(command_tx, view_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Event>,
    ) {
        tracing::debug!("screen runtime started");
        loop {
            let event = tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Dispatch(event)) => event,
                    Some(Command::Shutdown) | None => break,
                },
                Some(event) = completions.recv() => event,
            };
            self.process(&event);
        }

        if let Some(timer) = self.debounce_timer.take() {
            timer.abort();
        }
        tracing::debug!("screen runtime stopped");
    }

    fn process(&mut self, event: &Event) {
        match handle_event(&mut self.state, event) {
            Ok((changed, actions)) => {
                tracing::debug!(
                    action_count = actions.len(),
                    changed,
                    "event handled successfully"
                );
                for action in actions {
                    self.execute(action);
                }
                if changed {
                    self.view.send_replace(self.state.compute_viewmodel());
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, event_type = event.name(), "event rejected");
            }
        }
    }

    fn execute(&mut self, action: Action) {
        tracing::trace!(action = action.name(), "executing action");
        match action {
            Action::ArmDebounce { generation, delay } => {
                if let Some(previous) = self.debounce_timer.take() {
                    previous.abort();
                }
                let completions = self.completions.clone();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if completions.send(Event::DebounceElapsed { generation }).is_err() {
                        tracing::debug!(generation, "screen runtime gone, debounce dropped");
                    }
                });
                self.debounce_timer = Some(timer.abort_handle());
            }
            Action::FetchPage { sequence, collection, query } => {
                let transport = Arc::clone(&self.transport);
                self.spawn_call(tracing::debug_span!("fetch_page", sequence), async move {
                    let result = transport.fetch_page(&collection, &query).await;
                    Event::PageLoaded { sequence, result }
                });
            }
            Action::FetchDataset { sequence, request } => {
                let transport = Arc::clone(&self.transport);
                self.spawn_call(tracing::debug_span!("fetch_dataset", sequence), async move {
                    let result = transport.fetch_dataset(&request).await;
                    Event::DatasetLoaded { sequence, result }
                });
            }
            Action::Upload { job_id, endpoint, file } => {
                let transport = Arc::clone(&self.transport);
                self.spawn_call(tracing::info_span!("upload", job_id), async move {
                    let result = transport.upload(&endpoint, &file).await;
                    Event::UploadFinished { job_id, result }
                });
            }
            Action::Create { path, body } => {
                let transport = Arc::clone(&self.transport);
                self.spawn_call(tracing::info_span!("create", path = %path), async move {
                    let result = transport.create(&path, &body).await;
                    Event::EntityCreated { result }
                });
            }
            Action::Update { path, id, body } => {
                let transport = Arc::clone(&self.transport);
                self.spawn_call(tracing::info_span!("update", id = %id), async move {
                    let result = transport.update(&path, &id, &body).await;
                    Event::EntityUpdated { id, result }
                });
            }
            Action::Delete { path, id } => {
                let transport = Arc::clone(&self.transport);
                self.spawn_call(tracing::info_span!("delete", id = %id), async move {
                    let result = transport.delete(&path, &id).await;
                    Event::EntityDeleted { id, result }
                });
            }
        }
    }

    /// Runs `call` in the background and feeds its event back into the loop.
    fn spawn_call<F>(&self, span: tracing::Span, call: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let completions = self.completions.clone();
        tokio::spawn(
            async move {
                let event = call.await;
                if completions.send(event).is_err() {
                    tracing::debug!("screen runtime gone, completion dropped");
                }
            }
            .instrument(span),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ScreenConfig;
    use crate::domain::ApiFailure;
    use crate::transport::mock::{page_of, Call, MockTransport};
    use crate::transport::UploadSummary;
    use crate::ui::viewmodel::ListStatus;
    use crate::upload::{CandidateFile, FileSource, UploadState};
    use crate::Config;
    use std::time::Duration;

    fn assets() -> ScreenState {
        ScreenState::new(ScreenConfig::assets(), &Config::default())
    }

    fn names(vm: &ViewModel) -> Vec<String> {
        vm.items.iter().map(|row| row.get("name").display()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_issues_one_request_with_last_text() {
        let mock = Arc::new(
            MockTransport::default()
                .with_pages(|q| (Duration::from_millis(5), Ok(page_of(&q.text, 1, 1, 0)))),
        );
        let handle = ScreenRuntime::spawn(assets(), mock.clone());

        for text in ["m", "ms", "msc", "msci"] {
            handle.search(text).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let vm = handle.wait_until(|vm| vm.status != ListStatus::NotLoaded).await.unwrap();

        let queries = mock.page_queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "msci");
        assert_eq!(names(&vm), vec!["msci"]);
        assert_eq!(vm.query, "msci");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_for_older_query_is_discarded() {
        let mock = Arc::new(MockTransport::default().with_pages(|q| {
            let delay = if q.text == "slow" { 1_000 } else { 10 };
            (Duration::from_millis(delay), Ok(page_of(&q.text, 2, 2, 0)))
        }));
        let handle = ScreenRuntime::spawn(assets(), mock.clone());

        handle.search("slow").unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(handle.snapshot().loading);

        handle.search("fast").unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let vm = handle.snapshot();
        assert_eq!(mock.page_queries().len(), 2);
        assert_eq!(names(&vm), vec!["fast", "fast"]);
        assert!(!vm.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_for_authoritative_request_stops_loading() {
        let mock = Arc::new(MockTransport::default().with_pages(|_| {
            (Duration::from_millis(50), Err(ApiFailure::timeout("request timed out")))
        }));
        let handle = ScreenRuntime::spawn(assets(), mock);

        handle.reload().unwrap();
        let vm = handle.wait_until(|vm| vm.error.is_some()).await.unwrap();
        assert!(!vm.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_file_during_upload_is_not_sent() {
        let mock = Arc::new(MockTransport::default().with_uploads(|_| {
            let summary = UploadSummary { inserted_or_updated: 2, rows_in_file: 2, message: None };
            (Duration::from_secs(1), Ok(summary))
        }));
        let handle = ScreenRuntime::spawn(assets(), mock.clone());

        handle
            .offer_file(CandidateFile::new("first.xlsx", vec![1]), FileSource::DragDrop)
            .unwrap();
        handle
            .offer_file(CandidateFile::new("second.xlsx", vec![1]), FileSource::Picker)
            .unwrap();

        let vm = handle
            .wait_until(|vm| matches!(vm.upload, UploadState::Succeeded { .. }))
            .await
            .unwrap();
        let UploadState::Succeeded { file_name, .. } = vm.upload else { unreachable!() };
        assert_eq!(file_name, "first.xlsx");

        let uploads: Vec<_> = mock
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Upload(_)))
            .collect();
        assert_eq!(uploads, vec![Call::Upload("first.xlsx".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_file_makes_no_call() {
        let mock = Arc::new(MockTransport::default());
        let handle = ScreenRuntime::spawn(assets(), mock.clone());

        handle
            .offer_file(CandidateFile::new("report.pdf", vec![1]), FileSource::Picker)
            .unwrap();
        handle
            .wait_until(|vm| matches!(vm.upload, UploadState::Failed { .. }))
            .await
            .unwrap();
        assert!(mock.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_selected_puts_then_reloads() {
        let mock = Arc::new(MockTransport::default().with_datasets(|_| {
            let rows = vec![crate::domain::Row::new().with("id", 4).with("name", "Core")];
            (Duration::ZERO, Ok(rows))
        }));
        let state = ScreenState::new(ScreenConfig::portfolios(), &Config::default());
        let handle = ScreenRuntime::spawn(state, mock.clone());

        handle.reload().unwrap();
        handle.wait_until(|vm| vm.total == 1).await.unwrap();
        handle.select(Some("4")).unwrap();
        handle.wait_until(|vm| vm.selected.is_some()).await.unwrap();

        let start = chrono::NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        handle.update_selected(crate::domain::PortfolioDraft::new("Core+", start)).unwrap();
        let vm = handle.wait_until(|vm| vm.notice.is_some() && !vm.loading).await.unwrap();
        assert_eq!(vm.notice.as_deref(), Some("Updated 4"));

        let calls = mock.calls();
        let updates: Vec<_> = calls.iter().filter(|c| matches!(c, Call::Update(..))).collect();
        assert_eq!(updates.len(), 1);
        let Call::Update(id, body) = updates[0] else { unreachable!() };
        assert_eq!(id, "4");
        assert_eq!(body["name"], "Core+");
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::FetchDataset(_))).count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_expiring_after_shutdown_is_dropped() {
        let mock = Arc::new(MockTransport::default());
        let handle = ScreenRuntime::spawn(assets(), mock.clone());

        handle.search("msci").unwrap();
        handle.shutdown();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(mock.page_queries().is_empty());
        assert!(!handle.snapshot().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_fails_after_shutdown() {
        let handle = ScreenRuntime::spawn(assets(), Arc::new(MockTransport::default()));
        handle.shutdown();
        assert!(handle.wait_until(|_| false).await.is_err());
    }
}
