//! Caller-facing side of a running screen.

use crate::app::Event;
use crate::domain::{PortfolioDraft, RefdeskError, Result};
use crate::ui::viewmodel::ViewModel;
use crate::upload::{CandidateFile, FileSource};
use tokio::sync::{mpsc, watch};

#[derive(Debug)]
pub(crate) enum Command {
    Dispatch(Event),
    Shutdown,
}

/// Imperative triggers plus state-change subscriptions for one screen.
///
/// Cheap to clone; every clone talks to the same event loop. None of the
/// trigger methods wait for the outcome: results arrive through
/// [`ScreenHandle::subscribe`].
#[derive(Debug, Clone)]
pub struct ScreenHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<ViewModel>,
}

impl ScreenHandle {
    pub(crate) const fn new(
        commands: mpsc::UnboundedSender<Command>,
        view: watch::Receiver<ViewModel>,
    ) -> Self {
        Self { commands, view }
    }

    /// Queues `event` for the event loop.
    ///
    /// # Errors
    ///
    /// Returns [`RefdeskError::Runtime`] once the loop has stopped.
    pub fn dispatch(&self, event: Event) -> Result<()> {
        self.commands
            .send(Command::Dispatch(event))
            .map_err(|_| RefdeskError::Runtime("screen runtime has stopped".to_string()))
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn search(&self, text: &str) -> Result<()> {
        self.dispatch(Event::SearchInput(text.to_string()))
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn sort(&self, key: &str) -> Result<()> {
        self.dispatch(Event::Sort(key.to_string()))
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Result<()> {
        self.dispatch(Event::NextPage)
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn prev(&self) -> Result<()> {
        self.dispatch(Event::PrevPage)
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn set_limit(&self, limit: u32) -> Result<()> {
        self.dispatch(Event::SetLimit(limit))
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn select(&self, id: Option<&str>) -> Result<()> {
        self.dispatch(Event::Select(id.map(str::to_string)))
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn offer_file(&self, file: CandidateFile, source: FileSource) -> Result<()> {
        self.dispatch(Event::OfferFile { file, source })
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn reload(&self) -> Result<()> {
        self.dispatch(Event::Reload)
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn acknowledge_upload(&self) -> Result<()> {
        self.dispatch(Event::AcknowledgeUpload)
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn dismiss_error(&self) -> Result<()> {
        self.dispatch(Event::DismissError)
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn create(&self, draft: PortfolioDraft) -> Result<()> {
        self.dispatch(Event::CreateEntity(draft))
    }

    /// Saves `draft` over the selected entity.
    ///
    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn update_selected(&self, draft: PortfolioDraft) -> Result<()> {
        self.dispatch(Event::UpdateSelected(draft))
    }

    /// # Errors
    ///
    /// See [`ScreenHandle::dispatch`].
    pub fn delete_selected(&self) -> Result<()> {
        self.dispatch(Event::DeleteSelected)
    }

    /// Receiver notified after every event that changed the projection.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.view.clone()
    }

    /// Latest published projection.
    #[must_use]
    pub fn snapshot(&self) -> ViewModel {
        self.view.borrow().clone()
    }

    /// Waits until a published projection satisfies `predicate`.
    ///
    /// Checks the current projection first.
    ///
    /// # Errors
    ///
    /// Returns [`RefdeskError::Runtime`] if the loop stops first.
    pub async fn wait_until<F>(&self, mut predicate: F) -> Result<ViewModel>
    where
        F: FnMut(&ViewModel) -> bool,
    {
        let mut view = self.view.clone();
        let matched = view
            .wait_for(|vm| predicate(vm))
            .await
            .map_err(|_| RefdeskError::Runtime("screen runtime stopped while waiting".to_string()))?;
        Ok(matched.clone())
    }

    /// Asks the event loop to stop. Pending transport calls still finish but
    /// their results are dropped.
    pub fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).is_err() {
            tracing::debug!("screen runtime already stopped");
        }
    }
}
