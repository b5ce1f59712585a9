//! Per-screen controller state and its projection.
//!
//! [`ScreenState`] composes the debounced input, request sequencer,
//! pagination, client-side view, selection and upload coordinator of one
//! screen. It is only mutated by [`handle_event`](super::handle_event); the
//! view reads [`ScreenState::compute_viewmodel`].

use super::actions::Action;
use super::modes::{DataMode, ScreenConfig};
use crate::domain::{ApiFailure, Page, Query, Row, SortSpec};
use crate::query::{Debouncer, Pagination, RequestSequencer};
use crate::table::{derive_view, Selection};
use crate::ui::viewmodel::{ErrorView, ListStatus, ViewModel};
use crate::upload::{ExtensionPolicy, UploadCoordinator};
use crate::Config;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScreenState {
    pub config: ScreenConfig,

    pub(crate) debouncer: Debouncer,
    pub(crate) sequencer: RequestSequencer,
    pub(crate) pagination: Pagination,
    pub(crate) selection: Selection,
    pub(crate) upload: UploadCoordinator,

    /// Latest raw input, shown in the search box.
    pub(crate) input: String,
    /// Search text of the authoritative query (after debounce).
    pub(crate) text: String,
    pub(crate) sort: Option<SortSpec>,

    /// Server mode: the applied page. Local mode: the whole dataset.
    pub(crate) rows: Vec<Row>,
    /// Local mode: filtered and sorted `rows`. Unused in server mode.
    pub(crate) view: Vec<Row>,
    pub(crate) loaded: bool,
    /// Server mode: the query whose page is in `rows`, at the page's offset.
    pub(crate) applied: Option<Query>,

    pub(crate) error: Option<ApiFailure>,
    pub(crate) notice: Option<String>,
    pub(crate) mutating: bool,
}

impl ScreenState {
    #[must_use]
    pub fn new(config: ScreenConfig, settings: &Config) -> Self {
        let policy = ExtensionPolicy::new(&settings.upload_extensions);
        let mut screen = config;
        if screen.upload_endpoint.is_some() {
            screen.upload_endpoint = Some(settings.upload_endpoint.clone());
        }
        Self {
            sort: screen.default_sort.clone(),
            config: screen,
            debouncer: Debouncer::new(Duration::from_millis(settings.debounce_ms)),
            sequencer: RequestSequencer::new(),
            pagination: Pagination::new(settings.page_limit),
            selection: Selection::default(),
            upload: UploadCoordinator::new(policy),
            input: String::new(),
            text: String::new(),
            rows: Vec::new(),
            view: Vec::new(),
            loaded: false,
            applied: None,
            error: None,
            notice: None,
            mutating: false,
        }
    }

    /// The query the next listing request would carry.
    #[must_use]
    pub fn current_query(&self) -> Query {
        Query {
            text: self.text.clone(),
            sort: self.sort.clone(),
            limit: self.pagination.limit(),
            offset: self.pagination.offset(),
        }
    }

    /// Makes the current query authoritative.
    ///
    /// Server mode sends it; local mode only re-derives the view.
    pub(crate) fn issue(&mut self) -> Vec<Action> {
        match &self.config.mode {
            DataMode::Server { collection } => {
                let collection = collection.clone();
                let query = self.current_query();
                let ticket = self.sequencer.submit(query);
                self.pagination.set_offset(ticket.query.offset);
                vec![Action::FetchPage { sequence: ticket.sequence, collection, query: ticket.query }]
            }
            DataMode::Local { .. } => {
                self.refresh_view();
                vec![]
            }
        }
    }

    /// Re-fetches from the backend in either mode.
    pub(crate) fn reload(&mut self) -> Vec<Action> {
        match &self.config.mode {
            DataMode::Server { .. } => self.issue(),
            DataMode::Local { dataset } => {
                let request = dataset.clone();
                let query = self.current_query();
                let ticket = self.sequencer.submit(query);
                vec![Action::FetchDataset { sequence: ticket.sequence, request }]
            }
        }
    }

    /// Re-derives the local view and clamps paging and selection onto it.
    pub(crate) fn refresh_view(&mut self) {
        if !self.config.mode.is_local() {
            return;
        }
        self.view = derive_view(&self.rows, &self.text, self.sort.as_ref(), &self.config.schema);
        self.pagination
            .set_total(u32::try_from(self.view.len()).unwrap_or(u32::MAX));
        self.selection.retain_in(&self.view, &self.config.schema.key_column);
    }

    pub(crate) fn apply_page(&mut self, page: Page) {
        self.pagination.apply(&page);
        self.applied = Some(self.current_query());
        self.rows = page.items;
        self.loaded = true;
        self.error = None;
        self.selection.retain_in(&self.rows, &self.config.schema.key_column);
    }

    pub(crate) fn apply_dataset(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.loaded = true;
        self.error = None;
        self.refresh_view();
    }

    /// Puts text, sort and position back onto the page still on screen.
    ///
    /// Page moves and searches update them before the request is sent; when
    /// that request fails the view must keep describing the rows it shows.
    pub(crate) fn roll_back(&mut self) {
        let Some(applied) = self.applied.clone() else {
            return;
        };
        tracing::debug!(
            query = %applied.text,
            offset = applied.offset,
            "rolled back to applied page"
        );
        self.text = applied.text;
        self.sort = applied.sort;
        self.pagination.restore(applied.limit, applied.offset);
    }

    /// Shows `failure` in the banner; whatever was applied last stays visible.
    pub(crate) fn fail(&mut self, failure: ApiFailure) {
        tracing::warn!(
            screen = %self.config.name,
            category = ?failure.category,
            status = ?failure.status,
            error = %failure,
            "request failed"
        );
        self.error = Some(failure);
    }

    /// Rows the selection is resolved against.
    fn selectable(&self) -> &[Row] {
        if self.config.mode.is_local() {
            &self.view
        } else {
            &self.rows
        }
    }

    /// True when `id` names a row in the current view.
    pub(crate) fn contains_key(&self, id: &str) -> bool {
        let key_column = &self.config.schema.key_column;
        self.selectable()
            .iter()
            .any(|row| row.key(key_column).as_deref() == Some(id))
    }

    /// Rows of the current page in display order.
    #[must_use]
    pub fn visible_items(&self) -> &[Row] {
        if !self.config.mode.is_local() {
            return &self.rows;
        }
        let len = self.view.len();
        let start = (self.pagination.offset() as usize).min(len);
        let end = start.saturating_add(self.pagination.limit() as usize).min(len);
        &self.view[start..end]
    }

    #[must_use]
    pub fn selected_row(&self) -> Option<&Row> {
        self.selection
            .resolve(self.selectable(), &self.config.schema.key_column)
    }

    fn list_status(&self) -> ListStatus {
        if !self.loaded {
            return ListStatus::NotLoaded;
        }
        let total = self.pagination.total();
        let query = self.text.trim();
        match (query.is_empty(), total) {
            (true, _) => ListStatus::ShowingAll { total },
            (false, 0) => ListStatus::NoRowsFound { query: query.to_string() },
            (false, total) => ListStatus::Filtered { query: query.to_string(), total },
        }
    }

    /// Projects the state into what the view renders.
    #[must_use]
    pub fn compute_viewmodel(&self) -> ViewModel {
        let items = self.visible_items().to_vec();
        ViewModel {
            screen: self.config.name.clone(),
            mode: self.config.mode.label(),
            count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            items,
            total: self.pagination.total(),
            offset: self.pagination.offset(),
            limit: self.pagination.limit(),
            can_next: self.pagination.has_next(),
            can_prev: self.pagination.has_prev(),
            query: self.input.clone(),
            sort: self.sort.clone(),
            loading: self.sequencer.is_loading(),
            mutating: self.mutating,
            selected: self.selected_row().cloned(),
            status: self.list_status(),
            error: self.error.as_ref().map(ErrorView::from),
            notice: self.notice.clone(),
            upload: self.upload.state().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio(id: i32, name: &str) -> Row {
        Row::new().with("id", id).with("name", name)
    }

    #[test]
    fn test_local_view_pages_client_side() {
        let settings = Config { page_limit: 2, ..Config::default() };
        let mut state = ScreenState::new(ScreenConfig::portfolios(), &settings);
        state.apply_dataset(vec![
            portfolio(1, "Delta"),
            portfolio(2, "alpha"),
            portfolio(3, "Charlie"),
        ]);

        let vm = state.compute_viewmodel();
        let names: Vec<_> = vm.items.iter().map(|r| r.get("name").display()).collect();
        assert_eq!(names, vec!["alpha", "Charlie"]);
        assert_eq!((vm.total, vm.count, vm.can_next), (3, 2, true));
        assert_eq!(vm.status, ListStatus::ShowingAll { total: 3 });
    }

    #[test]
    fn test_server_upload_endpoint_follows_settings() {
        let settings = Config { upload_endpoint: "/v2/upload".into(), ..Config::default() };
        let state = ScreenState::new(ScreenConfig::assets(), &settings);
        assert_eq!(state.config.upload_endpoint.as_deref(), Some("/v2/upload"));

        let portfolios = ScreenState::new(ScreenConfig::portfolios(), &settings);
        assert_eq!(portfolios.config.upload_endpoint, None);
    }
}
