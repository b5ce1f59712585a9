//! In-memory [`Transport`] double for tests.
//!
//! Records every call and answers through per-operation closures that may
//! also pick a delay, so tests can force responses to arrive out of order
//! under tokio's paused clock.

use super::{CallResult, DatasetRequest, Transport, UploadSummary};
use crate::domain::{Page, Query, Row};
use crate::upload::CandidateFile;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchPage(Query),
    FetchDataset(DatasetRequest),
    Create(Value),
    Update(String, Value),
    Delete(String),
    Upload(String),
}

type Responder<I, T> = Box<dyn Fn(&I) -> (Duration, CallResult<T>) + Send + Sync>;

pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    pages: Responder<Query, Page>,
    datasets: Responder<DatasetRequest, Vec<Row>>,
    uploads: Responder<CandidateFile, UploadSummary>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            pages: Box::new(|_| (Duration::ZERO, Ok(Page::default()))),
            datasets: Box::new(|_| (Duration::ZERO, Ok(Vec::new()))),
            uploads: Box::new(|_| (Duration::ZERO, Ok(UploadSummary::default()))),
        }
    }
}

impl MockTransport {
    pub fn with_pages(
        mut self,
        f: impl Fn(&Query) -> (Duration, CallResult<Page>) + Send + Sync + 'static,
    ) -> Self {
        self.pages = Box::new(f);
        self
    }

    pub fn with_datasets(
        mut self,
        f: impl Fn(&DatasetRequest) -> (Duration, CallResult<Vec<Row>>) + Send + Sync + 'static,
    ) -> Self {
        self.datasets = Box::new(f);
        self
    }

    pub fn with_uploads(
        mut self,
        f: impl Fn(&CandidateFile) -> (Duration, CallResult<UploadSummary>) + Send + Sync + 'static,
    ) -> Self {
        self.uploads = Box::new(f);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn page_queries(&self) -> Vec<Query> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::FetchPage(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// A page of `n` rows keyed `<prefix>-<i>`.
pub fn page_of(prefix: &str, n: usize, total: u32, offset: u32) -> Page {
    let items = (0..n)
        .map(|i| Row::new().with("id", format!("{prefix}-{i}").as_str()).with("name", prefix))
        .collect();
    Page { items, total, count: 0, offset }.normalized()
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch_page(&self, _collection: &str, query: &Query) -> CallResult<Page> {
        self.record(Call::FetchPage(query.clone()));
        let (delay, result) = (self.pages)(query);
        tokio::time::sleep(delay).await;
        result
    }

    async fn fetch_dataset(&self, request: &DatasetRequest) -> CallResult<Vec<Row>> {
        self.record(Call::FetchDataset(request.clone()));
        let (delay, result) = (self.datasets)(request);
        tokio::time::sleep(delay).await;
        result
    }

    async fn create(&self, _collection: &str, body: &Value) -> CallResult<Value> {
        self.record(Call::Create(body.clone()));
        Ok(body.clone())
    }

    async fn update(&self, _collection: &str, id: &str, body: &Value) -> CallResult<Value> {
        self.record(Call::Update(id.to_string(), body.clone()));
        Ok(body.clone())
    }

    async fn delete(&self, _collection: &str, id: &str) -> CallResult<Value> {
        self.record(Call::Delete(id.to_string()));
        Ok(Value::Null)
    }

    async fn upload(&self, _endpoint: &str, file: &CandidateFile) -> CallResult<UploadSummary> {
        self.record(Call::Upload(file.name.clone()));
        let (delay, result) = (self.uploads)(file);
        tokio::time::sleep(delay).await;
        result
    }
}
