//! reqwest-backed [`Transport`].

use super::classify::{classify_malformed_body, classify_status, classify_transport_error};
use super::messages::{DatasetBody, DatasetRequest, UploadSummary};
use super::{CallResult, Transport};
use crate::domain::{ApiFailure, Page, Query, RefdeskError, Result, Row};
use crate::upload::CandidateFile;
use crate::Config;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Request, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;

/// HTTP client for the reference-data API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns a configuration error when `base_url` is not an absolute URL
    /// or the underlying client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration, upload_timeout: Duration) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| RefdeskError::Config(format!("invalid base_url {base_url:?}: {e}")))?;

        // No default Content-Type: multipart bodies need reqwest to set it
        // together with the boundary.
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|e| RefdeskError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_timeout,
        })
    }

    /// # Errors
    ///
    /// See [`HttpTransport::new`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.upload_timeout_secs),
        )
    }

    /// Joins `path` onto the base URL, keeping any path prefix of the base.
    fn url(&self, path: &str) -> CallResult<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| ApiFailure::request(format!("invalid URL {joined:?}: {e}")))
    }

    pub(crate) fn page_url(&self, collection: &str, query: &Query) -> CallResult<Url> {
        let mut url = self.url(collection)?;
        url.query_pairs_mut().extend_pairs(query.to_params());
        Ok(url)
    }

    pub(crate) fn dataset_url(&self, request: &DatasetRequest) -> CallResult<Url> {
        let mut url = self.url(&request.path)?;
        if !request.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.params);
        }
        Ok(url)
    }

    pub(crate) fn item_url(&self, collection: &str, id: &str) -> CallResult<Url> {
        let mut url = self.url(collection)?;
        url.path_segments_mut()
            .map_err(|()| ApiFailure::request(format!("{collection:?} cannot take a path segment")))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Builds the multipart upload request without sending it.
    ///
    /// # Errors
    ///
    /// `Request` category when the URL or body cannot be assembled.
    pub fn upload_request(&self, endpoint: &str, file: &CandidateFile) -> CallResult<Request> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);
        self.client
            .post(self.url(endpoint)?)
            .timeout(self.upload_timeout)
            .multipart(form)
            .build()
            .map_err(|e| classify_transport_error(&e))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> CallResult<T> {
        let response = builder.send().await.map_err(|e| classify_transport_error(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport_error(&e))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "request failed");
            return Err(classify_status(status.as_u16(), &body));
        }

        let text = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(text).map_err(|e| classify_malformed_body(status.as_u16(), &body, &e))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_page(&self, collection: &str, query: &Query) -> CallResult<Page> {
        let url = self.page_url(collection, query)?;
        let page: Page = self
            .send(self.client.get(url))
            .instrument(tracing::debug_span!("fetch_page", collection, offset = query.offset))
            .await?;
        Ok(page.normalized())
    }

    async fn fetch_dataset(&self, request: &DatasetRequest) -> CallResult<Vec<Row>> {
        let url = self.dataset_url(request)?;
        let body: DatasetBody = self
            .send(self.client.get(url))
            .instrument(tracing::debug_span!("fetch_dataset", path = %request.path))
            .await?;
        Ok(body.into_rows())
    }

    async fn create(&self, collection: &str, body: &Value) -> CallResult<Value> {
        let url = self.url(collection)?;
        self.send(self.client.post(url).json(body))
            .instrument(tracing::debug_span!("create", collection))
            .await
    }

    async fn update(&self, collection: &str, id: &str, body: &Value) -> CallResult<Value> {
        let url = self.item_url(collection, id)?;
        self.send(self.client.put(url).json(body))
            .instrument(tracing::debug_span!("update", collection, id))
            .await
    }

    async fn delete(&self, collection: &str, id: &str) -> CallResult<Value> {
        let url = self.item_url(collection, id)?;
        self.send(self.client.delete(url))
            .instrument(tracing::debug_span!("delete", collection, id))
            .await
    }

    async fn upload(&self, endpoint: &str, file: &CandidateFile) -> CallResult<UploadSummary> {
        let request = self.upload_request(endpoint, file)?;
        let response = self
            .client
            .execute(request)
            .instrument(tracing::debug_span!("upload", endpoint, file_name = %file.name))
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport_error(&e))?;
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| classify_malformed_body(status.as_u16(), &body, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCategory, SortSpec};
    use reqwest::header::CONTENT_TYPE;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, Duration::from_secs(30), Duration::from_secs(600)).unwrap()
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let err = HttpTransport::new("localhost", Duration::from_secs(1), Duration::from_secs(1));
        assert!(matches!(err, Err(RefdeskError::Config(_))));
    }

    #[test]
    fn test_page_url_carries_query_params() {
        let mut query = Query::new(20);
        query.text = "msci world".into();
        query.offset = 40;
        query.sort = Some(SortSpec::desc("name"));

        let url = transport("http://localhost:8000/").page_url("/referential/assets", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/referential/assets?q=msci+world&limit=20&offset=40&sort=name&dir=desc"
        );
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let url = transport("http://host/api").item_url("/admin/portfolio", "7").unwrap();
        assert_eq!(url.as_str(), "http://host/api/admin/portfolio/7");
    }

    #[test]
    fn test_dataset_url_repeats_keys() {
        let request = DatasetRequest::new("/etfbook/analytics/dynamic-data")
            .param("isins", "IE00B4L5Y983")
            .param("isins", "LU0274208692")
            .param("b_milion", "true");
        let url = transport("http://localhost:8000").dataset_url(&request).unwrap();
        assert_eq!(
            url.query(),
            Some("isins=IE00B4L5Y983&isins=LU0274208692&b_milion=true")
        );
    }

    #[test]
    fn test_upload_lets_reqwest_set_the_boundary() {
        let file = CandidateFile::new("assets.xlsx", b"PK\x03\x04".to_vec());
        let request = transport("http://localhost:8000")
            .upload_request("/referential/upload-excel", &file)
            .unwrap();

        let content_type = request.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(request.timeout(), Some(&Duration::from_secs(600)));
        assert_eq!(request.url().path(), "/referential/upload-excel");
    }

    #[tokio::test]
    async fn test_upload_past_ceiling_is_a_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let transport = HttpTransport::new(
            &format!("http://{addr}"),
            Duration::from_secs(30),
            Duration::from_millis(50),
        )
        .unwrap();
        let file = CandidateFile::new("assets.xlsx", b"PK\x03\x04".to_vec());
        let failure = transport
            .upload("/referential/upload-excel", &file)
            .await
            .unwrap_err();

        assert_eq!(failure.category, ErrorCategory::Timeout);
        server.abort();
    }
}
