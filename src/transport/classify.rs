//! Mapping of transport outcomes onto [`ErrorCategory`].
//!
//! Every screen goes through these two functions so the status-to-category
//! table exists exactly once.

use crate::domain::{ApiFailure, ErrorCategory, ServerStatus};
use serde_json::Value;

/// Categorizes a non-success HTTP status.
#[must_use]
pub const fn server_status(status: u16) -> ServerStatus {
    match status {
        401 => ServerStatus::Unauthorized,
        403 => ServerStatus::Forbidden,
        405 => ServerStatus::MethodNotAllowed,
        500 => ServerStatus::InternalError,
        other => ServerStatus::Unexpected(other),
    }
}

/// Keeps the body verbatim: parsed JSON when it is JSON, a string otherwise.
fn payload_of(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

/// Builds the failure for a response that arrived with a non-success status.
#[must_use]
pub fn classify_status(status: u16, body: &str) -> ApiFailure {
    let mut failure = ApiFailure {
        category: ErrorCategory::Server(server_status(status)),
        status: Some(status),
        payload: payload_of(body),
        message: String::new(),
    };
    failure.message = format!("{} (HTTP {status})", failure.user_message());
    failure
}

/// Builds the failure for a success status whose body could not be decoded.
#[must_use]
pub fn classify_malformed_body(status: u16, body: &str, error: &serde_json::Error) -> ApiFailure {
    ApiFailure {
        category: ErrorCategory::Server(ServerStatus::Unexpected(status)),
        status: Some(status),
        payload: payload_of(body),
        message: format!("Malformed response body: {error}"),
    }
}

/// Categorizes a failure where no usable HTTP exchange completed.
#[must_use]
pub fn classify_transport_error(error: &reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::timeout(format!("Request timed out: {error}"))
    } else if error.is_builder() {
        ApiFailure::request(format!("Request could not be built: {error}"))
    } else {
        ApiFailure::network(format!("No response received: {error}"))
    }
}
