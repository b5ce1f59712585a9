//! Error types for refdesk.
//!
//! Two layers of error live here. [`RefdeskError`] is the crate-level error
//! returned by fallible library calls (configuration, I/O, runtime plumbing).
//! [`ApiFailure`] is the value a screen exposes to its view when an
//! interaction ends badly: it carries a [`ErrorCategory`] plus whatever the
//! server said, without interpreting it.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The main error type for refdesk operations.
///
/// # Examples
///
/// ```
/// use refdesk::RefdeskError;
///
/// fn check_limit(limit: u32) -> Result<(), RefdeskError> {
///     if limit == 0 {
///         return Err(RefdeskError::Config("page_limit must be positive".to_string()));
///     }
///     Ok(())
/// }
/// assert!(check_limit(0).is_err());
/// ```
#[derive(Debug, Error)]
pub enum RefdeskError {
    /// Configuration is invalid, missing, or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A remote call failed in a way the caller has to see.
    #[error("API error: {0}")]
    Api(#[from] ApiFailure),

    /// Input was rejected before anything was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The screen runtime is gone (event loop stopped or channel closed).
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// A specialized `Result` type for refdesk operations.
pub type Result<T> = std::result::Result<T, RefdeskError>;

/// Why a client-side check rejected an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// File name does not carry an allow-listed extension.
    InvalidFormat,
    /// File has no content.
    EmptyFile,
    /// A form field failed validation (blank name, inverted date range...).
    InvalidField,
}

/// Categorized HTTP status returned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "code")]
pub enum ServerStatus {
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 405
    MethodNotAllowed,
    /// 500
    InternalError,
    /// Any other non-success status.
    Unexpected(u16),
}

/// Error category surfaced to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected client-side, nothing was sent.
    Validation(ValidationKind),
    /// No HTTP exchange completed (connection refused, DNS, reset...).
    Network,
    /// The request exceeded its timeout ceiling.
    Timeout,
    /// The server answered with a non-success status.
    Server(ServerStatus),
    /// The request could not be constructed before any transport attempt.
    Request,
}

/// Terminal failure of a search, upload or mutation, as exposed to the view.
///
/// `status` and `payload` are only present when the server actually answered.
/// The payload is kept verbatim; the crate never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub category: ErrorCategory,
    pub status: Option<u16>,
    pub payload: Option<Value>,
    pub message: String,
}

impl ApiFailure {
    /// Builds a client-side validation failure.
    #[must_use]
    pub fn validation(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Validation(kind),
            status: None,
            payload: None,
            message: message.into(),
        }
    }

    /// Builds a failure for a request that never got an HTTP response.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Network,
            status: None,
            payload: None,
            message: message.into(),
        }
    }

    /// Builds a failure for a request that ran past its timeout.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Timeout,
            status: None,
            payload: None,
            message: message.into(),
        }
    }

    /// Builds a failure for a request that could not be constructed.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Request,
            status: None,
            payload: None,
            message: message.into(),
        }
    }

    /// Returns true for failures detected before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.category, ErrorCategory::Validation(_))
    }

    /// Default human-readable message for the category.
    ///
    /// Screens are free to show [`ApiFailure::message`] instead; this is the
    /// uniform fallback so that no screen has to duplicate the mapping.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self.category {
            ErrorCategory::Validation(ValidationKind::InvalidFormat) => {
                "Unsupported file format."
            }
            ErrorCategory::Validation(ValidationKind::EmptyFile) => "The selected file is empty.",
            ErrorCategory::Validation(ValidationKind::InvalidField) => {
                "Some fields are invalid."
            }
            ErrorCategory::Network => "No response received from the server.",
            ErrorCategory::Timeout => "The server took too long to respond.",
            ErrorCategory::Request => "The request could not be prepared.",
            ErrorCategory::Server(ServerStatus::Unauthorized) => "Unauthorized.",
            ErrorCategory::Server(ServerStatus::Forbidden) => "Forbidden.",
            ErrorCategory::Server(ServerStatus::MethodNotAllowed) => "Method not allowed.",
            ErrorCategory::Server(ServerStatus::InternalError) => "Internal server error.",
            ErrorCategory::Server(ServerStatus::Unexpected(_)) => "Unexpected server response.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_has_no_status() {
        let failure = ApiFailure::validation(ValidationKind::InvalidFormat, "report.pdf");
        assert!(failure.is_validation());
        assert_eq!(failure.status, None);
        assert_eq!(failure.user_message(), "Unsupported file format.");
    }

    #[test]
    fn test_api_failure_converts_into_crate_error() {
        let err: RefdeskError = ApiFailure::network("connection refused").into();
        assert_eq!(err.to_string(), "API error: connection refused");
    }
}
