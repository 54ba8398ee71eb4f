//! Error types for Mandrill API calls.

use reqwest::StatusCode;
use serde::Deserialize;

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced an HTTP response (DNS, connect, timeout),
    /// or the underlying HTTP client could not be built.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Mandrill answered with a non-200 status and a structured error body.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Mandrill answered with a non-200 status and a body that is not an error object.
    #[error("mandrill: unknown error happened (HTTP {status})")]
    UnknownResponse { status: StatusCode, body: String },

    /// A successful response whose body could not be parsed.
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error payload returned by Mandrill on failed calls.
///
/// ```json
/// {"status": "error", "code": -1, "name": "Invalid_Key", "message": "Invalid API key"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("mandrill: {name}: {message}")]
pub struct ApiError {
    /// Always `"error"` for error payloads.
    pub status: String,
    /// Provider error code.
    pub code: i64,
    /// Error class, e.g. `Invalid_Key` or `ValidationError`.
    pub name: String,
    /// Human readable description.
    pub message: String,
}

impl Error {
    /// The provider error, if Mandrill reported one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}
