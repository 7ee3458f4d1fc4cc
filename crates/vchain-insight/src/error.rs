//! Insight error types

use thiserror::Error;

/// Failures of a remote insight provider
///
/// These never reach [`crate::InsightService`] callers; the client logs them
/// and falls back to the canned insight.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Could not build the HTTP client
    #[error("http client setup failed: {0}")]
    Setup(String),

    /// Request failed before a response arrived (DNS, TLS, timeout)
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    /// Non-success status from the API
    #[error("api returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for InsightError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}
