//! Error types for the completion gateway.

use thiserror::Error;

/// Gateway error types.
///
/// `Unavailable` covers network failures, timeouts and upstream 5xx;
/// `Rejected` covers everything the provider refused (invalid request,
/// quota, content policy). Neither is retried within a request cycle.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid response format: {0}")]
    InvalidFormat(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Whether the failure is a reachability problem rather than a refusal.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, LlmError>;
