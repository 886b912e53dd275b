//! Error taxonomy for backend API calls.

use reqwest::StatusCode;

/// Marker the backend puts in 401 messages for blacklisted access tokens.
pub const BLACKLIST_MARKER: &str = "블랙리스트";

/// Error raised by `FilmlogClient` requests.
///
/// Call sites propagate it through `anyhow::Error`; use
/// [`ApiError::from_anyhow`] to recover the class when branching on it.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ApiError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("backend error (HTTP {status}): {message}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// `msg`/`message` field of the error body, or the raw body.
        message: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        /// Request path relative to the base URL.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Rejected on the client before any request was sent.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ApiError {
    /// Returns the HTTP status for `Status` errors.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for HTTP 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// True for HTTP 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// True for a 401 whose message carries the blacklist marker.
    #[must_use]
    pub fn is_blacklisted(&self) -> bool {
        match self {
            Self::Status { status, message } => {
                *status == StatusCode::UNAUTHORIZED && message.contains(BLACKLIST_MARKER)
            }
            _ => false,
        }
    }

    /// Finds an `ApiError` anywhere in an `anyhow` error chain.
    #[must_use]
    pub fn from_anyhow(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}
