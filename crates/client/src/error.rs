//! Error types for the LapShop API client.

use thiserror::Error;

/// Errors that can occur when calling the LapShop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failure (connection refused, timeout, TLS, ...).
    /// Propagated untouched; never triggers the refresh protocol.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered, but the success body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Non-success status with the backend's message extracted verbatim.
    /// Covers validation (4xx) and domain errors (e.g., insufficient stock).
    #[error("API error (HTTP {status}): {message}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The session could not be recovered: refresh token missing or rejected,
    /// or a retried request was rejected a second time. Local session state
    /// has already been cleared when this is returned.
    #[error("Session expired - sign in again")]
    SessionExpired,

    /// The request requires authentication but no access token is stored.
    #[error("No access token - sign in first")]
    MissingToken,

    /// The request URL could not be constructed.
    #[error("Invalid request URL: {0}")]
    Url(String),
}

impl ApiError {
    /// Whether this error is the fatal end of the refresh protocol.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// The backend's message for status errors, if any.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => Some(message),
            _ => None,
        }
    }
}
