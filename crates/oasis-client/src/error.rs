//! Error types for the API client.

use thiserror::Error;

/// Errors that can occur when talking to the RD-OASIS API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    /// Request body was rejected before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] oasis_core::CoreError),

    /// Response body did not match the expected record shape.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Returns true for a 404 from the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
