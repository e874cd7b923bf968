use resto_core::error::CoreError;

use crate::storage::StorageError;

/// Errors surfaced by the client library.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A domain-level error from `resto_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Persistent session storage could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// [`crate::context::current`] was called outside [`crate::context::scope`].
    #[error("Session store accessed outside of a session scope")]
    OutsideSessionScope,
}

impl ClientError {
    /// HTTP status of an [`ClientError::Api`] error, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience type alias for client results.
pub type ClientResult<T> = Result<T, ClientError>;
