//! Transport-level error types.

use modlogs_core::error::FetchError;
use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur during an RPC transport operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, bad status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Rate limit exceeded; caller should back off.
    #[error("Rate limit exceeded (provider: {provider})")]
    RateLimited { provider: String },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns `true` if this error is retryable (transient).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::RateLimited { .. })
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http(msg) => FetchError::Http(msg),
            TransportError::Rpc(e) => FetchError::Rpc {
                code: e.code,
                message: e.message,
            },
            TransportError::RateLimited { provider } => FetchError::RateLimited {
                source_name: provider,
            },
            TransportError::Deserialization(e) => FetchError::Deserialization(e),
        }
    }
}

/// Map a reqwest failure onto the fetch taxonomy.
pub(crate) fn http_error(err: reqwest::Error) -> FetchError {
    FetchError::Http(err.to_string())
}
