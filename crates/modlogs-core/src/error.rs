//! Error types for the ModLogs decode pipeline.
//!
//! An unmatched selector is never an error: it shows up as an absent facet
//! on the record. Everything here is a genuine failure.

use thiserror::Error;

/// Errors that can occur while decoding a single call, log, or record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid raw log: {reason}")]
    InvalidRawEvent { reason: String },

    #[error("Invalid hex in '{field}': {reason}")]
    InvalidHex { field: String, reason: String },

    #[error("Invalid numeric value for '{field}': {value}")]
    InvalidNumeric { field: String, value: String },
}

/// Errors from loading or building a schema registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No schema for module '{module}' version '{version}'")]
    SchemaNotFound { module: String, version: String },

    #[error("Invalid ABI: {reason}")]
    InvalidAbi { reason: String },

    #[error("Duplicate function selector {selector}: '{first}' and '{second}'")]
    DuplicateSelector {
        selector: String,
        first: String,
        second: String,
    },

    #[error("Duplicate event signature {signature}: '{first}' and '{second}'")]
    DuplicateEventSignature {
        signature: String,
        first: String,
        second: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the transaction fetcher, log source, or module directory.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection refused, timeout, bad status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node or explorer has no record of the requested item.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Explorer API answered with a non-success status.
    #[error("API error: {message}")]
    Api { message: String },

    /// Rate limit exceeded.
    #[error("Rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// The module directory has no address for this module/version.
    #[error("Module '{module}' version '{version}' not found in directory")]
    ModuleNotFound { module: String, version: String },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl FetchError {
    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::RateLimited { .. })
    }
}
