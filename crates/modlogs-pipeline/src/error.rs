//! Batch-level errors.

use modlogs_core::error::{DecodeError, FetchError, RegistryError};
use thiserror::Error;

/// Errors that abort a batch or a scan.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("log {index} (tx {tx_hash}): fetch failed: {source}")]
    Fetch {
        index: usize,
        tx_hash: String,
        source: FetchError,
    },

    #[error("log {index} (tx {tx_hash}): decode failed: {source}")]
    Decode {
        index: usize,
        tx_hash: String,
        source: DecodeError,
    },

    #[error("log source failed: {0}")]
    Logs(#[source] FetchError),

    #[error("module directory failed: {0}")]
    Directory(#[source] FetchError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl PipelineError {
    /// Index of the failing log, for per-record failures.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Fetch { index, .. } | Self::Decode { index, .. } => Some(*index),
            _ => None,
        }
    }
}
