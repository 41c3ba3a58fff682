//! Collaborator traits for the network side of the pipeline.
//!
//! Decoding is pure; everything that touches the network sits behind one of
//! these traits so the pipeline can be driven by mocks in tests.
//!
//! # Thread Safety
//! Implementations must be `Send + Sync` so a single instance can be shared
//! across all concurrent per-log tasks as `Arc<dyn ...>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::event::RawLog;

/// The original transaction behind a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction hash, 0x-prefixed
    pub hash: String,
    /// Call payload: 4-byte selector followed by ABI-encoded arguments
    pub input: Vec<u8>,
}

/// Filter for a log source query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    /// Contract address that emitted the logs
    pub address: String,
    /// Wallet address, matched against topics[1]
    pub wallet: String,
    pub from_block: u64,
    pub to_block: u64,
}

impl LogQuery {
    /// The wallet left-padded to a 32-byte topic: `0x000…0<20-byte address>`.
    pub fn wallet_topic(&self) -> String {
        let bare = self
            .wallet
            .strip_prefix("0x")
            .unwrap_or(&self.wallet)
            .to_lowercase();
        format!("0x{bare:0>64}")
    }
}

/// Fetches the transaction that emitted a log.
#[async_trait]
pub trait TransactionFetcher: Send + Sync {
    async fn fetch(&self, tx_hash: &str) -> Result<RawTransaction, FetchError>;
}

/// Supplies the ordered batch of raw logs to decode.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, FetchError>;
}

/// Resolves a module name and release version to its deployed address.
#[async_trait]
pub trait ModuleDirectory: Send + Sync {
    async fn resolve(&self, module: &str, version: &str) -> Result<String, FetchError>;
}
