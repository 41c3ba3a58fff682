//! Transaction fetcher over JSON-RPC (`eth_getTransactionByHash`).

use async_trait::async_trait;
use modlogs_core::{
    error::FetchError,
    event::parse_hex_bytes,
    source::{RawTransaction, TransactionFetcher},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::transport::RpcTransport;

/// The subset of an RPC transaction object the pipeline needs.
#[derive(Debug, Deserialize)]
struct RpcTransaction {
    hash: String,
    input: String,
}

/// Fetches transaction input payloads from a JSON-RPC node.
pub struct RpcTransactionFetcher {
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl RpcTransactionFetcher {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl TransactionFetcher for RpcTransactionFetcher {
    async fn fetch(&self, tx_hash: &str) -> Result<RawTransaction, FetchError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tx: Option<RpcTransaction> = self
            .transport
            .call(id, "eth_getTransactionByHash", vec![json!(tx_hash)])
            .await?;

        let tx = tx.ok_or_else(|| FetchError::NotFound(format!("transaction {tx_hash}")))?;
        let input = parse_hex_bytes("input", &tx.input)
            .map_err(|e| FetchError::Api {
                message: format!("malformed transaction {tx_hash}: {e}"),
            })?;

        tracing::debug!(tx_hash, input_len = input.len(), "fetched transaction");
        Ok(RawTransaction {
            hash: tx.hash,
            input,
        })
    }
}
