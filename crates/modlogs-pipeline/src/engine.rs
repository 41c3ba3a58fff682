//! `LogPipeline`: fetches the transactions behind a batch of logs and
//! decodes every log into an enriched record.
//!
//! Stage 1 fetches each distinct transaction once, with at most
//! `concurrency` requests in flight. Stage 2 decodes all logs in parallel on
//! the Rayon pool. Output order always matches input order.

use futures::stream::{self, StreamExt};
use modlogs_core::{
    error::{DecodeError, FetchError},
    event::RawLog,
    record::EnrichedRecord,
    source::{RawTransaction, TransactionFetcher},
};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{FailurePolicy, PipelineConfig};
use crate::decoder::RecordDecoder;
use crate::error::PipelineError;

/// One slot of the batch output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordOutcome {
    Decoded(EnrichedRecord),
    /// Only produced under `FailurePolicy::Graceful`
    Failed {
        index: usize,
        tx_hash: String,
        error: String,
    },
}

impl RecordOutcome {
    pub fn record(&self) -> Option<&EnrichedRecord> {
        match self {
            Self::Decoded(r) => Some(r),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Flat JSON for a decoded record, an `{ index, transactionHash, error }`
    /// marker for a failed one.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Decoded(r) => r.to_json(),
            Self::Failed {
                index,
                tx_hash,
                error,
            } => json!({
                "index": index,
                "transactionHash": tx_hash,
                "error": error,
            }),
        }
    }
}

/// Counters for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub decoded: usize,
    pub failed: usize,
    pub unique_transactions: usize,
    pub with_event: usize,
    pub with_call: usize,
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutput {
    pub records: Vec<RecordOutcome>,
    pub summary: BatchSummary,
}

impl BatchOutput {
    pub fn decoded(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.records.iter().filter_map(RecordOutcome::record)
    }
}

type FetchedTx = Result<Arc<RawTransaction>, Arc<FetchError>>;

enum Failure {
    Fetch(Arc<FetchError>),
    Decode(DecodeError),
}

/// Batch engine.
pub struct LogPipeline {
    decoder: Arc<RecordDecoder>,
    fetcher: Arc<dyn TransactionFetcher>,
    config: PipelineConfig,
}

impl LogPipeline {
    pub fn new(
        decoder: Arc<RecordDecoder>,
        fetcher: Arc<dyn TransactionFetcher>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            decoder,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over `logs`.
    pub async fn run(&self, logs: &[RawLog]) -> Result<BatchOutput, PipelineError> {
        info!(
            logs = logs.len(),
            concurrency = self.config.concurrency,
            policy = ?self.config.failure_policy,
            "starting batch"
        );

        let txs = self.fetch_all(logs).await?;
        let unique_transactions = txs.len();

        let decoder = &self.decoder;
        let decoded: Vec<Result<EnrichedRecord, Failure>> = logs
            .par_iter()
            .map(|log| match txs.get(&log.transaction_hash) {
                Some(Ok(tx)) => decoder.decode(log, tx).map_err(Failure::Decode),
                Some(Err(fetch)) => Err(Failure::Fetch(fetch.clone())),
                None => Err(Failure::Fetch(Arc::new(FetchError::NotFound(
                    log.transaction_hash.clone(),
                )))),
            })
            .collect();

        let mut records = Vec::with_capacity(logs.len());
        for (index, (log, result)) in logs.iter().zip(decoded).enumerate() {
            let tx_hash = log.transaction_hash.clone();
            let error = match result {
                Ok(record) => {
                    records.push(RecordOutcome::Decoded(record));
                    continue;
                }
                Err(Failure::Fetch(fetch)) => fetch.to_string(),
                Err(Failure::Decode(source)) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        return Err(PipelineError::Decode {
                            index,
                            tx_hash,
                            source,
                        })
                    }
                    FailurePolicy::Graceful => source.to_string(),
                },
            };
            warn!(index, tx_hash = %tx_hash, %error, "record failed");
            records.push(RecordOutcome::Failed {
                index,
                tx_hash,
                error,
            });
        }

        let summary = summarize(&records, unique_transactions);
        info!(
            total = summary.total,
            decoded = summary.decoded,
            failed = summary.failed,
            transactions = summary.unique_transactions,
            "batch complete"
        );
        Ok(BatchOutput { records, summary })
    }

    /// Stage 1: fetch every distinct transaction once, in first-occurrence order.
    ///
    /// Under fail-fast the first failing fetch aborts the stage and drops
    /// every request still in flight.
    async fn fetch_all(
        &self,
        logs: &[RawLog],
    ) -> Result<HashMap<String, FetchedTx>, PipelineError> {
        let mut seen = HashSet::new();
        let mut first_index = Vec::new();
        for (index, log) in logs.iter().enumerate() {
            if seen.insert(log.transaction_hash.as_str()) {
                first_index.push((index, log.transaction_hash.clone()));
            }
        }

        let mut fetches = stream::iter(first_index)
            .map(|(index, hash)| {
                let fetcher = self.fetcher.clone();
                async move {
                    let result = fetcher.fetch(&hash).await;
                    (index, hash, result)
                }
            })
            .buffered(self.config.concurrency.max(1));

        let mut txs = HashMap::new();
        while let Some((index, hash, result)) = fetches.next().await {
            match result {
                Ok(tx) => {
                    txs.insert(hash, Ok(Arc::new(tx)));
                }
                Err(source) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        return Err(PipelineError::Fetch {
                            index,
                            tx_hash: hash,
                            source,
                        })
                    }
                    FailurePolicy::Graceful => {
                        warn!(index, tx_hash = %hash, error = %source, "transaction fetch failed");
                        txs.insert(hash, Err(Arc::new(source)));
                    }
                },
            }
        }
        Ok(txs)
    }
}

fn summarize(records: &[RecordOutcome], unique_transactions: usize) -> BatchSummary {
    let mut summary = BatchSummary {
        total: records.len(),
        unique_transactions,
        ..Default::default()
    };
    for outcome in records {
        match outcome {
            RecordOutcome::Decoded(r) => {
                summary.decoded += 1;
                summary.with_event += usize::from(r.event.is_some());
                summary.with_call += usize::from(r.call.is_some());
            }
            RecordOutcome::Failed { .. } => summary.failed += 1,
        }
    }
    summary
}
