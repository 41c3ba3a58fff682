//! End-to-end scan of one module for one wallet.
//!
//! Loads the module schema, resolves its deployed address, pulls the logs
//! that mention the wallet and runs them through the batch engine.

use modlogs_core::source::{LogQuery, LogSource, ModuleDirectory, TransactionFetcher};
use modlogs_registry::SchemaSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::config::PipelineConfig;
use crate::decoder::RecordDecoder;
use crate::engine::{BatchSummary, LogPipeline, RecordOutcome};
use crate::error::PipelineError;
use crate::filter::MethodFilter;

/// What to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub module: String,
    pub version: String,
    pub wallet: String,
    pub from_block: u64,
    pub to_block: u64,
    /// Keep only records whose outer or inner call has this name; empty keeps all
    #[serde(default)]
    pub method: String,
}

impl ScanRequest {
    pub fn new(
        module: impl Into<String>,
        version: impl Into<String>,
        wallet: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
            wallet: wallet.into(),
            from_block: 0,
            to_block: u64::MAX,
            method: String::new(),
        }
    }

    pub fn blocks(mut self, from: u64, to: u64) -> Self {
        self.from_block = from;
        self.to_block = to;
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    /// Deployed address the logs were pulled from
    pub address: String,
    /// Records left after the method filter, in log order
    pub records: Vec<RecordOutcome>,
    /// Counters over the whole batch, before filtering
    pub summary: BatchSummary,
}

/// Wires the schema source, module directory, log source and transaction
/// fetcher into one scan operation.
pub struct ModuleScanner {
    schemas: Arc<dyn SchemaSource>,
    directory: Arc<dyn ModuleDirectory>,
    logs: Arc<dyn LogSource>,
    fetcher: Arc<dyn TransactionFetcher>,
    config: PipelineConfig,
}

impl ModuleScanner {
    pub fn new(
        schemas: Arc<dyn SchemaSource>,
        directory: Arc<dyn ModuleDirectory>,
        logs: Arc<dyn LogSource>,
        fetcher: Arc<dyn TransactionFetcher>,
    ) -> Self {
        Self {
            schemas,
            directory,
            logs,
            fetcher,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanReport, PipelineError> {
        let registry = Arc::new(self.schemas.load(&request.version, &request.module)?);

        let address = self
            .directory
            .resolve(&request.module, &request.version)
            .await
            .map_err(PipelineError::Directory)?;
        info!(
            module = %request.module,
            version = %request.version,
            address = %address,
            "resolved module"
        );

        let query = LogQuery {
            address: address.clone(),
            wallet: request.wallet.clone(),
            from_block: request.from_block,
            to_block: request.to_block,
        };
        let logs = self.logs.logs(&query).await.map_err(PipelineError::Logs)?;
        info!(
            logs = logs.len(),
            from = request.from_block,
            to = request.to_block,
            "fetched logs"
        );

        let decoder = Arc::new(RecordDecoder::from_config(registry, &self.config));
        let pipeline = LogPipeline::new(decoder, self.fetcher.clone(), self.config.clone());
        let output = pipeline.run(&logs).await?;

        let records = MethodFilter::new(request.method.as_str()).apply(output.records);
        info!(
            matched = records.len(),
            method = %request.method,
            "scan complete"
        );

        Ok(ScanReport {
            address,
            records,
            summary: output.summary,
        })
    }
}
