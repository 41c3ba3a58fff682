//! The per-log pipeline: one raw log plus its transaction in, one enriched
//! record out. Pure and deterministic; no I/O.

use modlogs_core::{
    error::DecodeError,
    event::RawLog,
    record::{EnrichedRecord, NumericFields},
    source::RawTransaction,
};
use modlogs_evm::{
    DispatchConfig, DispatchResolver, EvmCallDecoder, EvmEventDecoder, OutcomeConfig,
    OutcomeCorrelator,
};
use modlogs_registry::AbiRegistry;
use std::sync::Arc;

use crate::config::PipelineConfig;

/// Call decoder → dispatch resolver → event decoder → outcome correlator,
/// merged with the numeric fields of the log.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    resolver: DispatchResolver,
    events: EvmEventDecoder,
    outcome: OutcomeCorrelator,
}

impl RecordDecoder {
    pub fn new(registry: Arc<AbiRegistry>, dispatch: DispatchConfig, outcome: OutcomeConfig) -> Self {
        Self {
            outcome: OutcomeCorrelator::new(&registry, outcome),
            events: EvmEventDecoder::new(registry.clone()),
            resolver: DispatchResolver::new(EvmCallDecoder::new(registry), dispatch),
        }
    }

    pub fn from_config(registry: Arc<AbiRegistry>, config: &PipelineConfig) -> Self {
        Self::new(registry, config.dispatch.clone(), config.outcome.clone())
    }

    /// Decode one log against the transaction that emitted it.
    pub fn decode(&self, log: &RawLog, tx: &RawTransaction) -> Result<EnrichedRecord, DecodeError> {
        let numeric = NumericFields::from_log(log)?;

        let mut call = self.resolver.decode(&tx.input)?;
        if let Some(call) = call.as_mut() {
            if self.resolver.is_dispatch(call) {
                self.outcome.apply(call, log)?;
            }
        }

        let event = self.events.decode(log)?;

        tracing::debug!(
            tx_hash = %log.transaction_hash,
            function = call.as_ref().map(|c| c.function_name.as_str()).unwrap_or("-"),
            inner = call.as_ref().and_then(|c| c.inner_function_name()).unwrap_or("-"),
            event = event.as_ref().map(|e| e.name.as_str()).unwrap_or("-"),
            "decoded record"
        );

        Ok(EnrichedRecord {
            log: log.clone(),
            numeric,
            event,
            call,
        })
    }
}
