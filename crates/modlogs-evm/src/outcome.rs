//! Success/failure correlation for dispatch calls.
//!
//! The dispatch function emits a result event whose indexed `success` flag
//! sits in a fixed topic position. A log whose topic0 is any other event says
//! nothing about failure, so the call counts as successful.

use modlogs_core::{
    call::DecodedCall,
    error::DecodeError,
    event::RawLog,
    fingerprint::event_signature,
};
use modlogs_registry::AbiRegistry;
use serde::{Deserialize, Serialize};

/// Which event reports the dispatch outcome and where its flag lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeConfig {
    #[serde(default = "default_event")]
    pub event: String,
    /// Index into `topics` of the success flag
    #[serde(default = "default_topic_index")]
    pub topic_index: usize,
}

fn default_event() -> String {
    "TransactionExecuted".into()
}

fn default_topic_index() -> usize {
    2
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            event: default_event(),
            topic_index: default_topic_index(),
        }
    }
}

/// Derives the success flag of a dispatch call from its log.
#[derive(Debug, Clone)]
pub struct OutcomeCorrelator {
    /// Signature hash of the result event; `None` if the schema lacks it
    signature: Option<[u8; 32]>,
    config: OutcomeConfig,
}

impl OutcomeCorrelator {
    pub fn new(registry: &AbiRegistry, config: OutcomeConfig) -> Self {
        let signature = registry
            .event_by_name(&config.event)
            .map(|e| event_signature(&e.signature()));
        if signature.is_none() {
            tracing::warn!(
                event = %config.event,
                module = registry.module(),
                "result event not in schema; every dispatch call counts as successful"
            );
        }
        Self { signature, config }
    }

    /// `false` only when topic0 is the result event and its flag word is zero.
    pub fn success(&self, log: &RawLog) -> Result<bool, DecodeError> {
        let Some(signature) = self.signature else {
            return Ok(true);
        };
        let Some(topic0) = log.topic_word(0).transpose()? else {
            return Ok(true);
        };
        if topic0 != signature {
            return Ok(true);
        }

        let index = self.config.topic_index;
        let flag = log
            .topic_word(index)
            .ok_or_else(|| DecodeError::MissingField {
                field: format!("topics[{index}]"),
            })??;
        Ok(flag.iter().any(|&b| b != 0))
    }

    /// Set `call.success` from `log`.
    pub fn apply(&self, call: &mut DecodedCall, log: &RawLog) -> Result<(), DecodeError> {
        call.success = Some(self.success(log)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modlogs_core::fingerprint::to_hex;

    const ABI: &str = r#"[
        {
            "type": "event",
            "name": "TransactionExecuted",
            "inputs": [
                {"name": "wallet", "type": "address", "indexed": true},
                {"name": "success", "type": "bool", "indexed": true},
                {"name": "signedHash", "type": "bytes32", "indexed": false}
            ],
            "anonymous": false
        },
        {
            "type": "event",
            "name": "Refund",
            "inputs": [
                {"name": "wallet", "type": "address", "indexed": true},
                {"name": "refundAddress", "type": "address", "indexed": true}
            ],
            "anonymous": false
        }
    ]"#;

    fn correlator() -> OutcomeCorrelator {
        let registry = AbiRegistry::from_abi_json(ABI).unwrap();
        OutcomeCorrelator::new(&registry, OutcomeConfig::default())
    }

    fn word(last: u8) -> String {
        let mut w = [0u8; 32];
        w[31] = last;
        to_hex(&w)
    }

    fn log(topics: Vec<String>) -> RawLog {
        RawLog {
            topics,
            transaction_hash: "0x01".into(),
            ..Default::default()
        }
    }

    fn executed() -> String {
        to_hex(&event_signature("TransactionExecuted(address,bool,bytes32)"))
    }

    #[test]
    fn result_event_with_true_flag_succeeds() {
        let raw = log(vec![executed(), word(0xaa), word(1)]);
        assert!(correlator().success(&raw).unwrap());
    }

    #[test]
    fn result_event_with_zero_flag_fails() {
        let raw = log(vec![executed(), word(0xaa), word(0)]);
        assert!(!correlator().success(&raw).unwrap());
    }

    #[test]
    fn other_event_counts_as_success() {
        let refund = to_hex(&event_signature("Refund(address,address)"));
        let raw = log(vec![refund, word(0xaa), word(0)]);
        assert!(correlator().success(&raw).unwrap());
    }

    #[test]
    fn result_event_without_flag_topic_is_an_error() {
        let raw = log(vec![executed(), word(0xaa)]);
        let err = correlator().success(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { ref field } if field == "topics[2]"));
    }

    #[test]
    fn schema_without_result_event_always_succeeds() {
        let registry = AbiRegistry::from_abi_json("[]").unwrap();
        let correlator = OutcomeCorrelator::new(&registry, OutcomeConfig::default());
        let raw = log(vec![executed(), word(0xaa), word(0)]);
        assert!(correlator.success(&raw).unwrap());
    }

    #[test]
    fn apply_sets_the_flag() {
        let mut call = DecodedCall::new("execute", [0; 4]);
        let raw = log(vec![executed(), word(0xaa), word(0)]);
        correlator().apply(&mut call, &raw).unwrap();
        assert_eq!(call.success, Some(false));
    }
}
