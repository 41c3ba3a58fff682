//! EVM event-log decoder.
//!
//! - topics[0] → event signature hash, looked up in the registry
//! - topics[1..] → indexed parameters, one 32-byte word each, in ABI order
//! - `data` → non-indexed parameters, ABI-encoded as one tuple

use alloy_core::dyn_abi::DynSolType;
use alloy_dyn_abi::Specifier;
use alloy_json_abi::{Event, EventParam};
use indexmap::IndexMap;
use modlogs_core::{
    error::DecodeError,
    event::{DecodedEvent, RawLog},
    fingerprint::to_hex,
    types::NormalizedValue,
};
use modlogs_registry::AbiRegistry;
use std::sync::Arc;

use crate::{call_decoder, normalizer};

/// Decodes raw logs against one schema registry.
#[derive(Debug, Clone)]
pub struct EvmEventDecoder {
    registry: Arc<AbiRegistry>,
}

impl EvmEventDecoder {
    pub fn new(registry: Arc<AbiRegistry>) -> Self {
        Self { registry }
    }

    /// Decode a raw log into its event.
    ///
    /// Returns `Ok(None)` when the log has no topics or topics[0] matches no
    /// event in the registry.
    pub fn decode(&self, log: &RawLog) -> Result<Option<DecodedEvent>, DecodeError> {
        let Some(topic0) = log.topic_word(0).transpose()? else {
            return Ok(None);
        };
        let Some(event) = self.registry.event_by_signature(&topic0) else {
            return Ok(None);
        };

        let fields = decode_fields(event, log)?;
        tracing::debug!(event = %event.name, fields = fields.len(), "decoded event");

        Ok(Some(DecodedEvent {
            name: event.name.clone(),
            signature: to_hex(&topic0),
            fields,
        }))
    }
}

fn resolve(param: &EventParam) -> Result<DynSolType, DecodeError> {
    param.resolve().map_err(|e| DecodeError::AbiDecodeFailed {
        reason: format!("unsupported parameter type '{}': {e}", param.ty),
    })
}

/// Decode every parameter of `event`, keeping declaration order and
/// dropping unnamed ones.
fn decode_fields(
    event: &Event,
    log: &RawLog,
) -> Result<IndexMap<String, NormalizedValue>, DecodeError> {
    let mut slots: Vec<Option<NormalizedValue>> = vec![None; event.inputs.len()];

    let mut topic_index = 1;
    for (slot, param) in slots.iter_mut().zip(&event.inputs) {
        if !param.indexed {
            continue;
        }
        let field = if param.name.is_empty() {
            format!("topics[{topic_index}]")
        } else {
            param.name.clone()
        };
        let word = log
            .topic_word(topic_index)
            .ok_or(DecodeError::MissingField { field })??;
        *slot = Some(decode_topic(param, &word)?);
        topic_index += 1;
    }

    let data_params: Vec<&EventParam> = event.inputs.iter().filter(|p| !p.indexed).collect();
    if !data_params.is_empty() {
        let types = data_params
            .iter()
            .map(|p| resolve(p))
            .collect::<Result<Vec<_>, _>>()?;
        let data = log.data_bytes()?;
        let mut values = call_decoder::decode_tuple(types, &data)
            .map_err(|e| match e {
                DecodeError::AbiDecodeFailed { reason } => DecodeError::AbiDecodeFailed {
                    reason: format!("{} data: {reason}", event.name),
                },
                other => other,
            })?
            .into_iter();

        for (slot, param) in slots.iter_mut().zip(&event.inputs) {
            if !param.indexed {
                *slot = values
                    .next()
                    .map(|v| normalizer::normalize_with(&param.components, v));
            }
        }
    }

    Ok(event
        .inputs
        .iter()
        .zip(slots)
        .filter(|(p, _)| !p.name.is_empty())
        .filter_map(|(p, v)| v.map(|v| (p.name.clone(), v)))
        .collect())
}

/// Decode a single indexed topic.
///
/// Value types (uint, int, bool, address, bytesN) are padded into the word
/// and recovered. Reference types (string, bytes, arrays, tuples) are stored
/// as the keccak256 of their encoding and come back as the raw 32 bytes.
fn decode_topic(param: &EventParam, word: &[u8; 32]) -> Result<NormalizedValue, DecodeError> {
    let ty = resolve(param)?;
    match ty {
        DynSolType::String
        | DynSolType::Bytes
        | DynSolType::Array(_)
        | DynSolType::FixedArray(..)
        | DynSolType::Tuple(_) => Ok(NormalizedValue::Bytes(word.to_vec())),
        _ => ty
            .abi_decode(word)
            .map(normalizer::normalize)
            .map_err(|e| DecodeError::AbiDecodeFailed {
                reason: format!("topic '{}': {e}", param.name),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::dyn_abi::DynSolValue;
    use alloy_primitives::{Address, B256, U256};
    use modlogs_core::fingerprint::{event_signature, keccak256};

    const MODULE_ABI: &str = r#"[
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
            "name": "Transfer",
            "inputs": [
                {"name": "wallet", "type": "address", "indexed": true},
                {"name": "token", "type": "address", "indexed": true},
                {"name": "amount", "type": "uint256", "indexed": true},
                {"name": "to", "type": "address", "indexed": false},
                {"name": "data", "type": "bytes", "indexed": false}
            ],
            "anonymous": false
        },
        {
            "type": "event",
            "name": "Labelled",
            "inputs": [
                {"name": "label", "type": "string", "indexed": true},
                {"name": "", "type": "uint256", "indexed": false},
                {"name": "count", "type": "uint256", "indexed": false}
            ],
            "anonymous": false
        }
    ]"#;

    fn decoder() -> EvmEventDecoder {
        EvmEventDecoder::new(Arc::new(AbiRegistry::from_abi_json(MODULE_ABI).unwrap()))
    }

    fn topic(bytes: &[u8]) -> String {
        let mut word = [0u8; 32];
        word[32 - bytes.len()..].copy_from_slice(bytes);
        to_hex(&word)
    }

    fn wallet() -> Address {
        "0xc4d46ecbc83f41d0bf71a39868d3f830299068b8".parse().unwrap()
    }

    fn log(topics: Vec<String>, data: Vec<u8>) -> RawLog {
        RawLog {
            address: "0x103675510a219bd84ce91d1bcb82ca194d665a09".into(),
            topics,
            data: to_hex(&data),
            transaction_hash: "0x01".into(),
            ..Default::default()
        }
    }

    #[test]
    fn decode_transaction_executed() {
        let sig = event_signature("TransactionExecuted(address,bool,bytes32)");
        let signed_hash = B256::repeat_byte(0x11);
        let raw = log(
            vec![to_hex(&sig), topic(wallet().as_slice()), topic(&[1])],
            DynSolValue::Tuple(vec![DynSolValue::FixedBytes(signed_hash, 32)]).abi_encode_params(),
        );

        let event = decoder().decode(&raw).unwrap().unwrap();
        assert_eq!(event.name, "TransactionExecuted");
        assert_eq!(event.signature, to_hex(&sig));
        assert_eq!(
            event.field("wallet").unwrap().as_address(),
            Some(wallet().to_checksum(None).as_str())
        );
        assert_eq!(event.field("success"), Some(&NormalizedValue::Bool(true)));
        assert_eq!(
            event.field("signedHash"),
            Some(&NormalizedValue::Bytes(vec![0x11; 32]))
        );
        let names: Vec<&String> = event.fields.keys().collect();
        assert_eq!(names, ["wallet", "success", "signedHash"]);
    }

    #[test]
    fn mixed_indexed_and_data_fields_keep_declaration_order() {
        let sig = event_signature("Transfer(address,address,uint256,address,bytes)");
        let raw = log(
            vec![
                to_hex(&sig),
                topic(wallet().as_slice()),
                topic(Address::ZERO.as_slice()),
                topic(&[0x03, 0xe8]),
            ],
            DynSolValue::Tuple(vec![
                DynSolValue::Address(wallet()),
                DynSolValue::Bytes(vec![0xca, 0xfe]),
            ])
            .abi_encode_params(),
        );

        let event = decoder().decode(&raw).unwrap().unwrap();
        let names: Vec<&String> = event.fields.keys().collect();
        assert_eq!(names, ["wallet", "token", "amount", "to", "data"]);
        assert_eq!(event.field("amount"), Some(&NormalizedValue::Uint(1000)));
        assert_eq!(
            event.field("data"),
            Some(&NormalizedValue::Bytes(vec![0xca, 0xfe]))
        );
    }

    #[test]
    fn indexed_reference_type_is_raw_hash_and_unnamed_is_dropped() {
        let sig = event_signature("Labelled(string,uint256,uint256)");
        let label_hash = keccak256(b"daily");
        let raw = log(
            vec![to_hex(&sig), to_hex(&label_hash)],
            DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(1u64), 256),
                DynSolValue::Uint(U256::from(2u64), 256),
            ])
            .abi_encode_params(),
        );

        let event = decoder().decode(&raw).unwrap().unwrap();
        assert_eq!(
            event.field("label"),
            Some(&NormalizedValue::Bytes(label_hash.to_vec()))
        );
        assert_eq!(event.field("count"), Some(&NormalizedValue::Uint(2)));
        assert_eq!(event.fields.len(), 2);
    }

    #[test]
    fn unmatched_topic0_is_absent() {
        let raw = log(vec![topic(&[0x42])], vec![]);
        assert!(decoder().decode(&raw).unwrap().is_none());
    }

    #[test]
    fn log_without_topics_is_absent() {
        let raw = log(vec![], vec![]);
        assert!(decoder().decode(&raw).unwrap().is_none());
    }

    #[test]
    fn missing_indexed_topic_is_an_error() {
        let sig = event_signature("TransactionExecuted(address,bool,bytes32)");
        let raw = log(
            vec![to_hex(&sig), topic(wallet().as_slice())],
            vec![0u8; 32],
        );
        let err = decoder().decode(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { ref field } if field == "success"));
    }

    #[test]
    fn truncated_data_is_an_error() {
        let sig = event_signature("TransactionExecuted(address,bool,bytes32)");
        let raw = log(
            vec![to_hex(&sig), topic(wallet().as_slice()), topic(&[0])],
            vec![0u8; 8],
        );
        let err = decoder().decode(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::AbiDecodeFailed { .. }));
    }
}
