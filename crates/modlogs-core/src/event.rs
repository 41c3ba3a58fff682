//! Raw and decoded event log types.

use crate::error::DecodeError;
use crate::types::{fields_to_json, NormalizedValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw log record as served by an Etherscan-compatible `getLogs` endpoint.
///
/// Numeric fields arrive as hex strings. Fields this struct does not know
/// about are kept in `extra` so they survive into the enriched record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLog {
    /// Contract address that emitted the log
    #[serde(default)]
    pub address: String,
    /// topics[0] is the event signature hash; topics[1..] are indexed params
    #[serde(default)]
    pub topics: Vec<String>,
    /// ABI-encoded non-indexed parameters, 0x-prefixed hex
    #[serde(default)]
    pub data: String,
    #[serde(rename = "blockNumber", default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(rename = "timeStamp", default, skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
    #[serde(rename = "gasPrice", default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(rename = "gasUsed", default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    #[serde(rename = "logIndex", default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<String>,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(rename = "transactionIndex", default, skip_serializing_if = "Option::is_none")]
    pub transaction_index: Option<String>,
    /// Any other fields supplied by the log source (blockHash, removed, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawLog {
    /// topics[0], the event signature hash, if present.
    pub fn topic0(&self) -> Option<&str> {
        self.topics.first().map(|s| s.as_str())
    }

    /// Decode the topic at `index` into its 32 bytes.
    /// Returns `None` if the log has no topic at that position.
    pub fn topic_word(&self, index: usize) -> Option<Result<[u8; 32], DecodeError>> {
        self.topics.get(index).map(|t| parse_word(&format!("topics[{index}]"), t))
    }

    /// Decode the `data` payload into bytes.
    pub fn data_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        parse_hex_bytes("data", &self.data)
    }
}

/// Parse a `0x`-prefixed (or bare) hex string into bytes.
/// An empty string or a lone `0x` yields an empty vector.
pub fn parse_hex_bytes(field: &str, s: &str) -> Result<Vec<u8>, DecodeError> {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(hex).map_err(|e| DecodeError::InvalidHex {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a hex string that must encode exactly one 32-byte word.
pub fn parse_word(field: &str, s: &str) -> Result<[u8; 32], DecodeError> {
    let bytes = parse_hex_bytes(field, s)?;
    bytes.as_slice().try_into().map_err(|_| DecodeError::InvalidHex {
        field: field.to_string(),
        reason: format!("expected 32 bytes, got {}", bytes.len()),
    })
}

/// A decoded event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// Event name, e.g. "TransactionExecuted"
    pub name: String,
    /// keccak256 of the canonical event signature (topics[0])
    pub signature: String,
    /// Named fields in ABI declaration order
    pub fields: IndexMap<String, NormalizedValue>,
}

impl DecodedEvent {
    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&NormalizedValue> {
        self.fields.get(name)
    }

    /// `{ "name": ..., <field>: <value>, ... }`
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(self.name.clone()));
        if let Value::Object(fields) = fields_to_json(self.fields.iter()) {
            obj.extend(fields);
        }
        Value::Object(obj)
    }
}
