//! Numeric normalization and the enriched output record.

use crate::call::DecodedCall;
use crate::error::DecodeError;
use crate::event::{DecodedEvent, RawLog};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Log fields transmitted as hex strings, converted to integers.
///
/// A field absent from the raw log stays `None` and is left untouched in
/// the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericFields {
    pub time_stamp: Option<u64>,
    pub block_number: Option<u64>,
    pub gas_price: Option<u64>,
    pub gas_used: Option<u64>,
    pub log_index: Option<u64>,
    pub transaction_index: Option<u64>,
}

impl NumericFields {
    pub fn from_log(log: &RawLog) -> Result<Self, DecodeError> {
        Ok(Self {
            time_stamp: parse_opt("timeStamp", log.time_stamp.as_deref())?,
            block_number: parse_opt("blockNumber", log.block_number.as_deref())?,
            gas_price: parse_opt("gasPrice", log.gas_price.as_deref())?,
            gas_used: parse_opt("gasUsed", log.gas_used.as_deref())?,
            log_index: parse_opt("logIndex", log.log_index.as_deref())?,
            transaction_index: parse_opt("transactionIndex", log.transaction_index.as_deref())?,
        })
    }

    /// `(original key, value)` pairs for the fields that were present.
    pub fn entries(&self) -> Vec<(&'static str, u64)> {
        [
            ("timeStamp", self.time_stamp),
            ("blockNumber", self.block_number),
            ("gasPrice", self.gas_price),
            ("gasUsed", self.gas_used),
            ("logIndex", self.log_index),
            ("transactionIndex", self.transaction_index),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

fn parse_opt(field: &str, value: Option<&str>) -> Result<Option<u64>, DecodeError> {
    value.map(|v| parse_hex_u64(field, v)).transpose()
}

/// Parse a hex quantity (with or without `0x`) to u64.
///
/// Etherscan encodes zero as a bare `"0x"`, so an empty digit string is 0.
pub fn parse_hex_u64(field: &str, s: &str) -> Result<u64, DecodeError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|_| DecodeError::InvalidNumeric {
        field: field.to_string(),
        value: s.to_string(),
    })
}

/// The fully decoded view of one raw log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub log: RawLog,
    pub numeric: NumericFields,
    /// Absent when topics[0] matches no event in the schema
    pub event: Option<DecodedEvent>,
    /// Absent when the transaction input matches no function in the schema
    pub call: Option<DecodedCall>,
}

impl EnrichedRecord {
    pub fn function_name(&self) -> Option<&str> {
        self.call.as_ref().map(|c| c.function_name.as_str())
    }

    pub fn inner_function_name(&self) -> Option<&str> {
        self.call.as_ref().and_then(|c| c.inner_function_name())
    }

    pub fn success(&self) -> Option<bool> {
        self.call.as_ref().and_then(|c| c.success)
    }

    /// Flat JSON view: the raw log fields, then `event`, then the call facets
    /// (`funName`, `funInput`, `subFunName`, `subFunInput`, `success`), with
    /// the numeric fields overwritten by their integer values.
    pub fn to_json(&self) -> Value {
        let mut obj = match serde_json::to_value(&self.log) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        if let Some(event) = &self.event {
            obj.insert("event".into(), event.to_json());
        }

        if let Some(call) = &self.call {
            obj.insert("funName".into(), Value::String(call.function_name.clone()));
            obj.insert("funInput".into(), call.inputs_json());
            if let Some(inner) = call.nested.as_deref() {
                obj.insert("subFunName".into(), Value::String(inner.function_name.clone()));
                obj.insert("subFunInput".into(), inner.inputs_json());
            }
            if let Some(success) = call.success {
                obj.insert("success".into(), Value::Bool(success));
            }
        }

        for (key, value) in self.numeric.entries() {
            obj.insert(key.to_string(), Value::from(value));
        }

        Value::Object(obj)
    }
}
