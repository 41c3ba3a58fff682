//! Decoded value representation.
//!
//! Every ABI value coming out of the call and event decoders is normalized
//! into a `NormalizedValue`, so consumers never touch alloy types directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A decoded, normalized ABI value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NormalizedValue {
    Uint(u128),
    /// Large uints (> u128) stored as decimal string
    BigUint(String),
    Int(i128),
    /// Large ints (< i128::MIN or > i128::MAX) stored as decimal string
    BigInt(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    /// 20-byte address, 0x-prefixed, EIP-55 checksummed
    Address(String),
    Array(Vec<NormalizedValue>),
    /// Tuple / struct fields named after their ABI components
    Tuple(Vec<(String, NormalizedValue)>),
}

impl NormalizedValue {
    /// Returns the inner string if this is an Address value.
    pub fn as_address(&self) -> Option<&str> {
        match self {
            NormalizedValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the raw bytes if this is a Bytes value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            NormalizedValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Coerce to a u128 if this is a small Uint.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            NormalizedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Plain JSON rendering used in enriched-record output.
    ///
    /// Integers are rendered as decimal strings so 256-bit values survive
    /// consumers that parse JSON numbers as doubles.
    pub fn to_json(&self) -> Value {
        match self {
            NormalizedValue::Uint(v) => Value::String(v.to_string()),
            NormalizedValue::BigUint(v) | NormalizedValue::BigInt(v) => Value::String(v.clone()),
            NormalizedValue::Int(v) => Value::String(v.to_string()),
            NormalizedValue::Bool(b) => Value::Bool(*b),
            NormalizedValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
            NormalizedValue::Str(s) | NormalizedValue::Address(s) => Value::String(s.clone()),
            NormalizedValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            NormalizedValue::Tuple(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Uint(v) => write!(f, "{v}"),
            NormalizedValue::BigUint(v) => write!(f, "{v}"),
            NormalizedValue::Int(v) => write!(f, "{v}"),
            NormalizedValue::BigInt(v) => write!(f, "{v}"),
            NormalizedValue::Bool(v) => write!(f, "{v}"),
            NormalizedValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            NormalizedValue::Str(s) => write!(f, "{s:?}"),
            NormalizedValue::Address(a) => write!(f, "{a}"),
            NormalizedValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            NormalizedValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Render an ordered `(name, value)` list as a JSON object.
pub fn fields_to_json<'a, I>(fields: I) -> Value
where
    I: IntoIterator<Item = (&'a String, &'a NormalizedValue)>,
{
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}
