//! Decoded function calls.
//!
//! These are the output of decoding transaction input data (as opposed to
//! event logs, which produce `DecodedEvent`).

use crate::types::{fields_to_json, NormalizedValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of decoding a transaction's input payload.
///
/// A dispatch call carries its unwrapped inner call in `nested`. Nesting is
/// at most one level deep; the resolver never unwraps `nested` again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Function name (e.g. "execute", "addModule")
    pub function_name: String,
    /// First 4 bytes of the payload (keccak256 of the signature)
    pub selector: [u8; 4],
    /// Named input parameters in declaration order
    pub inputs: Vec<(String, NormalizedValue)>,
    /// The inner call carried by a dispatch call, if it matched the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Box<DecodedCall>>,
    /// Outcome reported by the paired event, set for dispatch calls only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl DecodedCall {
    pub fn new(function_name: impl Into<String>, selector: [u8; 4]) -> Self {
        Self {
            function_name: function_name.into(),
            selector,
            inputs: Vec::new(),
            nested: None,
            success: None,
        }
    }

    /// Selector as a hex string ("0xaabbccdd")
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    /// Look up a decoded input by name
    pub fn input(&self, name: &str) -> Option<&NormalizedValue> {
        self.inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Name of the unwrapped inner call, if any.
    pub fn inner_function_name(&self) -> Option<&str> {
        self.nested.as_deref().map(|c| c.function_name.as_str())
    }

    /// Inputs as a plain JSON object.
    pub fn inputs_json(&self) -> Value {
        fields_to_json(self.inputs.iter().map(|(k, v)| (k, v)))
    }

    /// Whether this call or its inner call is named `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        self.function_name == name || self.inner_function_name() == Some(name)
    }
}
