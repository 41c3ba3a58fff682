//! Nested-call resolution for dispatch functions.
//!
//! A module's dispatch function (`execute(address _target, uint256 _value,
//! bytes _data)` by default) carries a second call payload in one of its
//! bytes arguments. The resolver decodes that payload once with the same
//! call decoder and attaches the result as the outer call's `nested` call.

use modlogs_core::{call::DecodedCall, error::DecodeError, types::NormalizedValue};
use serde::{Deserialize, Serialize};

use crate::call_decoder::EvmCallDecoder;

/// Which function is the dispatch function and which argument holds the
/// inner payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default = "default_data_param")]
    pub data_param: String,
}

fn default_function() -> String {
    "execute".into()
}

fn default_data_param() -> String {
    "_data".into()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            function: default_function(),
            data_param: default_data_param(),
        }
    }
}

/// Unwraps exactly one level of dispatch.
#[derive(Debug, Clone)]
pub struct DispatchResolver {
    decoder: EvmCallDecoder,
    config: DispatchConfig,
}

impl DispatchResolver {
    pub fn new(decoder: EvmCallDecoder, config: DispatchConfig) -> Self {
        Self { decoder, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn decoder(&self) -> &EvmCallDecoder {
        &self.decoder
    }

    /// Whether `call` is the configured dispatch function.
    pub fn is_dispatch(&self, call: &DecodedCall) -> bool {
        call.function_name == self.config.function
    }

    /// Decode a payload and, if it is a dispatch call, its inner call.
    pub fn decode(&self, payload: &[u8]) -> Result<Option<DecodedCall>, DecodeError> {
        match self.decoder.decode(payload)? {
            Some(call) => self.resolve(call).map(Some),
            None => Ok(None),
        }
    }

    /// Attach the inner call to a dispatch call.
    ///
    /// Non-dispatch calls are returned unchanged. An inner payload whose
    /// selector matches nothing leaves `nested` empty. The inner call is
    /// never resolved again, even when it is itself a dispatch call.
    pub fn resolve(&self, mut call: DecodedCall) -> Result<DecodedCall, DecodeError> {
        if !self.is_dispatch(&call) {
            return Ok(call);
        }

        let inner_payload = match call.input(&self.config.data_param) {
            Some(NormalizedValue::Bytes(b)) => b.clone(),
            Some(other) => {
                return Err(DecodeError::MissingField {
                    field: format!(
                        "{}.{} (expected bytes, got {other})",
                        self.config.function, self.config.data_param
                    ),
                })
            }
            None => {
                return Err(DecodeError::MissingField {
                    field: format!("{}.{}", self.config.function, self.config.data_param),
                })
            }
        };

        call.nested = self.decoder.decode(&inner_payload)?.map(Box::new);
        if call.nested.is_none() {
            tracing::debug!(
                selector = %hex::encode(inner_payload.get(..4).unwrap_or(&inner_payload)),
                "inner call selector not in schema"
            );
        }
        Ok(call)
    }
}
