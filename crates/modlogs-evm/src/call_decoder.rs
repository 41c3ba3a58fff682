//! EVM function-call decoder.
//!
//! Decodes transaction `input` data against a module's schema registry.
//!
//! # How it works
//! - First 4 bytes of the payload = keccak256(function_signature)[:4] (the selector)
//! - Remaining bytes = ABI-encoded inputs tuple
//! - A selector that matches nothing in the registry is not an error: the
//!   call simply has no decoded facet

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_dyn_abi::Specifier;
use alloy_json_abi::Param;
use modlogs_core::{call::DecodedCall, error::DecodeError, types::NormalizedValue};
use modlogs_registry::AbiRegistry;
use std::sync::Arc;

use crate::normalizer;

/// Decodes call payloads against one schema registry.
///
/// Cheap to clone; the registry is shared.
#[derive(Debug, Clone)]
pub struct EvmCallDecoder {
    registry: Arc<AbiRegistry>,
}

impl EvmCallDecoder {
    pub fn new(registry: Arc<AbiRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AbiRegistry {
        &self.registry
    }

    /// Decode a payload into its function call.
    ///
    /// Returns `Ok(None)` when the selector matches no function (including
    /// payloads shorter than 4 bytes). Returns `AbiDecodeFailed` when the
    /// selector matches but the arguments are truncated or malformed.
    pub fn decode(&self, payload: &[u8]) -> Result<Option<DecodedCall>, DecodeError> {
        let Some(func) = self.registry.function_by_selector(payload) else {
            return Ok(None);
        };

        let args = &payload[4..];
        let inputs = decode_params(&func.inputs, args).map_err(|e| match e {
            DecodeError::AbiDecodeFailed { reason } => DecodeError::AbiDecodeFailed {
                reason: format!("{}: {reason}", func.name),
            },
            other => other,
        })?;

        tracing::debug!(
            function = %func.name,
            args = inputs.len(),
            "decoded call"
        );

        let mut call = DecodedCall::new(func.name.clone(), func.selector().0);
        call.inputs = inputs;
        Ok(Some(call))
    }
}

/// Resolve a parameter list to alloy types.
pub(crate) fn resolve_types<'a, I>(params: I) -> Result<Vec<DynSolType>, DecodeError>
where
    I: IntoIterator<Item = &'a Param>,
{
    params
        .into_iter()
        .map(|p| {
            p.resolve().map_err(|e| DecodeError::AbiDecodeFailed {
                reason: format!("unsupported parameter type '{}': {e}", p.ty),
            })
        })
        .collect()
}

/// ABI-decode `data` as the parameter tuple `params` and keep the named ones.
pub(crate) fn decode_params(
    params: &[Param],
    data: &[u8],
) -> Result<Vec<(String, NormalizedValue)>, DecodeError> {
    if params.is_empty() {
        return Ok(vec![]);
    }

    let types = resolve_types(params)?;
    let values = decode_tuple(types, data)?;
    Ok(clean_named(
        params.iter().map(|p| (p.name.as_str(), p.components.as_slice())),
        values,
    ))
}

/// Decode a parameter-encoded tuple of `types` into its element values.
pub(crate) fn decode_tuple(
    types: Vec<DynSolType>,
    data: &[u8],
) -> Result<Vec<DynSolValue>, DecodeError> {
    let expected = types.len();
    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(data)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: e.to_string(),
        })?;

    match decoded {
        DynSolValue::Tuple(vals) if vals.len() == expected => Ok(vals),
        other => Err(DecodeError::AbiDecodeFailed {
            reason: format!("expected a tuple of {expected} values, got {other:?}"),
        }),
    }
}

/// Pair decoded values with their parameter names, dropping unnamed ones.
///
/// Only named parameters make it into the cleaned mapping; positional
/// aliases are never emitted.
pub(crate) fn clean_named<'a, I>(
    params: I,
    values: Vec<DynSolValue>,
) -> Vec<(String, NormalizedValue)>
where
    I: IntoIterator<Item = (&'a str, &'a [Param])>,
{
    params
        .into_iter()
        .zip(values)
        .filter(|((name, _), _)| !name.is_empty())
        .map(|((name, components), val)| {
            (name.to_string(), normalizer::normalize_with(components, val))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use modlogs_core::fingerprint::function_selector;

    const WALLET_ABI: &str = r#"[
        {
            "type": "function",
            "name": "addModule",
            "inputs": [{"name": "moduleAddress", "type": "address"}],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "setLimits",
            "inputs": [
                {"name": "", "type": "uint256"},
                {"name": "limits", "type": "uint64[]"},
                {
                    "name": "policy",
                    "type": "tuple",
                    "components": [
                        {"name": "owner", "type": "address"},
                        {"name": "label", "type": "string"},
                        {"name": "", "type": "bool"}
                    ]
                }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "setLimit",
            "inputs": [{"name": "_newLimit", "type": "uint256"}],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "ping",
            "inputs": [],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    fn decoder() -> EvmCallDecoder {
        EvmCallDecoder::new(Arc::new(AbiRegistry::from_abi_json(WALLET_ABI).unwrap()))
    }

    fn payload(signature: &str, args: Vec<DynSolValue>) -> Vec<u8> {
        let mut out = function_selector(signature).to_vec();
        out.extend(DynSolValue::Tuple(args).abi_encode_params());
        out
    }

    fn module_address() -> Address {
        "0x103675510a219bd84ce91d1bcb82ca194d665a09".parse().unwrap()
    }

    #[test]
    fn decode_add_module() {
        let data = payload("addModule(address)", vec![DynSolValue::Address(module_address())]);
        let call = decoder().decode(&data).unwrap().unwrap();
        assert_eq!(call.function_name, "addModule");
        assert_eq!(call.selector, function_selector("addModule(address)"));
        assert_eq!(call.inputs.len(), 1);
        assert_eq!(
            call.input("moduleAddress").unwrap().as_address(),
            Some(module_address().to_checksum(None).as_str())
        );
        assert!(call.nested.is_none());
    }

    #[test]
    fn tuple_and_array_roundtrip_drops_unnamed() {
        let data = payload(
            "setLimits(uint256,uint64[],(address,string,bool))",
            vec![
                DynSolValue::Uint(U256::from(99u64), 256),
                DynSolValue::Array(vec![
                    DynSolValue::Uint(U256::from(1u64), 64),
                    DynSolValue::Uint(U256::from(2u64), 64),
                ]),
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(module_address()),
                    DynSolValue::String("daily".into()),
                    DynSolValue::Bool(true),
                ]),
            ],
        );
        let call = decoder().decode(&data).unwrap().unwrap();

        let names: Vec<&str> = call.inputs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["limits", "policy"]);
        assert_eq!(
            call.input("limits").unwrap(),
            &NormalizedValue::Array(vec![NormalizedValue::Uint(1), NormalizedValue::Uint(2)])
        );
        assert_eq!(
            call.input("policy").unwrap(),
            &NormalizedValue::Tuple(vec![
                (
                    "owner".into(),
                    NormalizedValue::Address(module_address().to_checksum(None))
                ),
                ("label".into(), NormalizedValue::Str("daily".into())),
                ("2".into(), NormalizedValue::Bool(true)),
            ])
        );
    }

    #[test]
    fn uint256_amounts_are_narrowed_by_value() {
        let small = payload("setLimit(uint256)", vec![DynSolValue::Uint(U256::from(42u64), 256)]);
        let call = decoder().decode(&small).unwrap().unwrap();
        assert_eq!(call.input("_newLimit").and_then(|v| v.as_u128()), Some(42));

        let large = payload("setLimit(uint256)", vec![DynSolValue::Uint(U256::MAX, 256)]);
        let call = decoder().decode(&large).unwrap().unwrap();
        let value = call.input("_newLimit").unwrap();
        assert!(matches!(value, NormalizedValue::BigUint(_)));
        assert_eq!(value.as_u128(), None);
    }

    #[test]
    fn no_argument_function() {
        let call = decoder()
            .decode(&function_selector("ping()"))
            .unwrap()
            .unwrap();
        assert_eq!(call.function_name, "ping");
        assert!(call.inputs.is_empty());
    }

    #[test]
    fn unknown_selector_is_absent() {
        let result = decoder().decode(&[0xde, 0xad, 0xbe, 0xef, 0x00]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn short_payload_is_absent() {
        assert!(decoder().decode(&[0x01, 0x02]).unwrap().is_none());
        assert!(decoder().decode(&[]).unwrap().is_none());
    }

    #[test]
    fn truncated_arguments_fail() {
        let mut data =
            payload("addModule(address)", vec![DynSolValue::Address(module_address())]);
        data.truncate(4 + 16);
        let err = decoder().decode(&data).unwrap_err();
        assert!(matches!(err, DecodeError::AbiDecodeFailed { ref reason } if reason.starts_with("addModule")));
    }

    #[test]
    fn truncated_dynamic_arguments_fail() {
        let mut data = payload(
            "setLimits(uint256,uint64[],(address,string,bool))",
            vec![
                DynSolValue::Uint(U256::from(1u64), 256),
                DynSolValue::Array(vec![DynSolValue::Uint(U256::from(1u64), 64)]),
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(Address::ZERO),
                    DynSolValue::String("x".into()),
                    DynSolValue::Bool(false),
                ]),
            ],
        );
        let len = data.len();
        data.truncate(len - 64);
        assert!(decoder().decode(&data).is_err());
    }
}
