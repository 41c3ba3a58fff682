//! Converts alloy-core `DynSolValue` → ModLogs `NormalizedValue`.
//!
//! Tuple fields are named from the ABI components of the parameter they were
//! decoded for, so a `(address to, uint256 amount)` struct comes out as
//! `{ to, amount }` rather than positional keys.

use alloy_core::dyn_abi::DynSolValue;
use alloy_json_abi::Param;
use modlogs_core::types::NormalizedValue;

/// Convert a decoded `DynSolValue` into a `NormalizedValue`.
/// Tuple fields get positional names "0", "1", ...
pub fn normalize(val: DynSolValue) -> NormalizedValue {
    normalize_with(&[], val)
}

/// Convert a decoded value, naming tuple fields after `components`.
///
/// `components` applies to the tuple itself and to every element of an
/// array of tuples. Components without a name fall back to their position.
pub fn normalize_with(components: &[Param], val: DynSolValue) -> NormalizedValue {
    match val {
        DynSolValue::Bool(b) => NormalizedValue::Bool(b),

        DynSolValue::Int(i, _) => match i128::try_from(i) {
            Ok(v) => NormalizedValue::Int(v),
            Err(_) => NormalizedValue::BigInt(i.to_string()),
        },

        DynSolValue::Uint(u, _) => match u128::try_from(u) {
            Ok(v) => NormalizedValue::Uint(v),
            Err(_) => NormalizedValue::BigUint(u.to_string()),
        },

        DynSolValue::FixedBytes(word, size) => NormalizedValue::Bytes(word[..size].to_vec()),

        DynSolValue::Bytes(b) => NormalizedValue::Bytes(b),

        DynSolValue::String(s) => NormalizedValue::Str(s),

        DynSolValue::Address(a) => NormalizedValue::Address(a.to_checksum(None)),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => NormalizedValue::Array(
            vals.into_iter()
                .map(|v| normalize_with(components, v))
                .collect(),
        ),

        DynSolValue::Tuple(fields) => NormalizedValue::Tuple(
            fields
                .into_iter()
                .enumerate()
                .map(|(i, v)| match components.get(i) {
                    Some(c) if !c.name.is_empty() => {
                        (c.name.clone(), normalize_with(&c.components, v))
                    }
                    Some(c) => (i.to_string(), normalize_with(&c.components, v)),
                    None => (i.to_string(), normalize(v)),
                })
                .collect(),
        ),

        DynSolValue::Function(f) => NormalizedValue::Bytes(f.to_vec()),
    }
}
