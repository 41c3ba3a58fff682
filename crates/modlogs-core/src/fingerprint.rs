//! Selector and event-signature derivation.
//!
//! A function selector is the first 4 bytes of
//! `keccak256("name(type1,type2,...)")`; an event signature is the full
//! 32-byte hash of the same canonical string:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef

use tiny_keccak::{Hasher, Keccak};

/// keccak256 of an arbitrary byte string.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

/// 4-byte function selector of a canonical signature string.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// 32-byte event signature hash (topics[0]) of a canonical signature string.
pub fn event_signature(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

/// `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
