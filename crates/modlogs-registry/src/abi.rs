//! In-memory ABI registry with selector indexes.

use alloy_json_abi::{Event, Function, JsonAbi};
use modlogs_core::{
    error::RegistryError,
    fingerprint::{event_signature, function_selector, to_hex},
};
use serde_json::Value;
use std::collections::HashMap;

/// The interface of one contract module at one version.
///
/// Lookups are O(1) through indexes built at construction time. Construction
/// fails if two functions share a selector or two events share a signature,
/// so a successful lookup always identifies exactly one schema entry.
#[derive(Debug, Clone)]
pub struct AbiRegistry {
    module: String,
    version: String,
    functions: Vec<Function>,
    events: Vec<Event>,
    by_selector: HashMap<[u8; 4], usize>,
    by_signature: HashMap<[u8; 32], usize>,
}

impl AbiRegistry {
    /// Build a registry from a parsed ABI.
    pub fn from_abi(abi: JsonAbi) -> Result<Self, RegistryError> {
        let functions: Vec<Function> = abi.functions().cloned().collect();
        let events: Vec<Event> = abi.events().cloned().collect();

        let mut by_selector = HashMap::with_capacity(functions.len());
        for (idx, func) in functions.iter().enumerate() {
            let selector = function_selector(&func.signature());
            if let Some(prev) = by_selector.insert(selector, idx) {
                return Err(RegistryError::DuplicateSelector {
                    selector: to_hex(&selector),
                    first: functions[prev].signature(),
                    second: func.signature(),
                });
            }
        }

        let mut by_signature = HashMap::with_capacity(events.len());
        for (idx, event) in events.iter().enumerate() {
            // Anonymous events carry no signature topic and can never be matched.
            if event.anonymous {
                continue;
            }
            let signature = event_signature(&event.signature());
            if let Some(prev) = by_signature.insert(signature, idx) {
                return Err(RegistryError::DuplicateEventSignature {
                    signature: to_hex(&signature),
                    first: events[prev].signature(),
                    second: event.signature(),
                });
            }
        }

        tracing::debug!(
            functions = functions.len(),
            events = events.len(),
            "built ABI registry"
        );

        Ok(Self {
            module: String::new(),
            version: String::new(),
            functions,
            events,
            by_selector,
            by_signature,
        })
    }

    /// Build a registry from ABI JSON.
    ///
    /// Accepts either a bare ABI array or a build artifact of the form
    /// `{ "abi": [ ... ], ... }`.
    pub fn from_abi_json(json: &str) -> Result<Self, RegistryError> {
        let doc: Value = serde_json::from_str(json).map_err(|e| RegistryError::InvalidAbi {
            reason: format!("invalid JSON: {e}"),
        })?;
        let abi_value = match doc {
            Value::Array(_) => doc,
            Value::Object(mut obj) => obj.remove("abi").ok_or_else(|| RegistryError::InvalidAbi {
                reason: "document has no 'abi' key".into(),
            })?,
            _ => {
                return Err(RegistryError::InvalidAbi {
                    reason: "expected an ABI array or an object with an 'abi' key".into(),
                })
            }
        };
        let abi: JsonAbi =
            serde_json::from_value(abi_value).map_err(|e| RegistryError::InvalidAbi {
                reason: e.to_string(),
            })?;
        Self::from_abi(abi)
    }

    /// Attach the module name and version this registry was loaded for.
    pub fn with_label(mut self, module: impl Into<String>, version: impl Into<String>) -> Self {
        self.module = module.into();
        self.version = version.into();
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Find the function whose selector equals the first 4 bytes of `payload`.
    /// Payloads shorter than 4 bytes match nothing.
    pub fn function_by_selector(&self, payload: &[u8]) -> Option<&Function> {
        let selector: [u8; 4] = payload.get(..4)?.try_into().ok()?;
        self.by_selector.get(&selector).map(|&i| &self.functions[i])
    }

    /// Find the non-anonymous event whose signature hash equals `topic0`.
    pub fn event_by_signature(&self, topic0: &[u8; 32]) -> Option<&Event> {
        self.by_signature.get(topic0).map(|&i| &self.events[i])
    }

    /// First function with the given name (overloads resolve to the first).
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// First event with the given name.
    pub fn event_by_name(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Total number of function and event entries.
    pub fn len(&self) -> usize {
        self.functions.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
            "name": "transfer",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ],
            "anonymous": false
        }
    ]"#;

    fn hex32(s: &str) -> [u8; 32] {
        let bytes = (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect::<Vec<_>>();
        bytes.try_into().unwrap()
    }

    #[test]
    fn lookup_function_by_selector() {
        let reg = AbiRegistry::from_abi_json(WALLET_ABI).unwrap();
        let payload = [0xa9, 0x05, 0x9c, 0xbb, 0x00, 0x01];
        let func = reg.function_by_selector(&payload).unwrap();
        assert_eq!(func.name, "transfer");
        assert_eq!(func.selector().0, [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn every_indexed_selector_matches_its_entry() {
        let reg = AbiRegistry::from_abi_json(WALLET_ABI).unwrap();
        for func in reg.functions() {
            let selector = function_selector(&func.signature());
            let found = reg.function_by_selector(&selector).unwrap();
            assert_eq!(function_selector(&found.signature()), selector);
            assert_eq!(func.selector().0, selector);
        }
    }

    #[test]
    fn unknown_or_short_selector_is_none() {
        let reg = AbiRegistry::from_abi_json(WALLET_ABI).unwrap();
        assert!(reg.function_by_selector(&[0xde, 0xad, 0xbe, 0xef]).is_none());
        assert!(reg.function_by_selector(&[0xa9, 0x05]).is_none());
        assert!(reg.function_by_selector(&[]).is_none());
    }

    #[test]
    fn lookup_event_by_signature() {
        let reg = AbiRegistry::from_abi_json(WALLET_ABI).unwrap();
        let topic0 = hex32("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
        assert_eq!(reg.event_by_signature(&topic0).unwrap().name, "Transfer");
        assert!(reg.event_by_signature(&[0u8; 32]).is_none());
    }

    #[test]
    fn artifact_wrapper_is_accepted() {
        let artifact = format!(r#"{{"contractName": "Wallet", "abi": {WALLET_ABI}}}"#);
        let reg = AbiRegistry::from_abi_json(&artifact)
            .unwrap()
            .with_label("Wallet", "1.0.0");
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.module(), "Wallet");
        assert_eq!(reg.version(), "1.0.0");
    }

    #[test]
    fn object_without_abi_is_rejected() {
        let err = AbiRegistry::from_abi_json(r#"{"bytecode": "0x"}"#).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAbi { .. }));
    }

    #[test]
    fn colliding_selectors_are_rejected() {
        // Both signatures hash to selector 0x42966c68.
        let abi = r#"[
            {"type": "function", "name": "burn", "inputs": [{"name": "a", "type": "uint256"}], "outputs": [], "stateMutability": "nonpayable"},
            {"type": "function", "name": "collate_propagate_storage", "inputs": [{"name": "b", "type": "bytes16"}], "outputs": [], "stateMutability": "nonpayable"}
        ]"#;
        let err = AbiRegistry::from_abi_json(abi).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSelector { .. }));
    }

    #[test]
    fn events_sharing_a_signature_are_rejected() {
        // `indexed` is not part of the signature: both hash to 0xddf252ad...
        let abi = r#"[
            {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]},
            {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
                {"name": "src", "type": "address", "indexed": false},
                {"name": "dst", "type": "address", "indexed": false},
                {"name": "amount", "type": "uint256", "indexed": true}
            ]}
        ]"#;
        match AbiRegistry::from_abi_json(abi).unwrap_err() {
            RegistryError::DuplicateEventSignature { signature, first, second } => {
                assert!(signature.starts_with("0xddf252ad"));
                assert_eq!(first, "Transfer(address,address,uint256)");
                assert_eq!(first, second);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn anonymous_twin_does_not_collide() {
        let abi = r#"[
            {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]},
            {"type": "event", "name": "Transfer", "anonymous": true, "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]}
        ]"#;
        let reg = AbiRegistry::from_abi_json(abi).unwrap();
        let topic0 = hex32("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
        assert!(!reg.event_by_signature(&topic0).unwrap().anonymous);
    }
}
