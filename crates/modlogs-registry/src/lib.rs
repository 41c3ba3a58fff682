//! # modlogs-registry
//!
//! Schema Registry for ModLogs.
//!
//! A registry holds the ABI of one contract module at one release version,
//! indexed by 4-byte function selector and 32-byte event signature. It is
//! loaded once per run and read-only afterwards, so it can be shared across
//! tasks behind an `Arc` without locking.

pub mod abi;
pub mod source;

pub use abi::AbiRegistry;
pub use source::{FileSchemaSource, SchemaSource};
