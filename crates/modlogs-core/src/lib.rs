//! # modlogs-core
//!
//! Core types and collaborator traits shared across all ModLogs crates.
//! The decoders, the pipeline, and the network adapters are all built on
//! top of the interfaces defined here.

pub mod call;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod record;
pub mod source;
pub mod types;

pub use call::DecodedCall;
pub use error::{DecodeError, FetchError, RegistryError};
pub use event::{DecodedEvent, RawLog};
pub use record::{EnrichedRecord, NumericFields};
pub use source::{LogQuery, LogSource, ModuleDirectory, RawTransaction, TransactionFetcher};
pub use types::NormalizedValue;
