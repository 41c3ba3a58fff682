//! # modlogs-evm
//!
//! EVM decoding stages of the ModLogs pipeline.
//!
//! ## Implementation notes
//! - Uses `alloy-core` for ABI decode
//! - Call payload → selector lookup → argument tuple (`call_decoder`)
//! - Dispatch calls carry a second payload, unwrapped once (`dispatch`)
//! - Topics[0] → event signature; topics[1..] → indexed params (`event_decoder`)
//! - The result event's flag topic → dispatch success (`outcome`)

pub mod call_decoder;
pub mod dispatch;
pub mod event_decoder;
pub mod normalizer;
pub mod outcome;

pub use call_decoder::EvmCallDecoder;
pub use dispatch::{DispatchConfig, DispatchResolver};
pub use event_decoder::EvmEventDecoder;
pub use outcome::{OutcomeConfig, OutcomeCorrelator};
