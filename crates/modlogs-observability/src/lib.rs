//! # modlogs-observability
//!
//! Structured logging for ModLogs.
//!
//! Text or JSON logs on stderr, with levels configurable per crate and
//! overridable through `RUST_LOG`.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
