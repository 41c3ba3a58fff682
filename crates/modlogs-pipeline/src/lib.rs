//! # modlogs-pipeline
//!
//! Turns a batch of raw logs into enriched records.
//!
//! ## Stages
//! 1. Fetch the transaction behind every log (deduplicated by hash, bounded
//!    concurrency, input order preserved).
//! 2. Decode each log on the Rayon pool: call, nested call, outcome flag,
//!    event and numeric fields.
//!
//! ```rust,ignore
//! let decoder = Arc::new(RecordDecoder::from_config(registry, &config));
//! let pipeline = LogPipeline::new(decoder, fetcher, config);
//! let output = pipeline.run(&logs).await?;
//! for record in output.decoded() {
//!     println!("{}", record.to_json());
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod filter;
pub mod scanner;

pub use config::{FailurePolicy, PipelineConfig};
pub use decoder::RecordDecoder;
pub use engine::{BatchOutput, BatchSummary, LogPipeline, RecordOutcome};
pub use error::PipelineError;
pub use filter::MethodFilter;
pub use scanner::{ModuleScanner, ScanReport, ScanRequest};
