//! Pipeline configuration.

use modlogs_evm::{DispatchConfig, OutcomeConfig};
use serde::{Deserialize, Serialize};

/// What to do when one log fails to fetch or decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the batch on the first failure (lowest log index).
    #[default]
    FailFast,
    /// Replace the failing record with a failure marker and carry on.
    Graceful,
}

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of transaction fetches in flight
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub dispatch: DispatchConfig,
    pub outcome: OutcomeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            failure_policy: FailurePolicy::default(),
            dispatch: DispatchConfig::default(),
            outcome: OutcomeConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}
