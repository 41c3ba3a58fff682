//! Keep only the records produced by a given method.

use crate::engine::RecordOutcome;

/// Matches a record when its outer or inner function name equals `method`.
///
/// An empty method matches everything. Failure markers are always kept so
/// that no error is silently dropped from the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodFilter {
    method: Option<String>,
}

impl MethodFilter {
    pub fn new(method: impl Into<String>) -> Self {
        let method = method.into();
        Self {
            method: (!method.is_empty()).then_some(method),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn matches(&self, outcome: &RecordOutcome) -> bool {
        let Some(method) = self.method.as_deref() else {
            return true;
        };
        match outcome {
            RecordOutcome::Decoded(record) => record
                .call
                .as_ref()
                .is_some_and(|call| call.matches_name(method)),
            RecordOutcome::Failed { .. } => true,
        }
    }

    pub fn apply(&self, records: Vec<RecordOutcome>) -> Vec<RecordOutcome> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
