use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::Observation;

/// Callback invoked after every probe call
pub type AttemptCallback = Arc<dyn Fn(&Attempt) + Send + Sync>;

/// Record of a single probe call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-indexed within the current run
    pub number: u32,
    /// Time since the run started
    pub elapsed: Duration,
    pub status: AttemptStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum AttemptStatus {
    Satisfied,
    Unsatisfied,
    Failed(String),
}

impl AttemptStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, AttemptStatus::Satisfied)
    }
}

impl From<&Observation> for AttemptStatus {
    fn from(observation: &Observation) -> Self {
        match observation {
            Observation::Satisfied => AttemptStatus::Satisfied,
            Observation::Unsatisfied => AttemptStatus::Unsatisfied,
            Observation::Failed(err) => AttemptStatus::Failed(err.to_string()),
        }
    }
}
