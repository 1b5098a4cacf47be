use serde::Serialize;
use std::time::Duration;

use waitloops_core::WaitError;

/// The final outcome of a wait
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WaitOutcome {
    /// The condition was met
    Success {
        attempts: u32,
        total_duration_secs: f64,
    },
    /// The wait gave up or the condition broke
    Failed {
        attempts: u32,
        reason: FailureReason,
        error: String,
        total_duration_secs: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Timeout,
    Attempts,
    Unsatisfied,
    Probe,
}

impl From<&WaitError> for FailureReason {
    fn from(err: &WaitError) -> Self {
        match err {
            WaitError::TimeoutExceeded { .. } => FailureReason::Timeout,
            WaitError::AttemptsExceeded { .. } => FailureReason::Attempts,
            WaitError::ConditionUnsatisfied { .. } => FailureReason::Unsatisfied,
            WaitError::Probe(_) | WaitError::NoFunction => FailureReason::Probe,
        }
    }
}

impl WaitOutcome {
    pub fn from_result(result: Result<(), WaitError>, attempts: u32, duration: Duration) -> Self {
        match result {
            Ok(()) => Self::Success {
                attempts,
                total_duration_secs: duration.as_secs_f64(),
            },
            Err(err) => Self::Failed {
                attempts,
                reason: FailureReason::from(&err),
                error: err.to_string(),
                total_duration_secs: duration.as_secs_f64(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
