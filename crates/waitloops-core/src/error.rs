use thiserror::Error;

/// Boxed error produced by a probe.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal failure of a wait.
#[derive(Error, Debug)]
pub enum WaitError {
    /// `run` was called on a constraint with no probe attached.
    #[error("wait: no function specified")]
    NoFunction,

    #[error("wait: timeout exceeded{}", cause_suffix(.cause))]
    TimeoutExceeded {
        #[source]
        cause: Option<BoxError>,
    },

    #[error("wait: attempts exceeded{}", cause_suffix(.cause))]
    AttemptsExceeded {
        #[source]
        cause: Option<BoxError>,
    },

    #[error("wait: condition unsatisfied{}", cause_suffix(.cause))]
    ConditionUnsatisfied {
        #[source]
        cause: Option<BoxError>,
    },

    /// An error probe failed while running under continual success.
    #[error(transparent)]
    Probe(BoxError),
}

fn cause_suffix(cause: &Option<BoxError>) -> String {
    match cause {
        Some(err) => format!(": {}", err),
        None => String::new(),
    }
}

impl WaitError {
    pub(crate) fn unsatisfied() -> Self {
        Self::ConditionUnsatisfied { cause: None }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutExceeded { .. })
    }

    pub fn is_attempts(&self) -> bool {
        matches!(self, Self::AttemptsExceeded { .. })
    }

    pub fn is_unsatisfied(&self) -> bool {
        matches!(self, Self::ConditionUnsatisfied { .. })
    }

    /// The probe error carried by this failure, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::NoFunction => None,
            Self::TimeoutExceeded { cause }
            | Self::AttemptsExceeded { cause }
            | Self::ConditionUnsatisfied { cause } => cause.as_deref(),
            Self::Probe(err) => Some(err.as_ref()),
        }
    }
}
