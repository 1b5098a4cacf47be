use serde::{Deserialize, Serialize};
use std::fmt;

/// Success semantics of a constraint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Retry until the probe succeeds once
    #[default]
    InitialSuccess,
    /// The probe must succeed on every attempt until the budget is spent
    ContinualSuccess,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::InitialSuccess => write!(f, "initial-success"),
            Mode::ContinualSuccess => write!(f, "continual-success"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initial" | "initial-success" => Ok(Mode::InitialSuccess),
            "continual" | "continual-success" => Ok(Mode::ContinualSuccess),
            _ => Err(format!("Unknown wait mode: {}", s)),
        }
    }
}
