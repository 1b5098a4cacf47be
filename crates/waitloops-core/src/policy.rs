use std::fmt;
use std::time::{Duration, Instant};

/// Timeout applied when no budget option is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Gap applied when no gap option is given.
pub const DEFAULT_GAP: Duration = Duration::from_millis(250);

/// A single configuration step for a [`Policy`].
///
/// Options are applied left-to-right; a later option overrides an earlier one
/// touching the same field. `Timeout` and `Attempts` both replace the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOption {
    /// Give up once this much time has passed. Attempts become unlimited.
    Timeout(Duration),
    /// Give up after this many attempts. There is no deadline.
    Attempts(u32),
    /// Time to wait between attempts.
    Gap(Duration),
}

/// The bound on how long a constraint keeps probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Timeout(Duration),
    Attempts(u32),
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Timeout(d) => write!(f, "timeout {:?}", d),
            Budget::Attempts(1) => write!(f, "1 attempt"),
            Budget::Attempts(n) => write!(f, "{} attempts", n),
        }
    }
}

/// Immutable limits for one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    anchor: Instant,
    budget: Budget,
    gap: Duration,
}

impl Policy {
    /// Fold `options` over the defaults, anchoring any timeout at `anchor`.
    pub fn fold<I>(anchor: Instant, options: I) -> Self
    where
        I: IntoIterator<Item = PolicyOption>,
    {
        let defaults = [
            PolicyOption::Timeout(DEFAULT_TIMEOUT),
            PolicyOption::Gap(DEFAULT_GAP),
        ];

        defaults
            .into_iter()
            .chain(options)
            .fold(
                Self {
                    anchor,
                    budget: Budget::Timeout(DEFAULT_TIMEOUT),
                    gap: DEFAULT_GAP,
                },
                Self::apply,
            )
    }

    fn apply(self, option: PolicyOption) -> Self {
        match option {
            PolicyOption::Timeout(d) => Self {
                budget: Budget::Timeout(d),
                ..self
            },
            PolicyOption::Attempts(n) => Self {
                budget: Budget::Attempts(n.max(1)),
                ..self
            },
            PolicyOption::Gap(gap) => Self { gap, ..self },
        }
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    pub fn gap(&self) -> Duration {
        self.gap
    }

    /// When the constraint stops waiting, or `None` when bounded by attempts.
    ///
    /// A timeout too large to represent as an instant also yields `None`.
    pub fn deadline(&self) -> Option<Instant> {
        match self.budget {
            Budget::Timeout(d) => self.anchor.checked_add(d),
            Budget::Attempts(_) => None,
        }
    }

    /// Maximum number of attempts, or `None` when bounded by time.
    pub fn max_attempts(&self) -> Option<u32> {
        match self.budget {
            Budget::Attempts(n) => Some(n),
            Budget::Timeout(_) => None,
        }
    }

    /// Whether `attempts` probe calls use up the budget.
    pub(crate) fn attempts_spent(&self, attempts: u32) -> bool {
        self.max_attempts().is_some_and(|max| attempts >= max)
    }
}
