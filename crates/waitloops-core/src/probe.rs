use std::fmt;

use crate::{BoxError, WaitError};

/// Result of invoking a probe once
#[derive(Debug)]
pub enum Observation {
    Satisfied,
    /// The condition does not hold and no error was given
    Unsatisfied,
    Failed(BoxError),
}

impl Observation {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Observation::Satisfied)
    }
}

/// The shape of function a probe was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// `FnMut() -> bool`
    Bool,
    /// `FnMut() -> Result<(), E>`
    Error,
    /// `FnMut() -> Result<bool, E>`
    Test,
}

impl ProbeKind {
    /// Cause to attach when an initial-success wait runs out of budget.
    pub(crate) fn exhausted_cause(self, last: Option<Observation>) -> Option<BoxError> {
        match (self, last) {
            (ProbeKind::Bool, _) => None,
            (_, Some(Observation::Failed(err))) => Some(err),
            (ProbeKind::Test, Some(Observation::Unsatisfied)) => {
                Some(Box::new(WaitError::unsatisfied()))
            }
            _ => None,
        }
    }

    /// Terminal error when a continual-success wait observes a failure.
    pub(crate) fn broken(self, observation: Observation) -> WaitError {
        match (self, observation) {
            (ProbeKind::Error, Observation::Failed(err)) => WaitError::Probe(err),
            (ProbeKind::Test, Observation::Failed(err)) => {
                WaitError::ConditionUnsatisfied { cause: Some(err) }
            }
            _ => WaitError::unsatisfied(),
        }
    }
}

/// A function observing the awaited condition, normalized at attachment time.
pub struct Probe {
    kind: ProbeKind,
    f: Box<dyn FnMut() -> Observation + Send>,
}

impl Probe {
    /// Probe that succeeds when `f` returns `true`.
    pub fn from_bool<F>(mut f: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        Self {
            kind: ProbeKind::Bool,
            f: Box::new(move || {
                if f() {
                    Observation::Satisfied
                } else {
                    Observation::Unsatisfied
                }
            }),
        }
    }

    /// Probe that succeeds when `f` returns `Ok(())`.
    pub fn from_error<F, E>(mut f: F) -> Self
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            kind: ProbeKind::Error,
            f: Box::new(move || match f() {
                Ok(()) => Observation::Satisfied,
                Err(err) => Observation::Failed(err.into()),
            }),
        }
    }

    /// Probe that succeeds when `f` returns `Ok(true)`.
    ///
    /// `Ok(false)` is a failure without a reason; `Err(e)` is a failure
    /// explained by `e`.
    pub fn from_test<F, E>(mut f: F) -> Self
    where
        F: FnMut() -> Result<bool, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            kind: ProbeKind::Test,
            f: Box::new(move || match f() {
                Ok(true) => Observation::Satisfied,
                Ok(false) => Observation::Unsatisfied,
                Err(err) => Observation::Failed(err.into()),
            }),
        }
    }

    pub fn kind(&self) -> ProbeKind {
        self.kind
    }

    pub fn observe(&mut self) -> Observation {
        (self.f)()
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe").field("kind", &self.kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_adapter() {
        let mut flip = false;
        let mut probe = Probe::from_bool(move || {
            flip = !flip;
            flip
        });
        assert_eq!(probe.kind(), ProbeKind::Bool);
        assert!(probe.observe().is_satisfied());
        assert!(matches!(probe.observe(), Observation::Unsatisfied));
    }

    #[test]
    fn test_error_adapter_keeps_error() {
        let mut probe = Probe::from_error(|| Err::<(), _>("connection refused"));
        assert_eq!(probe.kind(), ProbeKind::Error);
        match probe.observe() {
            Observation::Failed(err) => assert_eq!(err.to_string(), "connection refused"),
            other => panic!("unexpected observation: {:?}", other),
        }
    }

    #[test]
    fn test_test_adapter() {
        let mut calls = 0;
        let mut probe = Probe::from_test(move || {
            calls += 1;
            match calls {
                1 => Ok(false),
                2 => Err(std::io::Error::other("not yet")),
                _ => Ok(true),
            }
        });
        assert!(matches!(probe.observe(), Observation::Unsatisfied));
        assert!(matches!(probe.observe(), Observation::Failed(_)));
        assert!(probe.observe().is_satisfied());
    }

    #[test]
    fn test_exhausted_cause_by_kind() {
        assert!(ProbeKind::Bool
            .exhausted_cause(Some(Observation::Unsatisfied))
            .is_none());
        assert_eq!(
            ProbeKind::Error
                .exhausted_cause(Some(Observation::Failed("oops".into())))
                .unwrap()
                .to_string(),
            "oops"
        );
        assert_eq!(
            ProbeKind::Test
                .exhausted_cause(Some(Observation::Unsatisfied))
                .unwrap()
                .to_string(),
            "wait: condition unsatisfied"
        );
        assert!(ProbeKind::Test.exhausted_cause(None).is_none());
    }

    #[test]
    fn test_broken_by_kind() {
        assert!(ProbeKind::Bool
            .broken(Observation::Unsatisfied)
            .is_unsatisfied());

        let err = ProbeKind::Error.broken(Observation::Failed("oops".into()));
        assert!(matches!(err, WaitError::Probe(_)));
        assert_eq!(err.to_string(), "oops");

        let err = ProbeKind::Test.broken(Observation::Failed("oops".into()));
        assert_eq!(err.to_string(), "wait: condition unsatisfied: oops");

        let err = ProbeKind::Test.broken(Observation::Unsatisfied);
        assert_eq!(err.to_string(), "wait: condition unsatisfied");
    }
}
