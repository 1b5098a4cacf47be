use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::runner::Runner;
use crate::{Attempt, AttemptCallback, BoxError, Mode, Policy, PolicyOption, Probe, WaitError};

/// A condition to wait on, with the limits that mark the wait as failed.
///
/// A constraint bounded by a timeout retries its probe until the deadline
/// passes; one bounded by attempts retries until the attempts are used up.
/// The pause between attempts is the policy gap.
///
/// The deadline is fixed when the constraint is built. Calling [`run`] again
/// after it has passed makes one probe call and then stops.
///
/// [`run`]: Constraint::run
pub struct Constraint {
    mode: Mode,
    policy: Policy,
    probe: Option<Probe>,
    on_attempt: Option<AttemptCallback>,
}

impl Constraint {
    /// Start building a constraint that waits for the probe to succeed once.
    pub fn initial_success() -> ConstraintBuilder {
        ConstraintBuilder::new(Mode::InitialSuccess)
    }

    /// Start building a constraint that requires the probe to keep succeeding.
    pub fn continual_success() -> ConstraintBuilder {
        ConstraintBuilder::new(Mode::ContinualSuccess)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Run the constraint, blocking the calling thread until it resolves.
    pub fn run(&mut self) -> Result<(), WaitError> {
        let probe = self.probe.as_mut().ok_or(WaitError::NoFunction)?;
        Runner::new(self.mode, &self.policy, probe, self.on_attempt.as_ref()).run_blocking()
    }

    /// Run the constraint on the tokio timer.
    ///
    /// The probe is still called synchronously and should not block.
    pub async fn run_async(&mut self) -> Result<(), WaitError> {
        let probe = self.probe.as_mut().ok_or(WaitError::NoFunction)?;
        Runner::new(self.mode, &self.policy, probe, self.on_attempt.as_ref())
            .run_async()
            .await
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("mode", &self.mode)
            .field("policy", &self.policy)
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

/// Collects options for a [`Constraint`]
#[must_use]
pub struct ConstraintBuilder {
    mode: Mode,
    options: Vec<PolicyOption>,
    probe: Option<Probe>,
    on_attempt: Option<AttemptCallback>,
}

impl ConstraintBuilder {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            options: Vec::new(),
            probe: None,
            on_attempt: None,
        }
    }

    /// Fail once `timeout` has passed. Disables the attempts limit.
    ///
    /// Default 3 seconds.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.option(PolicyOption::Timeout(timeout))
    }

    /// Fail after `max` attempts. Disables the timeout.
    pub fn attempts(self, max: u32) -> Self {
        self.option(PolicyOption::Attempts(max))
    }

    /// Time to wait between attempts.
    ///
    /// Default 250 milliseconds.
    pub fn gap(self, gap: Duration) -> Self {
        self.option(PolicyOption::Gap(gap))
    }

    pub fn option(mut self, option: PolicyOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = PolicyOption>,
    {
        self.options.extend(options);
        self
    }

    /// Wait on `f` returning `true`. Replaces any previous probe.
    pub fn bool_fn<F>(self, f: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.probe(Probe::from_bool(f))
    }

    /// Wait on `f` returning `Ok(())`. Replaces any previous probe.
    pub fn error_fn<F, E>(self, f: F) -> Self
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
        E: Into<BoxError>,
    {
        self.probe(Probe::from_error(f))
    }

    /// Wait on `f` returning `Ok(true)`. Replaces any previous probe.
    pub fn test_fn<F, E>(self, f: F) -> Self
    where
        F: FnMut() -> Result<bool, E> + Send + 'static,
        E: Into<BoxError>,
    {
        self.probe(Probe::from_test(f))
    }

    pub fn probe(mut self, probe: Probe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Observe every probe call
    pub fn on_attempt<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Attempt) + Send + Sync + 'static,
    {
        self.on_attempt = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Constraint {
        Constraint {
            mode: self.mode,
            policy: Policy::fold(Instant::now(), self.options),
            probe: self.probe,
            on_attempt: self.on_attempt,
        }
    }
}
