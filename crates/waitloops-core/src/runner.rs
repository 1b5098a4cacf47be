use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::{Attempt, AttemptCallback, AttemptStatus, Mode, Observation, Policy, Probe, WaitError};

/// What to do after a probe call that did not end the wait
enum Pause {
    /// Sleep the full gap, then probe again
    Gap(Duration),
    /// The deadline arrives first; sleep until it, then stop
    Deadline(Duration),
}

/// State of one `run` call
pub(crate) struct Runner<'c> {
    mode: Mode,
    policy: &'c Policy,
    probe: &'c mut Probe,
    on_attempt: Option<&'c AttemptCallback>,
    attempts: u32,
    last: Option<Observation>,
    started: Instant,
}

impl<'c> Runner<'c> {
    pub(crate) fn new(
        mode: Mode,
        policy: &'c Policy,
        probe: &'c mut Probe,
        on_attempt: Option<&'c AttemptCallback>,
    ) -> Self {
        Self {
            mode,
            policy,
            probe,
            on_attempt,
            attempts: 0,
            last: None,
            started: Instant::now(),
        }
    }

    /// Run the poll loop, blocking the current thread between attempts
    pub(crate) fn run_blocking(mut self) -> Result<(), WaitError> {
        loop {
            if let Some(done) = self.attempt() {
                return self.finish(done);
            }

            match self.pause() {
                Pause::Gap(gap) => std::thread::sleep(gap),
                Pause::Deadline(remaining) => {
                    std::thread::sleep(remaining);
                    let done = self.deadline_reached();
                    return self.finish(done);
                }
            }
        }
    }

    /// Run the poll loop on the tokio timer
    pub(crate) async fn run_async(mut self) -> Result<(), WaitError> {
        let deadline = self.policy.deadline().map(tokio::time::Instant::from_std);

        loop {
            if let Some(done) = self.attempt() {
                return self.finish(done);
            }

            let gap = tokio::time::sleep(self.policy.gap());
            match deadline {
                Some(deadline) => {
                    tokio::select! {
                        biased;

                        _ = tokio::time::sleep_until(deadline) => {
                            let done = self.deadline_reached();
                            return self.finish(done);
                        }
                        _ = gap => {}
                    }
                }
                None => gap.await,
            }
        }
    }

    /// Invoke the probe once. Returns `Some` when the wait is over.
    fn attempt(&mut self) -> Option<Result<(), WaitError>> {
        let observation = self.probe.observe();
        self.attempts += 1;
        self.notify(&observation);

        let spent = self.policy.attempts_spent(self.attempts);
        let kind = self.probe.kind();

        match (self.mode, observation) {
            (Mode::InitialSuccess, Observation::Satisfied) => Some(Ok(())),
            (Mode::InitialSuccess, failed) => {
                if spent {
                    Some(Err(WaitError::AttemptsExceeded {
                        cause: kind.exhausted_cause(Some(failed)),
                    }))
                } else {
                    self.last = Some(failed);
                    None
                }
            }
            (Mode::ContinualSuccess, Observation::Satisfied) => spent.then_some(Ok(())),
            (Mode::ContinualSuccess, broken) => Some(Err(kind.broken(broken))),
        }
    }

    fn pause(&self) -> Pause {
        let gap = self.policy.gap();
        match self.policy.deadline() {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining <= gap {
                    Pause::Deadline(remaining)
                } else {
                    Pause::Gap(gap)
                }
            }
            None => Pause::Gap(gap),
        }
    }

    fn deadline_reached(&mut self) -> Result<(), WaitError> {
        match self.mode {
            Mode::InitialSuccess => Err(WaitError::TimeoutExceeded {
                cause: self.probe.kind().exhausted_cause(self.last.take()),
            }),
            // surviving until the deadline is the goal
            Mode::ContinualSuccess => Ok(()),
        }
    }

    fn notify(&self, observation: &Observation) {
        let elapsed = self.started.elapsed();
        let status = AttemptStatus::from(observation);

        trace!(
            attempt = self.attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            status = ?status,
            "Probe observed"
        );

        if let Some(callback) = self.on_attempt {
            callback(&Attempt {
                number: self.attempts,
                elapsed,
                status,
            });
        }
    }

    fn finish(&self, result: Result<(), WaitError>) -> Result<(), WaitError> {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => debug!(
                mode = %self.mode,
                attempts = self.attempts,
                elapsed_ms,
                "Wait satisfied"
            ),
            Err(e) => info!(
                mode = %self.mode,
                attempts = self.attempts,
                elapsed_ms,
                error = %e,
                "Wait failed"
            ),
        }
        result
    }
}
