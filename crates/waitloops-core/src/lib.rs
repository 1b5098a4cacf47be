//! # waitloops-core
//!
//! Constructs for waiting on conditions within time and attempt limits.
//!
//! A [`Constraint`] repeatedly invokes a probe until it reports success, a
//! deadline passes, or an attempt budget runs out. It is meant for asserting
//! on eventually-consistent state in tests.
//!
//! ## Key Types
//!
//! - [`Constraint`] - The evaluator, built with [`ConstraintBuilder`]
//! - [`Policy`] - Deadline or attempt budget plus the gap between attempts
//! - [`Mode`] - Initial success ("eventually") or continual success ("always")
//! - [`Probe`] - One observation of the condition (bool, error, or test shape)
//! - [`WaitError`] - Classified failure returned by [`Constraint::run`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use waitloops_core::Constraint;
//!
//! let mut constraint = Constraint::initial_success()
//!     .bool_fn(move || worker.is_finished())
//!     .timeout(Duration::from_secs(1))
//!     .gap(Duration::from_millis(100))
//!     .build();
//!
//! constraint.run()?;
//! ```
//!
//! ## Modes
//!
//! - `InitialSuccess` - stop as soon as the probe first succeeds
//! - `ContinualSuccess` - the probe must succeed on every attempt until the
//!   budget is spent; the first failure ends the wait

mod attempt;
mod constraint;
mod error;
mod mode;
mod policy;
mod probe;
mod runner;

pub use attempt::{Attempt, AttemptCallback, AttemptStatus};
pub use constraint::{Constraint, ConstraintBuilder};
pub use error::{BoxError, WaitError};
pub use mode::Mode;
pub use policy::{Budget, Policy, PolicyOption, DEFAULT_GAP, DEFAULT_TIMEOUT};
pub use probe::{Observation, Probe, ProbeKind};
