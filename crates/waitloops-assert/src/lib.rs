//! # waitloops-assert
//!
//! Test assertions over [`waitloops_core::Constraint`].
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use waitloops_assert::assert_wait;
//! use waitloops_core::Constraint;
//!
//! assert_wait(&mut Constraint::initial_success()
//!     .bool_fn(move || server.is_listening())
//!     .timeout(Duration::from_secs(1))
//!     .build());
//! ```

mod postscript;
mod reporter;

pub use postscript::PostScript;
pub use reporter::{Panicking, Recorder, Reporter};

use tracing::debug;
use waitloops_core::Constraint;

/// Run `constraint` and describe the failure, if any.
pub fn wait_message(constraint: &mut Constraint) -> Option<String> {
    let err = constraint.run().err()?;
    debug!(mode = %constraint.mode(), error = %err, "Wait assertion failed");
    Some(format!(
        "expected condition to pass within wait context\n↪ error: {}",
        err
    ))
}

/// Run `constraint`, reporting a failure to `reporter`. Returns whether it passed.
#[track_caller]
pub fn check_wait<R>(reporter: &mut R, constraint: &mut Constraint, scripts: &[PostScript]) -> bool
where
    R: Reporter + ?Sized,
{
    match wait_message(constraint) {
        None => true,
        Some(message) => {
            reporter.fail(&render(&message, scripts));
            false
        }
    }
}

/// Assert that `constraint` passes, panicking otherwise.
#[track_caller]
pub fn assert_wait(constraint: &mut Constraint) {
    check_wait(&mut Panicking, constraint, &[]);
}

/// Like [`assert_wait`], with extra context on failure.
#[track_caller]
pub fn assert_wait_with(constraint: &mut Constraint, scripts: &[PostScript]) {
    check_wait(&mut Panicking, constraint, scripts);
}

fn render(message: &str, scripts: &[PostScript]) -> String {
    let mut out = message.trim().to_string();
    for script in scripts {
        out.push('\n');
        out.push_str(&script.to_string());
    }
    out
}
