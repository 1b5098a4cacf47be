use std::error::Error as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use waitloops_core::{BoxError, Constraint, PolicyOption, WaitError};

/// Helper: a shared call counter and a clone to move into a probe.
fn calls() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    (counter.clone(), counter)
}

// ============================================================
// Always-succeeding probes
// ============================================================

#[test]
fn test_always_true_passes_in_both_modes() {
    let budgets = [
        vec![PolicyOption::Attempts(3)],
        vec![PolicyOption::Timeout(Duration::from_millis(50))],
        vec![
            PolicyOption::Attempts(4),
            PolicyOption::Gap(Duration::from_millis(1)),
        ],
    ];

    for options in budgets {
        let mut initial = Constraint::initial_success()
            .bool_fn(|| true)
            .options(options.clone())
            .build();
        assert!(initial.run().is_ok(), "initial with {:?}", options);

        let mut continual = Constraint::continual_success()
            .error_fn(|| Ok::<(), BoxError>(()))
            .options(options.clone())
            .gap(Duration::from_millis(1))
            .build();
        assert!(continual.run().is_ok(), "continual with {:?}", options);
    }
}

// ============================================================
// Initial success
// ============================================================

#[test]
fn test_initial_attempts_exceeded_after_exactly_three_calls() {
    let (counter, seen) = calls();
    let mut c = Constraint::initial_success()
        .bool_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        })
        .attempts(3)
        .gap(Duration::from_millis(1))
        .build();

    let err = c.run().unwrap_err();
    assert!(matches!(err, WaitError::AttemptsExceeded { cause: None }));
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn test_initial_timeout_respects_deadline() {
    let gap = Duration::from_millis(1);
    let timeout = Duration::from_millis(100);
    let started = Instant::now();
    let mut c = Constraint::initial_success()
        .bool_fn(|| false)
        .timeout(timeout)
        .gap(gap)
        .build();

    let err = c.run().unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout());
    assert!(elapsed >= timeout, "returned early after {:?}", elapsed);
    // one gap of slack plus scheduler noise
    assert!(
        elapsed < timeout + gap + Duration::from_millis(100),
        "overslept: {:?}",
        elapsed
    );
}

#[test]
fn test_initial_true_on_third_call() {
    let (counter, seen) = calls();
    let gap = Duration::from_millis(100);
    let started = Instant::now();
    let mut c = Constraint::initial_success()
        .bool_fn(move || counter.fetch_add(1, Ordering::SeqCst) == 2)
        .timeout(Duration::from_secs(1))
        .gap(gap)
        .build();

    assert!(c.run().is_ok());
    assert_eq!(seen.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() >= gap * 2);
}

#[test]
fn test_initial_error_cause_is_chained() {
    let mut c = Constraint::initial_success()
        .error_fn(|| Err::<(), _>(std::io::Error::other("port 8080 closed")))
        .timeout(Duration::from_millis(20))
        .gap(Duration::from_millis(5))
        .build();

    let err = c.run().unwrap_err();
    assert_eq!(err.to_string(), "wait: timeout exceeded: port 8080 closed");
    let source = err.source().expect("cause should be chained");
    assert!(source.downcast_ref::<std::io::Error>().is_some());
}

// ============================================================
// Continual success
// ============================================================

#[test]
fn test_continual_stops_after_budget() {
    let (counter, seen) = calls();
    let mut c = Constraint::continual_success()
        .bool_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .attempts(5)
        .gap(Duration::from_millis(1))
        .build();

    assert!(c.run().is_ok());
    assert_eq!(seen.load(Ordering::SeqCst), 5);
}

#[test]
fn test_continual_fails_immediately_on_flip() {
    let (counter, seen) = calls();
    let started = Instant::now();
    let mut c = Constraint::continual_success()
        .bool_fn(move || counter.fetch_add(1, Ordering::SeqCst) < 2)
        .timeout(Duration::from_secs(5))
        .gap(Duration::from_millis(10))
        .build();

    let err = c.run().unwrap_err();
    assert!(matches!(err, WaitError::ConditionUnsatisfied { cause: None }));
    assert_eq!(seen.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() < Duration::from_secs(1));
}

// ============================================================
// Configuration
// ============================================================

#[test]
fn test_no_probe_makes_no_calls() {
    let mut c = Constraint::continual_success()
        .timeout(Duration::from_millis(10))
        .build();
    assert!(matches!(c.run(), Err(WaitError::NoFunction)));
}

#[test]
fn test_option_order_decides_budget() {
    // attempts applied last: bounded by attempts, never by the short timeout
    let (counter, seen) = calls();
    let mut c = Constraint::initial_success()
        .bool_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        })
        .timeout(Duration::from_millis(1))
        .attempts(4)
        .gap(Duration::from_millis(5))
        .build();
    assert!(c.run().unwrap_err().is_attempts());
    assert_eq!(seen.load(Ordering::SeqCst), 4);

    // timeout applied last: bounded by time, never by the attempts
    let mut c = Constraint::initial_success()
        .bool_fn(|| false)
        .attempts(1_000_000)
        .timeout(Duration::from_millis(20))
        .gap(Duration::from_millis(1))
        .build();
    assert!(c.run().unwrap_err().is_timeout());
}

// ============================================================
// Async runner
// ============================================================

#[tokio::test]
async fn test_async_initial_success() {
    let (counter, seen) = calls();
    let mut c = Constraint::initial_success()
        .bool_fn(move || counter.fetch_add(1, Ordering::SeqCst) == 1)
        .gap(Duration::from_millis(5))
        .build();

    assert!(c.run_async().await.is_ok());
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_async_timeout_exceeded() {
    let started = Instant::now();
    let mut c = Constraint::initial_success()
        .test_fn(|| Ok::<_, BoxError>(false))
        .timeout(Duration::from_millis(50))
        .gap(Duration::from_secs(10))
        .build();

    let err = c.run_async().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "wait: timeout exceeded: wait: condition unsatisfied"
    );
    // the long gap is cut short by the deadline
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_async_continual_attempts() {
    let (counter, seen) = calls();
    let mut c = Constraint::continual_success()
        .bool_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .attempts(3)
        .gap(Duration::from_millis(1))
        .build();

    assert!(c.run_async().await.is_ok());
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_async_no_function() {
    let mut c = Constraint::initial_success().build();
    assert!(matches!(c.run_async().await, Err(WaitError::NoFunction)));
}

#[test]
fn test_constraint_runs_on_another_thread() {
    let mut c = Constraint::initial_success()
        .bool_fn(|| true)
        .attempts(1)
        .build();
    let handle = std::thread::spawn(move || c.run());
    assert!(handle.join().unwrap().is_ok());
}
