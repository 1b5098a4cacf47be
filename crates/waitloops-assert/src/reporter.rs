/// Receives assertion failures.
///
/// The test harness equivalent of `Errorf` / `Fatalf`: [`Panicking`] fails the
/// test on the spot, [`Recorder`] keeps going and collects every failure.
pub trait Reporter {
    fn fail(&mut self, message: &str);
}

/// Fails the current test by panicking with the failure message
#[derive(Debug, Default, Clone, Copy)]
pub struct Panicking;

impl Reporter for Panicking {
    #[track_caller]
    fn fail(&mut self, message: &str) {
        panic!("\n{}\n", message);
    }
}

/// Collects failures so several assertions can be checked before failing
#[derive(Debug, Default)]
pub struct Recorder {
    failures: Vec<String>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Panic with every recorded failure, if there were any.
    #[track_caller]
    pub fn finish(self) {
        if !self.failures.is_empty() {
            panic!(
                "\n{} assertion(s) failed:\n\n{}\n",
                self.failures.len(),
                self.failures.join("\n\n")
            );
        }
    }
}

impl Reporter for Recorder {
    fn fail(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}
