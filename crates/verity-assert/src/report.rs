//! The reporting boundary between assertions and the test harness.

use std::cell::RefCell;

/// The slice of test-harness behavior assertions depend on.
///
/// Both methods carry `#[track_caller]` so that failure locations attribute
/// to the assertion call site rather than to engine internals.
pub trait Reporter {
    /// Records a failure and lets the test keep executing.
    #[track_caller]
    fn report(&self, message: &str);

    /// Records a failure and aborts the current test. Must not return.
    #[track_caller]
    fn report_fatal(&self, message: &str) -> !;
}

impl<R: Reporter + ?Sized> Reporter for &R {
    #[track_caller]
    fn report(&self, message: &str) {
        (**self).report(message);
    }

    #[track_caller]
    fn report_fatal(&self, message: &str) -> ! {
        (**self).report_fatal(message)
    }
}

/// Default [`Reporter`] for tests run under the standard harness.
///
/// Fatal failures panic immediately with the diagnostic as the payload,
/// which is how a single test aborts. Recoverable failures print to stderr
/// and accumulate; if any were recorded, dropping the harness at the end of
/// the test panics once, so a test that continued past failures still
/// fails.
///
/// # Example
///
/// ```
/// use verity_assert::{equal, Harness};
///
/// let t = Harness::new();
/// equal(&t, &(2 + 2), &4, &[]);
/// ```
#[derive(Default)]
pub struct Harness {
    recoverable: RefCell<Vec<String>>,
}

impl Harness {
    /// Creates a harness for one test.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recoverable failures recorded so far.
    pub fn failure_count(&self) -> usize {
        self.recoverable.borrow().len()
    }
}

impl Reporter for Harness {
    fn report(&self, message: &str) {
        eprintln!("{message}");
        self.recoverable.borrow_mut().push(message.to_string());
    }

    #[track_caller]
    fn report_fatal(&self, message: &str) -> ! {
        panic!("{message}")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let count = self.recoverable.get_mut().len();
        if count > 0 && !std::thread::panicking() {
            panic!("{count} recoverable assertion failure(s)");
        }
    }
}
