//! End-to-end tests for the assertion functions, driven through a
//! recording reporter so both delivery channels can be observed.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use thiserror::Error;
use verity_assert::{
    allow_private, comparer, contains, continue_on_failure, equal, err, error_is, fatal, is_false,
    is_true, message, msg, not_equal, not_zero, ok, options, panics, subsequence, within, zero,
    Harness, Inspect, Record, Reporter, Value,
};

/// Captures reporter traffic. The fatal channel still unwinds, as the
/// contract demands, so fatal cases run under `catch_unwind`.
#[derive(Clone, Default)]
struct Recording {
    log: Arc<Mutex<Vec<(bool, String)>>>,
}

impl Reporter for Recording {
    fn report(&self, message: &str) {
        self.log.lock().unwrap().push((false, message.to_string()));
    }

    fn report_fatal(&self, message: &str) -> ! {
        self.log.lock().unwrap().push((true, message.to_string()));
        panic!("fatal assertion");
    }
}

impl Recording {
    /// Drains the log, expecting exactly one report.
    fn take_single(&self) -> (bool, String) {
        let mut log = self.log.lock().unwrap();
        assert_eq!(log.len(), 1, "expected exactly one report: {log:?}");
        log.pop().expect("log is non-empty")
    }
}

fn expect_fatal(recording: &Recording, run: impl FnOnce()) -> String {
    let outcome = catch_unwind(AssertUnwindSafe(run));
    assert!(outcome.is_err(), "expected a fatal failure");
    let (fatal, text) = recording.take_single();
    assert!(fatal, "expected the fatal channel, got the recoverable one");
    text
}

fn expect_recoverable(recording: &Recording, run: impl FnOnce()) -> String {
    run();
    let (fatal, text) = recording.take_single();
    assert!(!fatal, "expected the recoverable channel, got the fatal one");
    text
}

/// A record with a private field, the shape the comparator refuses to
/// introspect without help.
#[derive(Default)]
struct Point {
    x: f64,
    y: f64,
}

impl Inspect for Point {
    fn inspect(&self) -> Value<'_> {
        Record::of(self)
            .field("x", self.x.inspect())
            .private_field("y", self.y.inspect())
            .into()
    }
}

fn point_equality(a: &Point, b: &Point) -> bool {
    a.x == b.x && a.y == b.y
}

#[test]
fn test_equal() {
    let t = Harness::new();
    equal(&t, &1, &1, &[]);
    equal(&t, &"hello".to_string(), &"hello".to_string(), &[]);
    equal(&t, &vec![1, 2, 3], &vec![1, 2, 3], &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        equal(&recording, &1, &2, &[]);
    });
    assert_eq!(text, "got != want\ndiff (+got, -want):\n+ 1\n- 2");
}

#[test]
fn test_not_equal() {
    let t = Harness::new();
    not_equal(&t, &1, &2, &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        not_equal(&recording, &7, &7, &[]);
    });
    assert_eq!(text, "got == want\ngot: 7");
}

#[test]
fn test_equal_returns_outcome_under_continue() {
    let recording = Recording::default();
    assert!(equal(&recording, &1, &1, &[continue_on_failure()]));
    assert!(!equal(&recording, &1, &2, &[continue_on_failure()]));
    let (fatal, _) = recording.take_single();
    assert!(!fatal);
}

#[derive(Debug, PartialEq, Error)]
enum StoreError {
    #[error("missing key {0}")]
    Missing(String),
}

#[derive(Debug, Error)]
#[error("lookup failed: {source}")]
struct LookupError {
    #[from]
    source: StoreError,
}

#[test]
fn test_results() {
    let t = Harness::new();
    let success: Result<u32, StoreError> = Ok(7);
    let failure: Result<u32, StoreError> = Err(StoreError::Missing("k".to_string()));
    ok(&t, &success, &[]);
    err(&t, &failure, &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        ok(&recording, &failure, &[]);
    });
    assert_eq!(
        text,
        "unexpected error\nerror: missing key k\ntype: StoreError"
    );

    let text = expect_fatal(&recording, || {
        err(&recording, &success, &[]);
    });
    assert_eq!(text, "unexpected success");
}

#[test]
fn test_error_is() {
    let t = Harness::new();
    let wrapped = LookupError::from(StoreError::Missing("k".to_string()));
    error_is(&t, &wrapped, &StoreError::Missing("k".to_string()), &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        error_is(
            &recording,
            &wrapped,
            &StoreError::Missing("other".to_string()),
            &[],
        );
    });
    assert_eq!(
        text,
        "got error does not contain want\ngot: lookup failed: missing key k\nwant: missing key other"
    );
}

#[test]
fn test_zero() {
    let t = Harness::new();
    zero(&t, &0, &[]);
    zero(&t, &None::<i32>, &[]);
    zero(&t, &Vec::<i32>::new(), &[]);
    not_zero(&t, &3, &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        zero(&recording, &3, &[]);
    });
    assert_eq!(text, "got non-zero i32\ndiff (+got, -zero):\n+ 3\n- 0");

    let text = expect_fatal(&recording, || {
        not_zero(&recording, &0, &[]);
    });
    assert_eq!(text, "got zero i32");
}

#[test]
fn test_bool() {
    let t = Harness::new();
    is_true(&t, true, &[]);
    is_false(&t, false, &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        is_true(&recording, false, &[]);
    });
    assert_eq!(text, "got false, want true");

    let text = expect_fatal(&recording, || {
        is_false(&recording, true, &[]);
    });
    assert_eq!(text, "got true, want false");
}

#[test]
fn test_panics() {
    let t = Harness::new();
    panics(&t, || panic!("oh no"), &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        panics(&recording, || {}, &[]);
    });
    assert_eq!(text, "no panic");
}

#[test]
fn test_within() {
    let t = Harness::new();
    within(&t, 3.0, 3.05, 0.1, &[]);
    within(&t, 3.1, 3.05, 0.1, &[]);
    // A negative delta swaps the bounds instead of failing.
    within(&t, 11, 10, -3, &[]);

    let recording = Recording::default();
    // Bounds are exclusive; 2.5 and 3.5 sit exactly on them.
    let text = expect_fatal(&recording, || {
        within(&recording, 2.5, 3.0, 0.5, &[]);
    });
    assert_eq!(text, "2.5 not within 0.5 of 3.0");
    expect_fatal(&recording, || {
        within(&recording, 3.5, 3.0, 0.5, &[]);
    });
    expect_fatal(&recording, || {
        within(&recording, 3.0, 3.05, 0.01, &[]);
    });
    expect_fatal(&recording, || {
        within(&recording, 3.0, 3.0, f64::NAN, &[]);
    });
}

#[test]
fn test_contains() {
    let t = Harness::new();
    contains(&t, &[0, 1, 2], &1, &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        contains(&recording, &[0, 1], &2, &[]);
    });
    assert_eq!(text, "got does not contain want\ngot: [0, 1]\nwant: 2");
}

#[test]
fn test_subsequence() {
    let t = Harness::new();
    subsequence(&t, "hello world", "hello", &[]);
    subsequence(&t, b"deadbeef".as_slice(), b"ee".as_slice(), &[]);
    subsequence(&t, "anything", "", &[]);

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        subsequence(&recording, "hello world", "mars", &[]);
    });
    assert_eq!(text, "got does not contain want\ngot: hello world\nwant: mars");
}

#[test]
fn test_message_rides_the_first_line() {
    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        is_true(&recording, false, &[message("a message")]);
    });
    assert_eq!(text, "got false, want true: a message");

    let text = expect_fatal(&recording, || {
        equal(&recording, &1, &2, &[msg!("{} {}", "a", "message")]);
    });
    assert!(text.starts_with("got != want: a message\n"));
    assert!(!text.contains("diff (+got, -want): a message"));
}

#[test]
fn test_continue_and_fatal_compose() {
    let recording = Recording::default();
    let text = expect_recoverable(&recording, || {
        is_true(&recording, false, &[continue_on_failure()]);
    });
    assert_eq!(text, "got false, want true");

    // Last mode wins, including through bundles.
    expect_fatal(&recording, || {
        is_true(&recording, false, &[continue_on_failure(), fatal()]);
    });
    expect_fatal(&recording, || {
        is_true(&recording, false, &[options([continue_on_failure(), fatal()])]);
    });
    expect_recoverable(&recording, || {
        is_true(
            &recording,
            false,
            &[options([fatal()]), options([continue_on_failure()])],
        );
    });
}

#[test]
fn test_private_fields_fail_recoverably_with_guidance() {
    let recording = Recording::default();
    let got = Point { x: 1.0, y: 1.0 };
    let want = Point { x: 1.0, y: 2.0 };
    let text = expect_recoverable(&recording, || {
        assert!(!equal(
            &recording,
            &got,
            &want,
            &[continue_on_failure(), message("discarded")]
        ));
    });
    assert!(text.starts_with("found private field Point.y\n"));
    assert!(text.contains("allow_private or comparer"));
    assert!(text.contains("Inspect implementation"));
    assert!(text.contains("policy()"));
    assert!(!text.contains("discarded"));
}

#[test]
fn test_allow_lifts_private_field_refusal() {
    let t = Harness::new();
    let sample = Point::default();
    zero(&t, &Point::default(), &[allow_private(&sample)]);
    equal(
        &t,
        &Point { x: 1.0, y: 1.0 },
        &Point { x: 1.0, y: 1.0 },
        &[allow_private(&sample)],
    );

    let recording = Recording::default();
    let text = expect_fatal(&recording, || {
        equal(
            &recording,
            &Point { x: 1.0, y: 1.0 },
            &Point { x: 1.0, y: 2.0 },
            &[allow_private(&Point::default())],
        );
    });
    assert_eq!(
        text,
        "got != want\ndiff (+got, -want):\ny:\n  + 1.0\n  - 2.0"
    );
}

#[test]
fn test_comparer_bypasses_private_field_refusal() {
    let t = Harness::new();
    equal(
        &t,
        &Point { x: 1.0, y: 1.0 },
        &Point { x: 1.0, y: 1.0 },
        &[comparer(point_equality)],
    );

    struct Mod3(i32);

    impl Inspect for Mod3 {
        fn inspect(&self) -> Value<'_> {
            Record::of(self).private_field("0", self.0.inspect()).into()
        }
    }

    equal(
        &t,
        &Mod3(3),
        &Mod3(6),
        &[comparer(|a: &Mod3, b: &Mod3| a.0 % 3 == b.0 % 3)],
    );
}

#[test]
fn test_reusable_option_bundles() {
    let defaults = || options([continue_on_failure(), comparer(point_equality)]);
    let recording = Recording::default();

    assert!(equal(
        &recording,
        &Point { x: 0.5, y: 0.5 },
        &Point { x: 0.5, y: 0.5 },
        &[defaults()]
    ));

    // The bundle's Continue survives unless a later option reverses it.
    expect_recoverable(&recording, || {
        assert!(!equal(
            &recording,
            &Point { x: 0.0, y: 0.0 },
            &Point { x: 1.0, y: 0.0 },
            &[defaults()]
        ));
    });
    expect_fatal(&recording, || {
        equal(
            &recording,
            &Point { x: 0.0, y: 0.0 },
            &Point { x: 1.0, y: 0.0 },
            &[defaults(), fatal()],
        );
    });
}

#[test]
fn test_contains_recovers_comparator_refusals() {
    let recording = Recording::default();
    let haystack = [Point { x: 0.0, y: 0.0 }];
    let needle = Point { x: 0.0, y: 0.0 };
    let text = expect_recoverable(&recording, || {
        assert!(!contains(
            &recording,
            &haystack,
            &needle,
            &[continue_on_failure()]
        ));
    });
    assert!(text.starts_with("found private field Point.y"));
}

#[test]
fn test_json_documents_compare_structurally() {
    let t = Harness::new();
    let got = serde_json::json!({"name": "verity", "tags": ["a", "b"]});
    let want = serde_json::json!({"name": "verity", "tags": ["a", "b"]});
    equal(&t, &got, &want, &[]);

    let recording = Recording::default();
    let want = serde_json::json!({"name": "verity", "tags": ["a", "c"]});
    let text = expect_fatal(&recording, || {
        equal(&recording, &got, &want, &[]);
    });
    assert!(text.contains("[\"tags\"][1]:"));
    assert!(text.contains("+ \"b\""));
    assert!(text.contains("- \"c\""));
}
