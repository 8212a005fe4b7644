//! Per-assertion session: comparison, diagnostics, and delivery.

use verity_compare::{deep_diff, deep_equal, CompareError, Inspect, Policy};

use crate::opt::Opt;
use crate::report::Reporter;

/// Best-effort marker in comparator refusal messages; see
/// [`CompareError::PrivateField`]. If the comparator's wording drifts, the
/// generic fallback diagnostic takes over.
const PRIVATE_FIELD_PREFIX: &str = "cannot handle private field at ";

/// Failure-delivery modes. Fatal is the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FailureMode {
    Fatal,
    Continue,
}

/// State for a single assertion call.
///
/// Created, driven, and concluded inside one assertion function; it never
/// escapes the call. The buffer is write-only until [`Session::conclude`]
/// reads it exactly once.
pub(crate) struct Session<'a> {
    reporter: &'a dyn Reporter,
    pub(crate) mode: FailureMode,
    pub(crate) message: Option<String>,
    pub(crate) policy: Policy,
    buffer: String,
}

impl<'a> Session<'a> {
    pub(crate) fn new(reporter: &'a dyn Reporter, opts: &[Opt]) -> Self {
        let mut session = Session {
            reporter,
            mode: FailureMode::Fatal,
            message: None,
            policy: Policy::new(),
            buffer: String::new(),
        };
        for opt in opts {
            opt.apply(&mut session);
        }
        session
    }

    /// Policy-aware equality. `None` means the comparator refused to
    /// introspect the values; the explanation is already buffered and the
    /// caller must conclude without attempting a second comparison.
    pub(crate) fn equal<T>(&mut self, got: &T, want: &T) -> Option<bool>
    where
        T: Inspect + ?Sized,
    {
        match deep_equal(got, want, &self.policy) {
            Ok(equal) => Some(equal),
            Err(refusal) => {
                self.explain_refusal(&refusal);
                None
            }
        }
    }

    /// Policy-aware structural diff; an empty string means equal. Same
    /// recovery contract as [`Session::equal`].
    pub(crate) fn diff<T>(&mut self, got: &T, want: &T) -> Option<String>
    where
        T: Inspect + ?Sized,
    {
        match deep_diff(got, want, &self.policy) {
            Ok(diff) => Some(diff),
            Err(refusal) => {
                self.explain_refusal(&refusal);
                None
            }
        }
    }

    /// Turns a comparator refusal into an actionable local failure instead
    /// of letting it take down the run.
    fn explain_refusal(&mut self, refusal: &CompareError) {
        // The structural cause outranks the caller's annotation.
        self.message = None;
        let text = refusal.to_string();
        let field = text
            .strip_prefix(PRIVATE_FIELD_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .map(|(field, _)| field.to_string());
        let Some(field) = field else {
            self.line(format!("comparator failure: {text}"));
            return;
        };
        self.line(format!("found private field {field}"));
        self.line("if you control the type, inspect it as an opaque value so its own equality applies; otherwise,");
        self.line("  - pass allow_private or comparer for this assertion,");
        self.line("  - expose the field in the type's Inspect implementation, or");
        self.line("  - pass a ready-made Customization for the type via policy().");
    }

    /// Appends one diagnostic line. The user message, when set, rides on
    /// the first line only.
    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if self.buffer.is_empty() {
            self.buffer.push_str(text);
            if let Some(message) = self.message.take() {
                self.buffer.push_str(": ");
                self.buffer.push_str(&message);
            }
        } else {
            self.buffer.push('\n');
            self.buffer.push_str(text);
        }
    }

    /// Delivers the buffered diagnostic, if any, through exactly one
    /// reporter channel. Returns true when the assertion passed.
    #[track_caller]
    pub(crate) fn conclude(self) -> bool {
        if self.buffer.is_empty() {
            return true;
        }
        match self.mode {
            FailureMode::Fatal => self.reporter.report_fatal(&self.buffer),
            FailureMode::Continue => {
                self.reporter.report(&self.buffer);
                false
            }
        }
    }
}
