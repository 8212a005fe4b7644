//! Composable assertion options.

use std::any::Any;

use verity_compare::{Customization, Inspect, Value};

use crate::session::{FailureMode, Session};

/// A configuration action applied to a single assertion.
///
/// Opts are inert values applied strictly left to right: settings that
/// overwrite (message, failure mode) obey last-one-wins, while policy
/// customizations accumulate. Applying the same opts in the same order
/// always produces the same configuration.
pub struct Opt {
    action: Action,
}

enum Action {
    Bundle(Vec<Opt>),
    Message(String),
    Mode(FailureMode),
    Extend(Vec<Customization>),
}

impl Opt {
    pub(crate) fn apply(&self, session: &mut Session<'_>) {
        match &self.action {
            Action::Bundle(opts) => {
                for opt in opts {
                    opt.apply(session);
                }
            }
            Action::Message(message) => session.message = Some(message.clone()),
            Action::Mode(mode) => session.mode = *mode,
            Action::Extend(customizations) => {
                session.policy.extend(customizations.iter().cloned());
            }
        }
    }
}

/// Composes several options into one. Useful for a named bundle of
/// defaults shared by many assertions; applying the bundle applies its
/// children in order, so bundles nest and flatten transparently.
///
/// # Example
///
/// ```
/// use verity_assert::{continue_on_failure, equal, message, options, Harness};
///
/// let defaults = options([continue_on_failure(), message("checking totals")]);
/// let t = Harness::new();
/// equal(&t, &2, &2, &[defaults]);
/// ```
pub fn options(opts: impl IntoIterator<Item = Opt>) -> Opt {
    Opt {
        action: Action::Bundle(opts.into_iter().collect()),
    }
}

/// Adds an explanation to the failure message. If your tests make many
/// similar assertions, the extra context clarifies the output. Rendered as
/// a `: <text>` suffix on the first diagnostic line.
pub fn message(text: impl Into<String>) -> Opt {
    Opt {
        action: Action::Message(text.into()),
    }
}

/// [`message`] with inline formatting. Arguments are formatted immediately,
/// not when the assertion fails.
#[macro_export]
macro_rules! msg {
    ($($arg:tt)*) => {
        $crate::message(::std::format!($($arg)*))
    };
}

/// Stops the test immediately when the assertion fails. This is the
/// default behavior; it exists to reverse [`continue_on_failure`] applied
/// by an earlier option or bundle.
pub fn fatal() -> Opt {
    Opt {
        action: Action::Mode(FailureMode::Fatal),
    }
}

/// Lets the test keep executing when the assertion fails, so several
/// independent checks can all be observed in a single run.
pub fn continue_on_failure() -> Opt {
    Opt {
        action: Action::Mode(FailureMode::Continue),
    }
}

/// Appends customizations to the assertion's comparison policy. Multiple
/// applications accumulate; nothing is ever replaced. See
/// [`verity_compare::Customization`] for what a customization can do.
pub fn policy(customizations: impl IntoIterator<Item = Customization>) -> Opt {
    Opt {
        action: Action::Extend(customizations.into_iter().collect()),
    }
}

/// Grants the comparator access to the private fields of the sample
/// value's type.
///
/// Quick to reach for, but usually a bad idea: internals of a type you do
/// not control may change under you. If you control the type, inspect it
/// as an opaque value instead; if you don't, [`comparer`] is safer.
///
/// # Panics
///
/// When the sample's shape is not a record (for example an option, a
/// sequence, or a map). That is a malformed test, not a test failure.
pub fn allow_private<T>(sample: &T) -> Opt
where
    T: Inspect + ?Sized,
{
    match sample.inspect() {
        Value::Record(record) => Opt {
            action: Action::Extend(vec![Customization::AllowPrivate {
                id: record.id,
                type_name: record.type_name,
            }]),
        },
        other => panic!(
            "allow_private requires a record sample, got {}",
            other.kind()
        ),
    }
}

/// Compares every value of type `T` with `equal` instead of walking its
/// structure. Especially useful for third-party types with private fields.
///
/// `equal` must be symmetric, deterministic, and must not mutate its
/// operands; violations cannot be detected and produce nonsensical
/// results.
pub fn comparer<T, F>(equal: F) -> Opt
where
    T: Any,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    Opt {
        action: Action::Extend(vec![Customization::comparer(equal)]),
    }
}
