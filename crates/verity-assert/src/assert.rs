//! The typed assertion functions.
//!
//! Each function takes a [`Reporter`], the operands, and a slice of
//! [`Opt`] values, and returns whether the assertion passed so call sites
//! can branch on the outcome under [`continue_on_failure`].
//!
//! [`continue_on_failure`]: crate::continue_on_failure

use std::any::type_name;
use std::error::Error;
use std::fmt;
use std::ops::{Add, Sub};
use std::panic::{catch_unwind, AssertUnwindSafe};

use verity_compare::{render, short_type_name, Inspect};

use crate::opt::Opt;
use crate::report::Reporter;
use crate::session::Session;

/// Asserts that two values are structurally equal.
#[track_caller]
pub fn equal<R, T>(t: &R, got: &T, want: &T, opts: &[Opt]) -> bool
where
    R: Reporter,
    T: Inspect + ?Sized,
{
    let mut session = Session::new(t, opts);
    let Some(diff) = session.diff(got, want) else {
        return session.conclude();
    };
    if diff.is_empty() {
        return true;
    }
    session.line("got != want");
    session.line("diff (+got, -want):");
    session.line(diff);
    session.conclude()
}

/// Asserts that two values are not structurally equal.
#[track_caller]
pub fn not_equal<R, T>(t: &R, got: &T, want: &T, opts: &[Opt]) -> bool
where
    R: Reporter,
    T: Inspect + ?Sized,
{
    let mut session = Session::new(t, opts);
    let Some(equal) = session.equal(got, want) else {
        return session.conclude();
    };
    if !equal {
        return true;
    }
    session.line("got == want");
    session.line(format!("got: {}", render(got)));
    session.conclude()
}

/// Asserts that a result is `Ok`.
#[track_caller]
pub fn ok<R, T, E>(t: &R, result: &Result<T, E>, opts: &[Opt]) -> bool
where
    R: Reporter,
    E: fmt::Display,
{
    let Err(error) = result else {
        return true;
    };
    let mut session = Session::new(t, opts);
    session.line("unexpected error");
    session.line(format!("error: {error}"));
    session.line(format!("type: {}", short_type_name(type_name::<E>())));
    session.conclude()
}

/// Asserts that a result is `Err`.
#[track_caller]
pub fn err<R, T, E>(t: &R, result: &Result<T, E>, opts: &[Opt]) -> bool
where
    R: Reporter,
{
    if result.is_err() {
        return true;
    }
    let mut session = Session::new(t, opts);
    session.line("unexpected success");
    session.conclude()
}

/// Asserts that `want` appears in `got`'s source chain, comparing each
/// link with `PartialEq` after downcasting.
#[track_caller]
pub fn error_is<R, E>(t: &R, got: &(dyn Error + 'static), want: &E, opts: &[Opt]) -> bool
where
    R: Reporter,
    E: Error + PartialEq + 'static,
{
    let mut link: Option<&(dyn Error + 'static)> = Some(got);
    while let Some(error) = link {
        if error.downcast_ref::<E>().is_some_and(|error| error == want) {
            return true;
        }
        link = error.source();
    }
    let mut session = Session::new(t, opts);
    session.line("got error does not contain want");
    session.line(format!("got: {got}"));
    session.line(format!("want: {want}"));
    session.conclude()
}

/// Asserts that a value equals its type's default.
#[track_caller]
pub fn zero<R, T>(t: &R, got: &T, opts: &[Opt]) -> bool
where
    R: Reporter,
    T: Inspect + Default,
{
    let mut session = Session::new(t, opts);
    let Some(diff) = session.diff(got, &T::default()) else {
        return session.conclude();
    };
    if diff.is_empty() {
        return true;
    }
    session.line(format!("got non-zero {}", short_type_name(type_name::<T>())));
    session.line("diff (+got, -zero):");
    session.line(diff);
    session.conclude()
}

/// Asserts that a value differs from its type's default.
#[track_caller]
pub fn not_zero<R, T>(t: &R, got: &T, opts: &[Opt]) -> bool
where
    R: Reporter,
    T: Inspect + Default,
{
    let mut session = Session::new(t, opts);
    let Some(equal) = session.equal(got, &T::default()) else {
        return session.conclude();
    };
    if !equal {
        return true;
    }
    session.line(format!("got zero {}", short_type_name(type_name::<T>())));
    session.conclude()
}

/// Asserts that a condition holds.
#[track_caller]
pub fn is_true<R>(t: &R, got: bool, opts: &[Opt]) -> bool
where
    R: Reporter,
{
    if got {
        return true;
    }
    let mut session = Session::new(t, opts);
    session.line("got false, want true");
    session.conclude()
}

/// Asserts that a condition does not hold.
#[track_caller]
pub fn is_false<R>(t: &R, got: bool, opts: &[Opt]) -> bool
where
    R: Reporter,
{
    if !got {
        return true;
    }
    let mut session = Session::new(t, opts);
    session.line("got true, want false");
    session.conclude()
}

/// Asserts that a closure panics.
#[track_caller]
pub fn panics<R>(t: &R, f: impl FnOnce(), opts: &[Opt]) -> bool
where
    R: Reporter,
{
    let outcome = catch_unwind(AssertUnwindSafe(f));
    let mut session = Session::new(t, opts);
    if outcome.is_ok() {
        session.line("no panic");
    }
    session.conclude()
}

/// Asserts that `got` lies strictly within `delta` of `want`. For example,
///
/// ```
/// use verity_assert::{within, Harness};
///
/// let t = Harness::new();
/// let pi = 22.0 / 7.0;
/// within(&t, pi, 3.14, 0.01, &[]);
/// ```
///
/// asserts that the estimate of pi is between 3.13 and 3.15, exclusive.
/// A negative delta is normalized by swapping the bounds.
#[track_caller]
pub fn within<R, T>(t: &R, got: T, want: T, delta: T, opts: &[Opt]) -> bool
where
    R: Reporter,
    T: Copy + PartialOrd + Add<Output = T> + Sub<Output = T> + fmt::Debug,
{
    let mut lower = want - delta;
    let mut upper = want + delta;
    if lower > upper {
        std::mem::swap(&mut lower, &mut upper);
    }
    if got > lower && got < upper {
        return true;
    }
    let mut session = Session::new(t, opts);
    session.line(format!("{got:?} not within {delta:?} of {want:?}"));
    session.conclude()
}

/// Asserts that a slice contains an element equal to `want` under the
/// assertion's comparison policy.
#[track_caller]
pub fn contains<R, T>(t: &R, got: &[T], want: &T, opts: &[Opt]) -> bool
where
    R: Reporter,
    T: Inspect,
{
    let mut session = Session::new(t, opts);
    for element in got {
        match session.equal(element, want) {
            Some(true) => return true,
            Some(false) => {}
            None => return session.conclude(),
        }
    }
    session.line("got does not contain want");
    session.line(format!("got: {}", render(got)));
    session.line(format!("want: {}", render(want)));
    session.conclude()
}

/// Asserts that `got` contains `want` as a contiguous byte subsequence.
///
/// ```
/// use verity_assert::{subsequence, Harness};
///
/// let t = Harness::new();
/// subsequence(&t, "hello world", "hello", &[]);
/// subsequence(&t, b"deadbeef".as_slice(), b"ee".as_slice(), &[]);
/// ```
#[track_caller]
pub fn subsequence<R>(t: &R, got: impl AsRef<[u8]>, want: impl AsRef<[u8]>, opts: &[Opt]) -> bool
where
    R: Reporter,
{
    let (got, want) = (got.as_ref(), want.as_ref());
    if want.is_empty() || got.windows(want.len()).any(|window| window == want) {
        return true;
    }
    let mut session = Session::new(t, opts);
    session.line("got does not contain want");
    session.line(format!("got: {}", String::from_utf8_lossy(got)));
    session.line(format!("want: {}", String::from_utf8_lossy(want)));
    session.conclude()
}
