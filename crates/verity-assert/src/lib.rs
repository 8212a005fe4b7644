//! Small, type-safe assertion helpers with structural diffs.
//!
//! Assertions compare values through [`verity_compare`]'s structural
//! equality, accept composable [`Opt`] values that adjust a single call
//! (explanatory messages, fatal vs. continue-on-failure delivery, policy
//! customizations), and report through the [`Reporter`] boundary, by
//! default the panic-based [`Harness`].
//!
//! # Example
//!
//! ```
//! use verity_assert::{contains, equal, is_true, msg, Harness};
//!
//! let t = Harness::new();
//! equal(&t, &(2 + 2), &4, &[]);
//! is_true(&t, "verity".starts_with("ver"), &[]);
//! contains(&t, &[1, 2, 3], &2, &[msg!("looking for {}", 2)]);
//! ```
//!
//! When a comparison reaches a private field the comparator refuses to
//! introspect, the failure stays local to the assertion: the diagnostic
//! names the field and the ways to grant access ([`allow_private`],
//! [`comparer`], or inspecting the type as an opaque value), and the
//! Fatal/Continue policy applies as for any other failure.
//!
//! # Modules
//!
//! - [`assert`]: the typed assertion functions
//! - [`opt`]: composable per-assertion options
//! - [`report`]: the [`Reporter`] boundary and the default [`Harness`]

pub mod assert;
pub mod opt;
pub mod report;

mod session;

pub use assert::{
    contains, equal, err, error_is, is_false, is_true, not_equal, not_zero, ok, panics,
    subsequence, within, zero,
};
pub use opt::{
    allow_private, comparer, continue_on_failure, fatal, message, options, policy, Opt,
};
pub use report::{Harness, Reporter};

// The comparator surface assertions are built on, re-exported so test code
// can implement Inspect without naming a second crate.
pub use verity_compare::{
    deep_diff, deep_equal, render, CompareError, Customization, Field, Inspect, Opaque, Policy,
    Record, Value,
};
