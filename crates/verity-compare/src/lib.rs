//! Structural deep equality and diffing for test assertions.
//!
//! Values enter through the [`Inspect`] trait, which renders them as
//! [`Value`] trees. [`deep_equal`] and [`deep_diff`] walk two trees under a
//! [`Policy`] of type-keyed [`Customization`]s: comparers replace the walk
//! for one type, allowances let the walk descend into a record's private
//! fields. Without either, reaching a private field is an unrecoverable
//! [`CompareError`] rather than a guess.
//!
//! # Example
//!
//! ```
//! use verity_compare::{deep_diff, deep_equal, Policy};
//!
//! let policy = Policy::new();
//! assert!(deep_equal(&vec![1, 2, 3], &vec![1, 2, 3], &policy).unwrap());
//!
//! let diff = deep_diff(&vec![1, 2, 3], &vec![1, 2, 4], &policy).unwrap();
//! assert_eq!(diff, "[2]:\n  + 3\n  - 4");
//! ```
//!
//! # Modules
//!
//! - [`value`]: the [`Value`] tree, the [`Inspect`] trait, and standard
//!   implementations
//! - [`policy`]: [`Policy`] and [`Customization`]
//! - [`diff`]: the comparison walk and diff rendering
//! - [`error`]: the unrecoverable [`CompareError`] signal

pub mod diff;
pub mod error;
pub mod policy;
pub mod value;

pub use diff::{deep_diff, deep_equal, render};
pub use error::CompareError;
pub use policy::{Customization, EqualFn, Policy};
pub use value::{short_type_name, Field, Inspect, Opaque, Record, Value};
