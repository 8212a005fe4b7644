//! Error types for structural comparison.

use thiserror::Error;

/// Unrecoverable comparison failure.
///
/// The comparator refuses to guess at equality when the policy does not
/// grant it enough access to a value's structure. Consumers should treat
/// the rendered message as unstructured text; the
/// `cannot handle private field at ` prefix is a best-effort hint for
/// extracting the offending path, not a stable API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    /// A private field was reached without an allowance or a comparer for
    /// the owning type.
    #[error("cannot handle private field at {path}: grant an allowance for the owning type or register a comparer")]
    PrivateField {
        /// Dotted path to the field, rooted at the owning type's name.
        path: String,
    },

    /// The two inspections disagreed about the shape of the same type,
    /// which means an `Inspect` implementation is not deterministic.
    #[error("mismatched shapes at {path}: {detail}")]
    ShapeMismatch {
        /// Path to the disagreement, or `(root)`.
        path: String,
        /// What each side rendered as.
        detail: String,
    },
}
