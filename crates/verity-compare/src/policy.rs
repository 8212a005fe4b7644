//! Comparison policies: ordered, type-keyed customizations.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::value::short_type_name;

/// Type-erased equality function over two operands of one type.
pub type EqualFn = Arc<dyn Fn(&dyn Any, &dyn Any) -> bool + Send + Sync>;

/// A single customization handed to the comparator.
#[derive(Clone)]
pub enum Customization {
    /// Compares every value of one type with the supplied function instead
    /// of walking its structure.
    Comparer {
        id: TypeId,
        type_name: &'static str,
        equal: EqualFn,
    },
    /// Allows the comparator to descend into the private fields of one
    /// record type.
    AllowPrivate {
        id: TypeId,
        type_name: &'static str,
    },
}

impl Customization {
    /// Registers `equal` as the equality for `T`.
    ///
    /// The function must be total, symmetric, deterministic, and must not
    /// mutate its operands. Violations cannot be detected here; they
    /// produce nonsensical comparison results.
    pub fn comparer<T, F>(equal: F) -> Self
    where
        T: Any,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Customization::Comparer {
            id: TypeId::of::<T>(),
            type_name: short_type_name(std::any::type_name::<T>()),
            equal: Arc::new(move |a: &dyn Any, b: &dyn Any| {
                match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
                    (Some(a), Some(b)) => equal(a, b),
                    _ => false,
                }
            }),
        }
    }

    /// Grants private-field access for `T`.
    pub fn allow_private<T: Any>() -> Self {
        Customization::AllowPrivate {
            id: TypeId::of::<T>(),
            type_name: short_type_name(std::any::type_name::<T>()),
        }
    }

    /// The type the customization is keyed on.
    pub fn type_name(&self) -> &'static str {
        match self {
            Customization::Comparer { type_name, .. } => type_name,
            Customization::AllowPrivate { type_name, .. } => type_name,
        }
    }
}

impl fmt::Debug for Customization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Customization::Comparer { type_name, .. } => write!(f, "Comparer({type_name})"),
            Customization::AllowPrivate { type_name, .. } => {
                write!(f, "AllowPrivate({type_name})")
            }
        }
    }
}

/// The accumulated customization set for one comparison.
///
/// Entries are ordered; for the same type, the last registered comparer
/// wins.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    entries: Vec<Customization>,
}

impl Policy {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one customization.
    pub fn push(&mut self, customization: Customization) {
        self.entries.push(customization);
    }

    /// Appends customizations in order. Never replaces earlier entries.
    pub fn extend(&mut self, customizations: impl IntoIterator<Item = Customization>) {
        self.entries.extend(customizations);
    }

    /// The comparer registered for `id`, preferring the latest entry.
    pub fn comparer_for(&self, id: TypeId) -> Option<&EqualFn> {
        self.entries.iter().rev().find_map(|entry| match entry {
            Customization::Comparer {
                id: key, equal, ..
            } if *key == id => Some(equal),
            _ => None,
        })
    }

    /// Whether private fields of the type identified by `id` may be
    /// compared.
    pub fn allows_private(&self, id: TypeId) -> bool {
        self.entries.iter().any(
            |entry| matches!(entry, Customization::AllowPrivate { id: key, .. } if *key == id),
        )
    }

    /// Number of registered customizations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no customizations are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_policy() {
        let policy = Policy::new();
        assert!(policy.is_empty());
        assert!(policy.comparer_for(TypeId::of::<u32>()).is_none());
        assert!(!policy.allows_private(TypeId::of::<u32>()));
    }

    #[test]
    fn test_last_comparer_wins() {
        let mut policy = Policy::new();
        policy.push(Customization::comparer(|_: &u32, _: &u32| false));
        policy.push(Customization::comparer(|_: &u32, _: &u32| true));

        let equal = policy
            .comparer_for(TypeId::of::<u32>())
            .expect("comparer registered");
        assert!(equal(&1u32, &2u32));
    }

    #[test]
    fn test_comparer_rejects_foreign_types() {
        let mut policy = Policy::new();
        policy.push(Customization::comparer(|a: &u32, b: &u32| a == b));

        let equal = policy
            .comparer_for(TypeId::of::<u32>())
            .expect("comparer registered");
        assert!(!equal(&1u32, &"1"));
    }

    #[test]
    fn test_allowance_lookup() {
        let mut policy = Policy::new();
        policy.push(Customization::allow_private::<String>());
        assert!(policy.allows_private(TypeId::of::<String>()));
        assert!(!policy.allows_private(TypeId::of::<u32>()));
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_debug_names_the_type() {
        let customization = Customization::allow_private::<String>();
        assert_eq!(format!("{customization:?}"), "AllowPrivate(String)");
        assert_eq!(customization.type_name(), "String");
    }
}
