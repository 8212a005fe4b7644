//! Value trees and the [`Inspect`] trait that produces them.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Renders a value as a [`Value`] tree for structural comparison.
///
/// Implementations are provided for primitives, strings, options, tuples,
/// sequences, maps, and `serde_json::Value`. Implement it by hand for your
/// own types: record types list their named fields through [`Record`],
/// flagging each as public or private, while types that already carry a
/// meaningful `PartialEq` can render themselves as opaque leaves with
/// [`Value::opaque`] so their own equality applies.
pub trait Inspect {
    /// Renders `self` as one whole tree.
    ///
    /// Must be deterministic: inspecting the same value twice yields the
    /// same shape, or comparison reports a shape mismatch.
    fn inspect(&self) -> Value<'_>;
}

/// One node of an inspected value.
#[derive(Debug)]
pub enum Value<'a> {
    /// The unit value.
    Unit,
    Bool(bool),
    /// Any signed integer, widened.
    Int(i128),
    /// Any unsigned integer, widened.
    Uint(u128),
    /// Any float, widened.
    Float(f64),
    Char(char),
    Str(Cow<'a, str>),
    /// Raw bytes, rendered compactly in diffs. No standard implementation
    /// produces this variant; it exists for hand-written `Inspect` impls.
    Bytes(Cow<'a, [u8]>),
    /// An optional value; `None` here models the absent case.
    Optional(Option<Box<Value<'a>>>),
    /// An ordered sequence, compared index by index.
    Seq(Vec<Value<'a>>),
    /// Key/value entries, compared by key. Entry order does not matter;
    /// the comparator canonicalizes by rendered key.
    Map(Vec<(Value<'a>, Value<'a>)>),
    /// A named record with fields; see [`Record`].
    Record(Record<'a>),
    /// A leaf compared by its own equality; see [`Opaque`].
    Opaque(Opaque<'a>),
}

impl<'a> Value<'a> {
    /// Renders `value` as an opaque leaf that compares via its own
    /// `PartialEq` and displays via `Debug`.
    pub fn opaque<T>(value: &'a T) -> Value<'a>
    where
        T: Any + PartialEq + fmt::Debug,
    {
        Value::Opaque(Opaque::of(value))
    }

    /// Short noun for the node's shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::Uint(_) => "integer",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Optional(_) => "option",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Opaque(_) => "opaque value",
        }
    }
}

/// A named record: type identity plus ordered, visibility-flagged fields.
///
/// The comparator refuses to descend into a private field unless the policy
/// grants an allowance for the record's type or registers a comparer that
/// bypasses the field walk entirely.
pub struct Record<'a> {
    /// The record's type name with module paths trimmed.
    pub type_name: &'static str,
    /// Type identity, the key for policy customizations.
    pub id: TypeId,
    /// The original value, for comparer dispatch.
    pub handle: &'a dyn Any,
    /// Fields in declaration order.
    pub fields: Vec<Field<'a>>,
}

impl<'a> Record<'a> {
    /// Starts a record for `value`; add fields with [`Record::field`] and
    /// [`Record::private_field`].
    pub fn of<T: Any>(value: &'a T) -> Self {
        Record {
            type_name: short_type_name(std::any::type_name::<T>()),
            id: TypeId::of::<T>(),
            handle: value,
            fields: Vec::new(),
        }
    }

    /// Appends a public field.
    pub fn field(mut self, name: &'static str, value: Value<'a>) -> Self {
        self.fields.push(Field {
            name,
            public: true,
            value,
        });
        self
    }

    /// Appends a private field. Comparing it requires an allowance.
    pub fn private_field(mut self, name: &'static str, value: Value<'a>) -> Self {
        self.fields.push(Field {
            name,
            public: false,
            value,
        });
        self
    }
}

impl<'a> From<Record<'a>> for Value<'a> {
    fn from(record: Record<'a>) -> Self {
        Value::Record(record)
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// One record field.
#[derive(Debug)]
pub struct Field<'a> {
    pub name: &'static str,
    /// Whether the comparator may descend without an allowance.
    pub public: bool,
    pub value: Value<'a>,
}

/// A leaf that compares with its type's own `PartialEq`.
///
/// This is how a type that owns a meaningful equality opts out of
/// structural walking altogether.
pub struct Opaque<'a> {
    /// The type name with module paths trimmed.
    pub type_name: &'static str,
    /// Type identity, the key for policy customizations.
    pub id: TypeId,
    /// The original value, for equality dispatch.
    pub handle: &'a dyn Any,
    /// Rendered form shown in diffs.
    pub rendered: String,
    /// Monomorphized `PartialEq` thunk over type-erased operands.
    pub eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl<'a> Opaque<'a> {
    /// Wraps `value` as an opaque leaf.
    pub fn of<T>(value: &'a T) -> Self
    where
        T: Any + PartialEq + fmt::Debug,
    {
        Opaque {
            type_name: short_type_name(std::any::type_name::<T>()),
            id: TypeId::of::<T>(),
            handle: value,
            rendered: format!("{value:?}"),
            eq: eq_downcast::<T>,
        }
    }
}

impl<'a> From<Opaque<'a>> for Value<'a> {
    fn from(opaque: Opaque<'a>) -> Self {
        Value::Opaque(opaque)
    }
}

impl fmt::Debug for Opaque<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type_name", &self.type_name)
            .field("rendered", &self.rendered)
            .finish_non_exhaustive()
    }
}

fn eq_downcast<T: Any + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Trims module paths from a type name, leaving generic arguments intact.
pub fn short_type_name(full: &'static str) -> &'static str {
    let head = full.find('<').unwrap_or(full.len());
    match full[..head].rfind("::") {
        Some(cut) => &full[cut + 2..],
        None => full,
    }
}

// ---------------------------------------------------------------------------
// Standard implementations
// ---------------------------------------------------------------------------

macro_rules! inspect_signed {
    ($($ty:ty),*) => {
        $(impl Inspect for $ty {
            fn inspect(&self) -> Value<'_> {
                Value::Int(i128::from(*self))
            }
        })*
    };
}

macro_rules! inspect_unsigned {
    ($($ty:ty),*) => {
        $(impl Inspect for $ty {
            fn inspect(&self) -> Value<'_> {
                Value::Uint(u128::from(*self))
            }
        })*
    };
}

inspect_signed!(i8, i16, i32, i64, i128);
inspect_unsigned!(u8, u16, u32, u64, u128);

impl Inspect for isize {
    fn inspect(&self) -> Value<'_> {
        Value::Int(*self as i128)
    }
}

impl Inspect for usize {
    fn inspect(&self) -> Value<'_> {
        Value::Uint(*self as u128)
    }
}

impl Inspect for f32 {
    fn inspect(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl Inspect for f64 {
    fn inspect(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl Inspect for bool {
    fn inspect(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl Inspect for char {
    fn inspect(&self) -> Value<'_> {
        Value::Char(*self)
    }
}

impl Inspect for () {
    fn inspect(&self) -> Value<'_> {
        Value::Unit
    }
}

impl Inspect for str {
    fn inspect(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self))
    }
}

impl Inspect for String {
    fn inspect(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self.as_str()))
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn inspect(&self) -> Value<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn inspect(&self) -> Value<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self) -> Value<'_> {
        Value::Optional(self.as_ref().map(|value| Box::new(value.inspect())))
    }
}

impl<T: Inspect> Inspect for [T] {
    fn inspect(&self) -> Value<'_> {
        Value::Seq(self.iter().map(Inspect::inspect).collect())
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self) -> Value<'_> {
        self.as_slice().inspect()
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn inspect(&self) -> Value<'_> {
        self.as_slice().inspect()
    }
}

impl<A: Inspect, B: Inspect> Inspect for (A, B) {
    fn inspect(&self) -> Value<'_> {
        Value::Seq(vec![self.0.inspect(), self.1.inspect()])
    }
}

impl<A: Inspect, B: Inspect, C: Inspect> Inspect for (A, B, C) {
    fn inspect(&self) -> Value<'_> {
        Value::Seq(vec![self.0.inspect(), self.1.inspect(), self.2.inspect()])
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn inspect(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.inspect(), value.inspect()))
                .collect(),
        )
    }
}

impl<K: Inspect, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn inspect(&self) -> Value<'_> {
        // Entry order is arbitrary here; the comparator canonicalizes by
        // rendered key.
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.inspect(), value.inspect()))
                .collect(),
        )
    }
}

impl Inspect for serde_json::Value {
    fn inspect(&self) -> Value<'_> {
        match self {
            serde_json::Value::Null => Value::Optional(None),
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u128::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(Cow::Borrowed(s.as_str())),
            serde_json::Value::Array(items) => {
                Value::Seq(items.iter().map(Inspect::inspect).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(key, value)| (Value::Str(Cow::Borrowed(key.as_str())), value.inspect()))
                    .collect(),
            ),
        }
    }
}
