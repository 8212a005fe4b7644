//! The structural walk behind [`deep_equal`] and [`deep_diff`].

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CompareError;
use crate::policy::Policy;
use crate::value::{Inspect, Record, Value};

/// Compares two values under `policy`.
///
/// `Err` means the comparator refused to introspect part of the values;
/// the error's rendered message explains where and why.
pub fn deep_equal<T>(got: &T, want: &T, policy: &Policy) -> Result<bool, CompareError>
where
    T: Inspect + ?Sized,
{
    let mut walker = Walker::new(policy);
    walker.walk("", &got.inspect(), &want.inspect())?;
    Ok(walker.entries.is_empty())
}

/// Diffs two values under `policy`. An empty string means they are equal.
///
/// Differences render as path-labeled `+ got` / `- want` blocks; sequence
/// length and map key mismatches render one-sided.
pub fn deep_diff<T>(got: &T, want: &T, policy: &Policy) -> Result<String, CompareError>
where
    T: Inspect + ?Sized,
{
    let mut walker = Walker::new(policy);
    walker.walk("", &got.inspect(), &want.inspect())?;
    Ok(render_entries(&walker.entries))
}

/// Renders a value the way diffs render it.
pub fn render<T>(value: &T) -> String
where
    T: Inspect + ?Sized,
{
    value_text(&value.inspect())
}

/// One difference. A missing side means the path exists only on the other.
struct DiffEntry {
    path: String,
    got: Option<String>,
    want: Option<String>,
}

struct Walker<'p> {
    policy: &'p Policy,
    entries: Vec<DiffEntry>,
}

impl<'p> Walker<'p> {
    fn new(policy: &'p Policy) -> Self {
        Walker {
            policy,
            entries: Vec::new(),
        }
    }

    fn walk(&mut self, path: &str, got: &Value<'_>, want: &Value<'_>) -> Result<(), CompareError> {
        match (got, want) {
            (Value::Record(a), Value::Record(b)) if a.id == b.id => self.walk_record(path, a, b),
            (Value::Opaque(a), Value::Opaque(b)) if a.id == b.id => {
                let equal = match self.policy.comparer_for(a.id) {
                    Some(equal) => equal(a.handle, b.handle),
                    None => (a.eq)(a.handle, b.handle),
                };
                self.leaf(path, equal, got, want);
                Ok(())
            }
            (Value::Unit, Value::Unit) => Ok(()),
            (Value::Bool(a), Value::Bool(b)) => {
                self.leaf(path, a == b, got, want);
                Ok(())
            }
            (Value::Char(a), Value::Char(b)) => {
                self.leaf(path, a == b, got, want);
                Ok(())
            }
            (Value::Str(a), Value::Str(b)) => {
                self.leaf(path, a == b, got, want);
                Ok(())
            }
            (Value::Bytes(a), Value::Bytes(b)) => {
                self.leaf(path, a == b, got, want);
                Ok(())
            }
            (a, b) if is_numeric(a) && is_numeric(b) => {
                self.leaf(path, numeric_equal(a, b), got, want);
                Ok(())
            }
            (Value::Optional(a), Value::Optional(b)) => match (a, b) {
                (None, None) => Ok(()),
                (Some(a), Some(b)) => self.walk(path, a, b),
                _ => {
                    self.leaf(path, false, got, want);
                    Ok(())
                }
            },
            (Value::Seq(a), Value::Seq(b)) => {
                for i in 0..a.len().max(b.len()) {
                    let child = format!("{path}[{i}]");
                    match (a.get(i), b.get(i)) {
                        (Some(x), Some(y)) => self.walk(&child, x, y)?,
                        (Some(x), None) => self.push(&child, Some(value_text(x)), None),
                        (None, Some(y)) => self.push(&child, None, Some(value_text(y))),
                        (None, None) => {}
                    }
                }
                Ok(())
            }
            (Value::Map(a), Value::Map(b)) => {
                let left: BTreeMap<String, &Value<'_>> =
                    a.iter().map(|(key, value)| (value_text(key), value)).collect();
                let right: BTreeMap<String, &Value<'_>> =
                    b.iter().map(|(key, value)| (value_text(key), value)).collect();
                let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
                for key in keys {
                    let child = format!("{path}[{key}]");
                    match (left.get(key), right.get(key)) {
                        (Some(x), Some(y)) => self.walk(&child, x, y)?,
                        (Some(x), None) => self.push(&child, Some(value_text(x)), None),
                        (None, Some(y)) => self.push(&child, None, Some(value_text(y))),
                        (None, None) => {}
                    }
                }
                Ok(())
            }
            (got, want) => Err(CompareError::ShapeMismatch {
                path: display_path(path),
                detail: format!("{} vs {}", describe(got), describe(want)),
            }),
        }
    }

    fn walk_record(
        &mut self,
        path: &str,
        a: &Record<'_>,
        b: &Record<'_>,
    ) -> Result<(), CompareError> {
        let verdict = self
            .policy
            .comparer_for(a.id)
            .map(|equal| equal(a.handle, b.handle));
        if let Some(equal) = verdict {
            if !equal {
                self.push(path, Some(record_text(a)), Some(record_text(b)));
            }
            return Ok(());
        }
        let same_shape = a.fields.len() == b.fields.len()
            && a.fields.iter().zip(&b.fields).all(|(x, y)| x.name == y.name);
        if !same_shape {
            // Same nominal type inspected as different variants.
            self.push(path, Some(record_text(a)), Some(record_text(b)));
            return Ok(());
        }
        for (fa, fb) in a.fields.iter().zip(&b.fields) {
            let child = join_field(path, fa.name);
            if !fa.public && !self.policy.allows_private(a.id) {
                let at = if path.is_empty() {
                    format!("{}.{}", a.type_name, fa.name)
                } else {
                    child
                };
                return Err(CompareError::PrivateField { path: at });
            }
            self.walk(&child, &fa.value, &fb.value)?;
        }
        Ok(())
    }

    fn leaf(&mut self, path: &str, equal: bool, got: &Value<'_>, want: &Value<'_>) {
        if !equal {
            self.push(path, Some(value_text(got)), Some(value_text(want)));
        }
    }

    fn push(&mut self, path: &str, got: Option<String>, want: Option<String>) {
        self.entries.push(DiffEntry {
            path: path.to_string(),
            got,
            want,
        });
    }
}

fn is_numeric(value: &Value<'_>) -> bool {
    matches!(value, Value::Int(_) | Value::Uint(_) | Value::Float(_))
}

/// Numeric equality across representations, so integer-valued and
/// float-valued renditions of the same number (JSON is the usual source)
/// still compare.
fn numeric_equal(a: &Value<'_>, b: &Value<'_>) -> bool {
    use Value::{Float, Int, Uint};
    match (a, b) {
        (Int(x), Int(y)) => x == y,
        (Uint(x), Uint(y)) => x == y,
        (Int(x), Uint(y)) | (Uint(y), Int(x)) => *x >= 0 && *x as u128 == *y,
        (Float(x), Float(y)) => x == y,
        (Float(x), Int(y)) | (Int(y), Float(x)) => *x == *y as f64,
        (Float(x), Uint(y)) | (Uint(y), Float(x)) => *x == *y as f64,
        _ => false,
    }
}

fn join_field(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}

fn value_text(value: &Value<'_>) -> String {
    match value {
        Value::Unit => "()".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Uint(u) => u.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Char(c) => format!("{c:?}"),
        Value::Str(s) => format!("{s:?}"),
        Value::Bytes(b) => format!("{:?}", &b[..]),
        Value::Optional(None) => "None".to_string(),
        Value::Optional(Some(inner)) => format!("Some({})", value_text(inner)),
        Value::Seq(items) => {
            let items: Vec<String> = items.iter().map(value_text).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(entries) => {
            let mut entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", value_text(key), value_text(value)))
                .collect();
            entries.sort();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Record(record) => record_text(record),
        Value::Opaque(opaque) => opaque.rendered.clone(),
    }
}

fn record_text(record: &Record<'_>) -> String {
    if record.fields.is_empty() {
        return record.type_name.to_string();
    }
    let fields: Vec<String> = record
        .fields
        .iter()
        .map(|field| format!("{}: {}", field.name, value_text(&field.value)))
        .collect();
    format!("{} {{ {} }}", record.type_name, fields.join(", "))
}

fn describe(value: &Value<'_>) -> String {
    match value {
        Value::Record(record) => format!("record {}", record.type_name),
        Value::Opaque(opaque) => format!("opaque {}", opaque.type_name),
        other => other.kind().to_string(),
    }
}

fn render_entries(entries: &[DiffEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        if !out.is_empty() {
            out.push('\n');
        }
        if entry.path.is_empty() {
            let mut first = true;
            if let Some(got) = &entry.got {
                out.push_str("+ ");
                out.push_str(got);
                first = false;
            }
            if let Some(want) = &entry.want {
                if !first {
                    out.push('\n');
                }
                out.push_str("- ");
                out.push_str(want);
            }
        } else {
            out.push_str(&entry.path);
            out.push(':');
            if let Some(got) = &entry.got {
                out.push_str("\n  + ");
                out.push_str(got);
            }
            if let Some(want) = &entry.want {
                out.push_str("\n  - ");
                out.push_str(want);
            }
        }
    }
    out
}
