//! Values of data-provider rows and their literal rendering.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::syntax::{ArrayItem, Expr, Literal, Stmt, StmtKind};

/// An array key. Numeric string keys are normalized to integers.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

/// A provider value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    Str(String),
    /// Ordered array entries.
    Array(Vec<(Key, Value)>),
    /// A value without a literal form, named by its type.
    Opaque(String),
}

impl Value {
    /// A list array with keys `0..n`.
    pub fn list(values: impl IntoIterator<Item = Self>) -> Self {
        Self::Array(
            values
                .into_iter()
                .zip(0..)
                .map(|(value, index)| (Key::Int(index), value))
                .collect(),
        )
    }

    /// Returns `true` when the value and everything nested in it has a
    /// literal form.
    pub fn is_printable(&self) -> bool {
        match self {
            Self::Opaque(_) => false,
            Self::Array(entries) => entries.iter().all(|(_, value)| value.is_printable()),
            _ => true,
        }
    }

    /// Entries of a list array in order; `None` for anything else.
    pub fn as_list(&self) -> Option<Vec<&Self>> {
        let Self::Array(entries) = self else {
            return None;
        };
        entries
            .iter()
            .zip(0..)
            .map(|((key, value), index)| (*key == Key::Int(index)).then_some(value))
            .collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write_quoted(f, value),
        }
    }
}

/// Renders the value as a PHP literal; opaque values become `{TypeName}`.
///
/// ```
/// use curryforge::example::Value;
///
/// let row = Value::list([Value::Int(1), Value::Float(2.0), Value::Str("it's".into())]);
/// assert_eq!(row.to_string(), r"[1, 2.0, 'it\'s']");
/// assert_eq!(Value::Opaque("Closure".into()).to_string(), "{Closure}");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write_float(f, *value),
            Self::Str(value) => write_quoted(f, value),
            Self::Array(entries) => {
                f.write_str("[")?;
                let is_list = self.as_list().is_some();
                for (position, (key, value)) in entries.iter().enumerate() {
                    if position > 0 {
                        f.write_str(", ")?;
                    }
                    if !is_list {
                        write!(f, "{key} => ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::Opaque(name) => write!(f, "{{{name}}}"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for character in value.chars() {
        if matches!(character, '\\' | '\'') {
            f.write_str("\\")?;
        }
        write!(f, "{character}")?;
    }
    f.write_str("'")
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        f.write_str("NAN")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "INF" } else { "-INF" })
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{value:.1}")
    } else {
        write!(f, "{value}")
    }
}

/// Evaluates provider method bodies into values.
///
/// Only literal data is understood: scalars, arrays (with keys and
/// spreads) and variables bound by earlier simple assignments. Closures
/// evaluate to `{Closure}`, `new Foo(...)` to `{Foo}`, anything else to
/// `{mixed}`.
#[derive(Debug, Default)]
pub struct Evaluator {
    variables: FxHashMap<String, Value>,
}

impl Evaluator {
    /// Creates an evaluator without bound variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the statements, binding assignments, and evaluates the last
    /// `return <expr>;`. `None` when no statement returns a value.
    pub fn run(&mut self, statements: &[Stmt]) -> Option<Value> {
        let mut returned = None;
        for statement in statements {
            match &statement.kind {
                StmtKind::Expr(Expr::Assign { target, value }) => {
                    let value = self.eval(value);
                    self.variables.insert(target.clone(), value);
                }
                StmtKind::Return(Some(value)) => returned = Some(self.eval(value)),
                _ => {}
            }
        }
        returned
    }

    /// Evaluates one expression.
    pub fn eval(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal { value, .. } => match value {
                Literal::Null => Value::Null,
                Literal::Bool(value) => Value::Bool(*value),
                Literal::Int(value) => Value::Int(*value),
                Literal::Float(value) => Value::Float(*value),
                Literal::Str(value) => Value::Str(value.clone()),
            },
            Expr::Array(items) => self.array(items),
            Expr::Variable(name) => self
                .variables
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::Opaque("mixed".to_string())),
            Expr::Assign { value, .. } => self.eval(value),
            Expr::Closure(_) => Value::Opaque("Closure".to_string()),
            Expr::New { class, .. } => {
                let short = class.rsplit('\\').next().unwrap_or(class);
                Value::Opaque(short.to_string())
            }
            Expr::Call { .. } | Expr::Raw(_) => Value::Opaque("mixed".to_string()),
        }
    }

    fn array(&self, items: &[ArrayItem]) -> Value {
        let mut entries: Vec<(Key, Value)> = Vec::with_capacity(items.len());
        // `None` once an integer key reached `i64::MAX`; PHP refuses to append after that.
        let mut next_index = Some(0_i64);
        let mut overflowed = false;

        let mut insert = |entries: &mut Vec<(Key, Value)>, key: Option<Key>, value: Value| {
            let key = match (key, next_index) {
                (Some(key), _) => key,
                (None, Some(index)) => Key::Int(index),
                (None, None) => {
                    overflowed = true;
                    return;
                }
            };
            if let Key::Int(index) = key {
                let following = index.checked_add(1);
                next_index = match (next_index, following) {
                    (Some(current), Some(following)) => Some(current.max(following)),
                    _ => None,
                };
            }
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        };

        for item in items {
            let value = self.eval(&item.value);
            if item.spread {
                match value {
                    Value::Array(spread) => {
                        for (key, value) in spread {
                            let key = match key {
                                Key::Int(_) => None,
                                key @ Key::Str(_) => Some(key),
                            };
                            insert(&mut entries, key, value);
                        }
                    }
                    other => insert(&mut entries, None, Value::Opaque(type_name(&other))),
                }
                continue;
            }

            let key = match item.key.as_ref().map(|key| self.eval(key)) {
                None => None,
                Some(key) => match array_key(key) {
                    Ok(key) => Some(key),
                    Err(opaque) => {
                        insert(&mut entries, None, opaque);
                        continue;
                    }
                },
            };
            insert(&mut entries, key, value);
        }

        if overflowed {
            return Value::Opaque("array".to_string());
        }
        Value::Array(entries)
    }
}

/// Converts a key value the way PHP does: decimal integer strings, bools,
/// null and truncated floats become integer keys.
fn array_key(value: Value) -> Result<Key, Value> {
    match value {
        Value::Int(index) => Ok(Key::Int(index)),
        Value::Bool(flag) => Ok(Key::Int(i64::from(flag))),
        Value::Null => Ok(Key::Str(String::new())),
        #[allow(clippy::cast_possible_truncation)]
        Value::Float(number) => Ok(Key::Int(number.trunc() as i64)),
        Value::Str(text) => Ok(match text.parse::<i64>() {
            Ok(index) if index.to_string() == text => Key::Int(index),
            _ => Key::Str(text),
        }),
        other => Err(Value::Opaque(type_name(&other))),
    }
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Opaque(name) => name.clone(),
        _ => "mixed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_float_keeps_fraction() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(-0.5).to_string(), "-0.5");
    }

    #[test]
    fn test_numeric_string_key_is_integer() {
        assert_eq!(array_key(Value::Str("7".into())), Ok(Key::Int(7)));
        assert_eq!(array_key(Value::Str("07".into())), Ok(Key::Str("07".into())));
    }

    #[test]
    fn test_sparse_keys_render_as_map() {
        let value = Value::Array(vec![(Key::Int(1), Value::Int(2)), (Key::Int(0), Value::Int(1))]);
        assert_eq!(value.to_string(), "[1 => 2, 0 => 1]");
    }

    #[test]
    fn test_nested_opaque_is_not_printable() {
        let value = Value::list([Value::Int(1), Value::list([Value::Opaque("Closure".into())])]);
        assert!(!value.is_printable());
    }
}
