use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ordered_float::OrderedFloat;

/// Runtime value stored in a column.
///
/// Strings are `Arc<str>` so that a value repeated across many rows (entity
/// names, categorical labels) is stored once and shared.
#[derive(Clone, Debug)]
pub enum Value {
    /// Missing / unset value.
    Null,
    /// IEEE-754 double precision number.
    Number(f64),
    /// Boolean.
    Boolean(bool),
    /// Interned string.
    String(Arc<str>),
}

impl Value {
    /// Returns true if the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            // NaN equals NaN for identity purposes (unique-value caches,
            // hash indices), unlike IEEE comparison.
            (Value::Number(a), Value::Number(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Number(n) => {
                state.write_u8(1);
                OrderedFloat(*n).hash(state);
            }
            Value::Boolean(b) => {
                state.write_u8(2);
                b.hash(state);
            }
            Value::String(s) => {
                state.write_u8(3);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::<str>::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::<str>::from(value.as_str()))
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Value::String(value)
    }
}

/// Interner handing out shared `Arc<str>`s during ingestion.
#[derive(Debug, Default)]
pub struct StringPool {
    set: HashMap<Arc<str>, ()>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some((k, _)) = self.set.get_key_value(s) {
            return k.clone();
        }

        let arc: Arc<str> = Arc::<str>::from(s);
        self.set.insert(arc.clone(), ());
        arc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn nan_is_equal_to_itself_for_identity() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Number(f64::NAN), Value::Number(0.0));

        let mut set = HashSet::new();
        set.insert(Value::Number(f64::NAN));
        assert!(set.contains(&Value::Number(f64::NAN)));
    }

    #[test]
    fn string_pool_shares_allocations() {
        let mut pool = StringPool::new();
        let a = pool.intern("France");
        let b = pool.intern("France");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
