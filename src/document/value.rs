//! Tagged-variant data tree for document payloads.
//!
//! Every manifest body is represented as a [`Value`]: maps with string keys,
//! ordered sequences and scalars. Maps keep their insertion order so that a
//! document renders back the way it was written.
//!
//! # Example
//!
//! ```
//! use bundlequill::document::value::{Number, Value};
//! use indexmap::IndexMap;
//!
//! let mut spec = IndexMap::new();
//! spec.insert("replicas".to_string(), Value::Number(Number::Integer(3)));
//! let root = Value::Map(spec);
//!
//! assert!(root.is_map());
//! assert_eq!(root.get("replicas").and_then(Value::as_i64), Some(3));
//! ```

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A YAML/JSON number (integer or float).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

impl Number {
    /// Returns the number as a float. Large integers may lose precision.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// Returns true if this is an integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

/// A node of a document's data tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Key-value pairs in insertion order
    Map(IndexMap<String, Value>),
    /// Ordered sequence
    Seq(Vec<Value>),
    String(String),
    Number(Number),
    Bool(bool),
    #[default]
    Null,
}

impl Value {
    /// Returns true if this value is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns true if this value is a sequence.
    pub fn is_seq(&self) -> bool {
        matches!(self, Value::Seq(_))
    }

    /// Returns true if this value is a map or a sequence.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Seq(_))
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in diagnostics.
    ///
    /// ```
    /// use bundlequill::document::value::Value;
    ///
    /// assert_eq!(Value::Seq(vec![]).type_name(), "sequence");
    /// assert_eq!(Value::Null.type_name(), "null");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Map(_) => "map",
            Value::Seq(_) => "sequence",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Null => "null",
        }
    }

    /// Looks up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Looks up a position when this value is a sequence.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Seq(items) => items.get(index),
            _ => None,
        }
    }

    /// Returns the string if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this value is an integer. Floats are not
    /// truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(Number::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Returns the bool if this value is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the entries if this value is a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the items if this value is a sequence.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Renders a scalar the way it would appear in a label or annotation.
    ///
    /// Containers have no scalar form and return `None`.
    pub fn scalar_to_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => Some(String::new()),
            Value::Map(_) | Value::Seq(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Integer(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<V: Into<Value>> FromIterator<(String, V)> for Value {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_unit(),
        }
    }
}
