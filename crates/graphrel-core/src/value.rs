//! The wire value model shared by query building and result decoding.
//!
//! `Value` is used in three positions: batch key sets bound into compiled
//! statements, cursor parameters, and the cells of decoded [`Row`]s. Loader
//! caches are keyed by values, so equality and hashing must be total:
//! floats compare and hash by bit pattern, JSON by its canonical string form.
//!
//! [`Row`]: crate::row::Row

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single database value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any integer column (including `seq` ordinals).
    Int(i64),
    /// Floating-point column.
    Float(f64),
    /// Text, identifiers, timestamps, and monetary amounts in transit.
    Text(String),
    /// Opaque structured payload (the dynamic "any shape" column).
    Json(serde_json::Value),
    /// A set of values, bound as the batched key set of `= ANY($n)`.
    Array(Vec<Value>),
}

impl Value {
    /// Whether this value is SQL NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// View this value as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render this value as an opaque cursor token.
    ///
    /// Cursors wrap row identifiers, which arrive as text or integers
    /// depending on the executor's decoding.
    #[must_use]
    pub fn to_cursor(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Json(j) => j.to_string(),
            Value::Null | Value::Array(_) => String::new(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bitwise so that equality stays consistent with hashing.
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        match self {
            Value::Null => 0u8.hash(hasher),
            Value::Bool(b) => {
                1u8.hash(hasher);
                b.hash(hasher);
            }
            Value::Int(i) => {
                2u8.hash(hasher);
                i.hash(hasher);
            }
            Value::Float(f) => {
                3u8.hash(hasher);
                f.to_bits().hash(hasher);
            }
            Value::Text(s) => {
                4u8.hash(hasher);
                s.hash(hasher);
            }
            Value::Json(j) => {
                5u8.hash(hasher);
                j.to_string().hash(hasher);
            }
            Value::Array(arr) => {
                6u8.hash(hasher);
                arr.len().hash(hasher);
                for item in arr {
                    item.hash(hasher);
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}
