//! Value model for signupdb.
//!
//! Defines the canonical tagged [`Value`] union stored in document fields,
//! dot-separated path traversal, and the type-aware ordering the query
//! engine sorts with.
//!
//! ## The Eight Types
//!
//! 1. `Null` - absence of value
//! 2. `Bool` - boolean
//! 3. `Int` - 64-bit signed integer
//! 4. `Float` - 64-bit IEEE-754 floating point
//! 5. `String` - UTF-8 string
//! 6. `Timestamp` - instant in UTC
//! 7. `Array` - ordered sequence of values
//! 8. `Object` - string-keyed map of values (a nested document)
//!
//! `Int` and `Float` are one logical "number" kind: they cross-compare
//! numerically in [`Value::compare`], so `Int(1)` and `Float(1.0)` are
//! interchangeable to the query engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The top-level field map of a document.
pub type Fields = BTreeMap<String, Value>;

/// Canonical field value type.
///
/// This is the only value model; documents are maps of field name to
/// `Value`, and nested documents are `Value::Object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absence of value.
    Null,

    /// Boolean true or false.
    Bool(bool),

    /// 64-bit signed integer.
    Int(i64),

    /// 64-bit IEEE-754 floating point.
    Float(f64),

    /// UTF-8 encoded string.
    String(String),

    /// Instant in UTC.
    Timestamp(DateTime<Utc>),

    /// Ordered sequence of values.
    Array(Vec<Value>),

    /// Nested document.
    Object(Fields),
}

impl Value {
    /// Returns the type name as a string (for error messages).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Timestamp(_) => "Timestamp",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64. `Int` widens.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as timestamp.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Try to get as array slice.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get as object reference.
    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Type-aware ordering.
    ///
    /// Numbers (`Int`/`Float`) cross-compare numerically, strings
    /// lexicographically, timestamps as instants. A string compared against
    /// a timestamp is attempted as an RFC 3339 instant. Pairs with no
    /// meaningful order (and float comparisons involving NaN) yield `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::Timestamp(b)) => {
                parse_instant(a).map(|a| a.cmp(b))
            }
            (Value::Timestamp(a), Value::String(b)) => {
                parse_instant(b).map(|b| a.cmp(&b))
            }
            _ => None,
        }
    }

    /// Coerce to an instant: either a `Timestamp`, or a `String` that
    /// parses as RFC 3339. Anything else yields `None`.
    pub fn coerce_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::String(s) => parse_instant(s),
            _ => None,
        }
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Resolve a dot-separated path into a field map.
///
/// `"a.b.c"` reads field `c` of field `b` of field `a`. Any missing
/// intermediate (or a non-object intermediate) yields `None` — undefined,
/// never an error.
pub fn value_at_path<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Paths the store itself maintains as timestamps. When sorting on one of
/// these, string operands are additionally attempted as instants.
const TIMESTAMP_PATHS: &[&str] = &["createdAt", "updatedAt"];

/// Check whether a path is known to hold timestamp-like data.
pub fn is_timestamp_path(path: &str) -> bool {
    TIMESTAMP_PATHS.contains(&path)
}

// ============================================================================
// serde_json bridge
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => {
                Value::Array(a.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(o) => Value::Object(
                o.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => {
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            Value::Array(a) => {
                serde_json::Value::Array(a.into_iter().map(Into::into).collect())
            }
            Value::Object(o) => serde_json::Value::Object(
                o.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

/// Build a field map from a `serde_json::Value::Object`.
///
/// Convenience for callers constructing documents with `serde_json::json!`.
/// Non-object input yields an empty map.
pub fn fields_from_json(v: serde_json::Value) -> Fields {
    match Value::from(v) {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}
