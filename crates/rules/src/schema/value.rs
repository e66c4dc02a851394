//! Literal values carried by rule conditions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A condition literal.
///
/// Rule files are free-form JSON/YAML, but a condition can only ever compare
/// against one of these four shapes. Incident field values stay as
/// [`serde_json::Value`]; each operator decides how the two meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<ConditionValue>),
}

impl ConditionValue {
    /// Numeric view: numbers as-is, strings if they parse as `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConditionValue::Number(n) => Some(*n),
            ConditionValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConditionValue]> {
        match self {
            ConditionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Truthiness: `false`, `0`, `""` and `[]` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConditionValue::Bool(b) => *b,
            ConditionValue::Number(n) => *n != 0.0,
            ConditionValue::String(s) => !s.is_empty(),
            ConditionValue::List(items) => !items.is_empty(),
        }
    }

    /// Equality against an incident field, by dynamic type.
    ///
    /// Numbers compare numerically (so `1` equals `1.0`); mismatched types and
    /// JSON `null` are never equal.
    pub fn matches_json(&self, field: &Value) -> bool {
        match (self, field) {
            (ConditionValue::Bool(a), Value::Bool(b)) => a == b,
            (ConditionValue::Number(a), Value::Number(b)) => b.as_f64() == Some(*a),
            (ConditionValue::String(a), Value::String(b)) => a == b,
            (ConditionValue::List(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches_json(y))
            }
            _ => false,
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Bool(b) => write!(f, "{b}"),
            // Integral thresholds render without a trailing ".0".
            ConditionValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            ConditionValue::Number(n) => write!(f, "{n}"),
            ConditionValue::String(s) => f.write_str(s),
            ConditionValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for ConditionValue {
    fn from(v: bool) -> Self {
        ConditionValue::Bool(v)
    }
}

impl From<f64> for ConditionValue {
    fn from(v: f64) -> Self {
        ConditionValue::Number(v)
    }
}

impl From<i64> for ConditionValue {
    fn from(v: i64) -> Self {
        ConditionValue::Number(v as f64)
    }
}

impl From<&str> for ConditionValue {
    fn from(v: &str) -> Self {
        ConditionValue::String(v.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(v: String) -> Self {
        ConditionValue::String(v)
    }
}

impl<T: Into<ConditionValue>> From<Vec<T>> for ConditionValue {
    fn from(v: Vec<T>) -> Self {
        ConditionValue::List(v.into_iter().map(Into::into).collect())
    }
}
