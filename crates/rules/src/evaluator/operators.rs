//! Per-operator semantics.
//!
//! Every function takes the resolved field (`None` = absent) and the
//! condition literal, and fails closed on type mismatches.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::schema::ConditionValue;

/// Compiled patterns keyed by source text; `None` marks a pattern that failed
/// to compile. Rule sets are small and fixed, so entries are never evicted.
static PATTERNS: LazyLock<RwLock<HashMap<String, Option<Regex>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Compile `pattern` once per process; later calls clone the cached regex.
fn compiled(pattern: &str, path: &str) -> Option<Regex> {
    if let Some(cached) = PATTERNS.read().expect("pattern cache lock poisoned").get(pattern) {
        return cached.clone();
    }
    let re = match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(field = %path, pattern = %pattern, error = %e, "invalid regex in rule condition");
            None
        }
    };
    PATTERNS
        .write()
        .expect("pattern cache lock poisoned")
        .insert(pattern.to_string(), re.clone());
    re
}

pub(super) fn eq(field: Option<&Value>, expected: Option<&ConditionValue>) -> bool {
    match (field, expected) {
        (Some(field), Some(expected)) => expected.matches_json(field),
        _ => false,
    }
}

/// An absent field is unequal to everything.
pub(super) fn neq(field: Option<&Value>, expected: Option<&ConditionValue>) -> bool {
    match expected {
        Some(expected) => field.map_or(true, |f| !expected.matches_json(f)),
        None => false,
    }
}

pub(super) fn contains(field: Option<&Value>, needle: Option<&ConditionValue>) -> bool {
    match (field, needle) {
        (Some(Value::String(haystack)), Some(needle)) => haystack.contains(&needle.to_string()),
        _ => false,
    }
}

pub(super) fn regex(field: Option<&Value>, pattern: Option<&ConditionValue>, path: &str) -> bool {
    let (Some(Value::String(text)), Some(ConditionValue::String(pattern))) = (field, pattern) else {
        return false;
    };
    compiled(pattern, path).is_some_and(|re| re.is_match(text))
}

pub(super) fn gt(field: Option<&Value>, threshold: Option<&ConditionValue>) -> bool {
    compare(field, threshold, |a, b| a > b)
}

pub(super) fn lt(field: Option<&Value>, threshold: Option<&ConditionValue>) -> bool {
    compare(field, threshold, |a, b| a < b)
}

pub(super) fn is_in(field: Option<&Value>, list: Option<&ConditionValue>) -> bool {
    match (field, list.and_then(ConditionValue::as_list)) {
        (Some(field), Some(items)) => items.iter().any(|item| item.matches_json(field)),
        _ => false,
    }
}

pub(super) fn not_in(field: Option<&Value>, list: Option<&ConditionValue>) -> bool {
    match (field, list.and_then(ConditionValue::as_list)) {
        (Some(field), Some(items)) => !items.iter().any(|item| item.matches_json(field)),
        (None, Some(_)) => true,
        // A non-list literal is malformed; fail closed.
        (_, None) => false,
    }
}

pub(super) fn exists(field: Option<&Value>, expected: Option<&ConditionValue>) -> bool {
    let want_present = expected.map_or(true, ConditionValue::is_truthy);
    field.is_some() == want_present
}

/// Coerce both sides to `f64`; anything non-numeric never satisfies.
fn compare(field: Option<&Value>, threshold: Option<&ConditionValue>, op: fn(f64, f64) -> bool) -> bool {
    match (field.and_then(numeric), threshold.and_then(ConditionValue::as_number)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
