//! Dot-path lookup into nested incident data.

use serde_json::Value;

/// Resolve `a.b.c` against nested objects.
///
/// Numeric segments index into arrays. Any missing intermediate key yields
/// `None` ("field absent"); a present JSON `null` is returned as-is.
pub(crate) fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
