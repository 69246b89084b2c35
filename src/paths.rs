//! Dotted state-path access for nested session state.
//!
//! Session state is a nested, string-keyed JSON mapping. A *state path* is a
//! dotted string like `"temp.book_count"` addressing a location inside that
//! mapping. Path segments are mapping keys only; there is no list-index
//! addressing.

use serde_json::{Map, Value};

/// Look up the value at a dotted path inside a nested mapping.
///
/// Returns `None` if any segment is missing or if traversal hits a
/// non-mapping value before the path is exhausted. The empty path addresses
/// the root.
///
/// # Examples
///
/// ```rust
/// use chatflow::paths::get_path;
/// use serde_json::json;
///
/// let state = json!({"user": {"profile": {"name": "Alice"}}});
/// assert_eq!(get_path(&state, "user.profile.name"), Some(&json!("Alice")));
/// assert_eq!(get_path(&state, "user.missing"), None);
/// ```
#[must_use]
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Write a value at a dotted path, creating intermediate mappings as needed.
///
/// An intermediate that exists but is not a mapping is replaced with a fresh
/// mapping, so the write always lands. Setting the empty path replaces the
/// whole target.
///
/// # Examples
///
/// ```rust
/// use chatflow::paths::set_path;
/// use serde_json::json;
///
/// let mut delta = json!({});
/// set_path(&mut delta, "temp.book_count", json!(3));
/// assert_eq!(delta, json!({"temp": {"book_count": 3}}));
/// ```
pub fn set_path(target: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        *target = value;
        return;
    }

    let mut current = target;
    let segments: Vec<&str> = path.split('.').collect();
    for segment in &segments[..segments.len() - 1] {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(segments[segments.len() - 1].to_string(), value);
    }
}

/// Deep-merge `update` into `base`.
///
/// Mappings merge recursively key by key; everything else (sequences
/// included) is replaced wholesale by the update side. This is the rule used
/// both to build the effective state an action sees (base state + delta so
/// far) and to fold per-action deltas into the node-level accumulator.
///
/// # Examples
///
/// ```rust
/// use chatflow::paths::deep_merge;
/// use serde_json::json;
///
/// let mut base = json!({"temp": {"a": 1}, "user": {"name": "Sam"}});
/// deep_merge(&mut base, &json!({"temp": {"b": 2}}));
/// assert_eq!(base, json!({"temp": {"a": 1, "b": 2}, "user": {"name": "Sam"}}));
/// ```
pub fn deep_merge(base: &mut Value, update: &Value) {
    match (base, update) {
        (Value::Object(base_map), Value::Object(update_map)) => {
            for (key, update_value) in update_map {
                match base_map.get_mut(key) {
                    Some(base_value) if base_value.is_object() && update_value.is_object() => {
                        deep_merge(base_value, update_value);
                    }
                    _ => {
                        base_map.insert(key.clone(), update_value.clone());
                    }
                }
            }
        }
        (base_slot, _) => *base_slot = update.clone(),
    }
}

/// Deep-merge returning a fresh value, leaving both inputs untouched.
#[must_use]
pub fn merged(base: &Value, update: &Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, update);
    out
}
