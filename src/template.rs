//! Placeholder resolution and unresolved-marker pruning.
//!
//! Action configuration (API bodies, query params, event metadata) may embed
//! `{{path.to.value}}` markers referencing session state. Resolution
//! substitutes each marker with the stringified state value where the path is
//! present, leaving absent markers in place. Pruning is the follow-up pass
//! that collapses any string still carrying marker syntax to JSON null, so
//! leftover placeholder text never reaches an external call or a persisted
//! record.
//!
//! The typical pipeline is [`resolve_value`] followed by [`prune_unresolved`].

use serde_json::Value;

use crate::paths::get_path;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// True when `text` contains at least one `{{` with a later `}}`.
///
/// A lone `{{` or `}}` does not count; the degenerate empty pair `{{}}` does.
#[must_use]
pub fn has_marker(text: &str) -> bool {
    match text.find(OPEN) {
        Some(open) => text[open + OPEN.len()..].contains(CLOSE),
        None => false,
    }
}

/// Resolve every `{{path}}` marker in a string against `state`.
///
/// Markers whose path is present substitute the stringified value; markers
/// whose path is absent (or whose value is JSON null) are left untouched for
/// the pruner to handle. Text outside markers passes through unchanged, as
/// does a string with no markers at all.
///
/// # Examples
///
/// ```rust
/// use chatflow::template::resolve_str;
/// use serde_json::json;
///
/// let state = json!({"user": {"age": 9}});
/// assert_eq!(resolve_str("Age: {{user.age}}", &state), "Age: 9");
/// assert_eq!(resolve_str("{{user.name}}", &state), "{{user.name}}");
/// ```
#[must_use]
pub fn resolve_str(template: &str, state: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find(OPEN) {
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            break;
        };

        out.push_str(&rest[..open]);
        let path = after_open[..close].trim();
        // The degenerate `{{}}` marker never resolves; `get_path("")` would
        // otherwise address the state root.
        match get_path(state, path).filter(|_| !path.is_empty()) {
            Some(value) if !value.is_null() => out.push_str(&stringify(value)),
            _ => {
                // Unresolved: keep the marker verbatim for the pruner.
                out.push_str(OPEN);
                out.push_str(&after_open[..close]);
                out.push_str(CLOSE);
            }
        }
        rest = &after_open[close + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Resolve markers recursively through a JSON structure.
///
/// Strings go through [`resolve_str`]; mapping values and sequence elements
/// recurse (mapping keys are untouched); every other type is returned
/// unchanged.
#[must_use]
pub fn resolve_value(value: &Value, state: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(resolve_str(s, state)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, state)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resolve_value(v, state)).collect())
        }
        other => other.clone(),
    }
}

/// Collapse strings still carrying marker syntax to null, recursively.
///
/// A partially-resolved string is unusable data, not best-effort text: if any
/// `{{...}}` pair survives resolution the *entire* string becomes null,
/// surrounding text included. Non-strings, marker-free strings (the empty
/// string and stray single braces included), and structure shape are all
/// preserved.
///
/// # Examples
///
/// ```rust
/// use chatflow::template::prune_unresolved;
/// use serde_json::json;
///
/// assert_eq!(prune_unresolved(json!("Hello {{user.name}}!")), json!(null));
/// assert_eq!(prune_unresolved(json!("has {{ only")), json!("has {{ only"));
/// assert_eq!(
///     prune_unresolved(json!({"name": "Brian", "school_id": "{{context.school_wriveted_id}}"})),
///     json!({"name": "Brian", "school_id": null}),
/// );
/// ```
#[must_use]
pub fn prune_unresolved(value: Value) -> Value {
    match value {
        Value::String(s) => {
            if has_marker(&s) {
                Value::Null
            } else {
                Value::String(s)
            }
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, prune_unresolved(v)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(prune_unresolved).collect())
        }
        other => other,
    }
}

/// Resolve then prune in one step.
#[must_use]
pub fn resolve_and_prune(value: &Value, state: &Value) -> Value {
    prune_unresolved(resolve_value(value, state))
}

/// Render a state value for substitution into a string.
///
/// Strings insert as-is (no quoting); scalars use their JSON rendering;
/// mappings and sequences use compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
