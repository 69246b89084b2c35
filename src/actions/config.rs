//! Authored action configuration, decoded at node load.
//!
//! An action node's `content` is `{"actions": [...]}` where each entry
//! declares a `type` tag. Known kinds decode into one payload shape per kind;
//! anything else lands in [`Action::Unknown`] so the dispatcher can apply the
//! configuration-error policy (fail the node, keep earlier deltas) instead of
//! failing the whole node decode.

use serde::Deserialize;
use serde_json::Value;

/// Decoded `content` of an action node.
#[derive(Clone, Debug, Deserialize)]
pub struct ActionContent {
    pub actions: Vec<Action>,
}

/// One entry of a node's action list.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Remote or internal API call with response projection into state.
    ApiCall { config: ApiCallConfig },
    /// Best-effort analytics event emission.
    EmitEvent(EmitEventConfig),
    /// Unrecognized `type` tag, kept verbatim for error reporting.
    #[serde(untagged)]
    Unknown(Value),
}

impl Action {
    /// The declared `type` tag, or `"<untyped>"` when absent.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Action::ApiCall { .. } => "api_call",
            Action::EmitEvent(_) => "emit_event",
            Action::Unknown(raw) => raw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("<untyped>"),
        }
    }
}

/// How an `api_call` action reaches its endpoint.
///
/// `Internal` dispatches through the injected handler registry; every other
/// value goes out through the external HTTP client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    Internal,
    #[default]
    External,
    #[serde(other)]
    Other,
}

impl AuthType {
    #[must_use]
    pub fn is_internal(self) -> bool {
        matches!(self, AuthType::Internal)
    }
}

/// Configuration payload of an `api_call` action.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiCallConfig {
    /// Endpoint path; template-resolved but never pruned: an unresolved
    /// endpoint is a configuration error, not missing data.
    pub endpoint: String,
    #[serde(default)]
    pub auth_type: AuthType,
    /// Request body mapping, resolved and pruned before dispatch.
    pub body: Option<Value>,
    /// Query parameter mapping, resolved and pruned before dispatch.
    pub query_params: Option<Value>,
    /// Source path inside the response → destination state path. Required,
    /// may be empty.
    pub response_mapping: serde_json::Map<String, Value>,
    /// Already-final substitute response used when the call fails. Presence
    /// turns a hard failure into local recovery.
    pub fallback_response: Option<Value>,
}

/// Configuration payload of an `emit_event` action (fields sit at the action
/// level, beside `type`).
#[derive(Clone, Debug, Deserialize)]
pub struct EmitEventConfig {
    pub title: String,
    pub description: Option<String>,
    /// Metadata mapping, template-resolved per emission.
    pub info: Option<Value>,
    /// State path to a sequence; when set, one event is emitted per item.
    pub iterate_over: Option<String>,
    /// Binding name for the current item, visible to templates at
    /// `temp.<alias>` during iteration.
    pub item_alias: Option<String>,
}
