//! Per-action results and the action error taxonomy.

use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::registry::HandlerError;

/// Successful completion of one action.
///
/// Both variants carry the state delta the action produced and merge
/// identically; `Recovered` additionally records that a configured
/// `fallback_response` stood in for a failed call, which the dispatcher logs.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// The action ran to completion against real data.
    Completed(Value),
    /// The call failed but `fallback_response` covered for it.
    Recovered(Value),
}

impl ActionOutcome {
    /// The state delta to merge into the node accumulator.
    #[must_use]
    pub fn delta(&self) -> &Value {
        match self {
            ActionOutcome::Completed(delta) | ActionOutcome::Recovered(delta) => delta,
        }
    }

}

/// Hard failure of one action; fails the owning node.
///
/// Deltas from actions that completed earlier in the same node survive a
/// propagated `ActionError`: the dispatcher returns them alongside
/// `success = false`.
#[derive(Debug, Error, Diagnostic)]
pub enum ActionError {
    /// Action declared a `type` no handler exists for.
    #[error("unknown action type: {kind}")]
    #[diagnostic(
        code(chatflow::actions::unknown_type),
        help("Check the node's authored action list; valid types are api_call and emit_event.")
    )]
    UnknownActionType { kind: String },

    /// `auth_type: internal` endpoint absent from the handler registry.
    #[error("unknown internal endpoint: {endpoint}")]
    #[diagnostic(
        code(chatflow::actions::unknown_endpoint),
        help("Register the endpoint in the HandlerRegistry passed at engine construction.")
    )]
    UnknownEndpoint { endpoint: String },

    /// Node content did not decode into an action list.
    #[error("invalid action node content: {source}")]
    #[diagnostic(code(chatflow::actions::invalid_content))]
    InvalidContent {
        #[from]
        source: serde_json::Error,
    },

    /// Internal handler or external call failed with no fallback configured.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Call(#[from] HandlerError),
}
