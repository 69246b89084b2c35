//! Action-node execution engine.
//!
//! An action node's content is an ordered list of side-effecting actions.
//! [`ActionProcessor::process`] runs them strictly in order, one suspension
//! point per outbound call, folding each action's state delta into a single
//! node-level [`ActionNodeResult`]. Failure isolation follows the node
//! contract:
//!
//! - `api_call` failures recover locally through `fallback_response` when one
//!   is configured; otherwise they fail the node, preserving deltas from
//!   actions that already completed.
//! - `emit_event` never fails the node; its handler has no failure variant.
//! - An unknown action type is a configuration error: processing stops and
//!   the node fails, again preserving the accumulated delta.
//!
//! The engine is stateless across invocations and never writes session state
//! itself: the caller merges `variables` into persisted state.
//!
//! # Examples
//!
//! ```rust
//! use chatflow::actions::{ActionContext, ActionProcessor};
//! use chatflow::flow::FlowNode;
//! use chatflow::registry::HandlerRegistry;
//! use chatflow::session::Session;
//! use serde_json::json;
//! use uuid::Uuid;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut registry = HandlerRegistry::new();
//! registry.register_fn("/v1/recommend", |_body, _params| async move {
//!     Ok(json!({"count": 3}))
//! });
//! let processor = ActionProcessor::internal_only(registry);
//!
//! let session = Session::new(Uuid::new_v4(), Uuid::new_v4(), "start");
//! let node = FlowNode::action(session.flow_id, "recommend", json!({
//!     "actions": [{
//!         "type": "api_call",
//!         "config": {
//!             "endpoint": "/v1/recommend",
//!             "auth_type": "internal",
//!             "response_mapping": {"count": "temp.book_count"}
//!         }
//!     }]
//! }));
//!
//! let result = processor.process(&node, &session, &ActionContext::default()).await;
//! assert!(result.success);
//! assert_eq!(result.variables, json!({"temp": {"book_count": 3}}));
//! # }
//! ```

pub mod config;
pub mod outcome;

mod api_call;
mod emit_event;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::events::{EventSink, SchoolDirectory};
use crate::external::ExternalApi;
use crate::flow::FlowNode;
use crate::paths::{deep_merge, merged};
use crate::registry::{HandlerError, HandlerRegistry};
use crate::session::Session;

use self::config::{Action, ActionContent};
use self::outcome::{ActionError, ActionOutcome};

/// Per-invocation collaborator handles.
///
/// Both handles are optional: a context without an event sink turns every
/// `emit_event` action into a silent no-op (the best-effort short-circuit),
/// and a context without a school directory emits events with no school
/// attached.
#[derive(Clone, Default)]
pub struct ActionContext {
    pub events: Option<Arc<dyn EventSink>>,
    pub schools: Option<Arc<dyn SchoolDirectory>>,
}

impl ActionContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    #[must_use]
    pub fn with_schools(mut self, directory: Arc<dyn SchoolDirectory>) -> Self {
        self.schools = Some(directory);
        self
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("events", &self.events.is_some())
            .field("schools", &self.schools.is_some())
            .finish()
    }
}

/// Node-level result handed back to the flow walker.
///
/// `variables` is always a JSON object, even on failure: it carries whatever
/// deltas completed actions produced before the node failed, and the walker
/// merges it into persisted session state regardless of `success`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionNodeResult {
    pub success: bool,
    pub variables: Value,
}

impl ActionNodeResult {
    fn failed(variables: Value) -> Self {
        Self {
            success: false,
            variables,
        }
    }
}

/// The action-node execution engine.
///
/// Construction injects the internal handler registry and the external call
/// client; the engine holds no mutable state and a single instance serves any
/// number of sessions (one node execution per session in flight at a time is
/// enforced upstream).
#[derive(Clone)]
pub struct ActionProcessor {
    pub(crate) registry: Arc<HandlerRegistry>,
    pub(crate) external: Arc<dyn ExternalApi>,
}

impl ActionProcessor {
    pub fn new(registry: HandlerRegistry, external: Arc<dyn ExternalApi>) -> Self {
        Self {
            registry: Arc::new(registry),
            external,
        }
    }

    /// Engine with no external transport: `auth_type: external` actions fail
    /// (and follow the fallback rule) without touching the network.
    pub fn internal_only(registry: HandlerRegistry) -> Self {
        Self::new(registry, Arc::new(UnconfiguredExternalApi))
    }

    /// Execute an action node's action list against the session state.
    ///
    /// Actions run strictly in order; each sees the base state deep-merged
    /// with the deltas of the actions before it. The returned
    /// [`ActionNodeResult`] aggregates all deltas whether or not the node
    /// ultimately succeeds.
    pub async fn process(
        &self,
        node: &FlowNode,
        session: &Session,
        ctx: &ActionContext,
    ) -> ActionNodeResult {
        let content: ActionContent = match serde_json::from_value(node.content.clone()) {
            Ok(content) => content,
            Err(source) => {
                error!(
                    node_id = %node.node_id,
                    error = %ActionError::InvalidContent { source },
                    "action node content did not decode"
                );
                return ActionNodeResult::failed(empty_object());
            }
        };

        let mut variables = empty_object();
        for (index, action) in content.actions.iter().enumerate() {
            let effective_state = merged(&session.state, &variables);
            debug!(node_id = %node.node_id, index, kind = action.kind(), "running action");

            match action {
                Action::EmitEvent(config) => {
                    // Best-effort by contract: no failure surface, no delta.
                    self.handle_emit_event(config, &effective_state, ctx).await;
                }
                Action::ApiCall { config } => {
                    match self.handle_api_call(config, &effective_state).await {
                        Ok(outcome) => {
                            if let ActionOutcome::Recovered(_) = &outcome {
                                info!(
                                    node_id = %node.node_id,
                                    index,
                                    "api_call recovered via fallback_response"
                                );
                            }
                            deep_merge(&mut variables, outcome.delta());
                        }
                        Err(err) => {
                            error!(
                                node_id = %node.node_id,
                                index,
                                error = %err,
                                "api_call failed, failing node"
                            );
                            return ActionNodeResult::failed(variables);
                        }
                    }
                }
                Action::Unknown(_) => {
                    let err = ActionError::UnknownActionType {
                        kind: action.kind().to_string(),
                    };
                    error!(node_id = %node.node_id, index, error = %err, "failing node");
                    return ActionNodeResult::failed(variables);
                }
            }
        }

        ActionNodeResult {
            success: true,
            variables,
        }
    }
}

/// Stand-in external client for engines that only serve internal endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredExternalApi;

#[async_trait]
impl ExternalApi for UnconfiguredExternalApi {
    async fn call(
        &self,
        endpoint: &str,
        _body: &Value,
        _params: &Value,
    ) -> Result<Value, HandlerError> {
        Err(HandlerError::other(format!(
            "no external API client configured (endpoint {endpoint})"
        )))
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
