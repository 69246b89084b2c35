//! # Chatflow: Action-Node Execution Engine
//!
//! Chatflow is the action-execution core of a chat-flow runtime: given one
//! "action" node of a conversational flow graph and the current session
//! state, it runs the node's ordered list of side-effecting actions (API
//! calls, analytics-event emission) against template-driven configuration and
//! folds the results back into a single state delta.
//!
//! ## Core Concepts
//!
//! - **Templates**: action configuration embeds `{{path.to.value}}` markers
//!   resolved against nested session state; anything still unresolved after
//!   substitution is pruned to null rather than leaking marker syntax
//!   downstream.
//! - **Dispatch**: `api_call` actions route either through an injected
//!   internal handler registry or an external HTTP client; `emit_event`
//!   actions append analytics records best-effort.
//! - **Failure isolation**: a configured `fallback_response` recovers a
//!   failed call locally; event-emission failures are always swallowed;
//!   everything else fails the node while preserving deltas from actions
//!   that already completed.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use chatflow::actions::{ActionContext, ActionProcessor};
//! use chatflow::events::MemoryEventSink;
//! use chatflow::flow::FlowNode;
//! use chatflow::registry::HandlerRegistry;
//! use chatflow::session::Session;
//! use serde_json::json;
//! use uuid::Uuid;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut registry = HandlerRegistry::new();
//! registry.register_fn("/v1/recommend", |body, _params| async move {
//!     let _ = body; // handlers get the resolved, pruned request body
//!     Ok(json!({"books": [], "count": 0}))
//! });
//!
//! let processor = ActionProcessor::internal_only(registry);
//! let sink = Arc::new(MemoryEventSink::new());
//! let ctx = ActionContext::new().with_events(sink.clone());
//!
//! let session = Session::new(Uuid::new_v4(), Uuid::new_v4(), "recommend")
//!     .with_state(json!({"user": {"name": "Sam"}}));
//! let node = FlowNode::action(session.flow_id, "recommend_books", json!({
//!     "actions": [
//!         {
//!             "type": "api_call",
//!             "config": {
//!                 "endpoint": "/v1/recommend",
//!                 "auth_type": "internal",
//!                 "body": {"name": "{{user.name}}"},
//!                 "response_mapping": {"count": "temp.book_count"}
//!             }
//!         },
//!         {
//!             "type": "emit_event",
//!             "title": "Recommendations fetched for {{user.name}}"
//!         }
//!     ]
//! }));
//!
//! let result = processor.process(&node, &session, &ctx).await;
//! assert!(result.success);
//! assert_eq!(result.variables, json!({"temp": {"book_count": 0}}));
//! assert_eq!(sink.len(), 1);
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`actions`] - Dispatcher, per-action handlers, and node results
//! - [`template`] - Placeholder resolution and unresolved-marker pruning
//! - [`paths`] - Dotted state-path access and delta merging
//! - [`registry`] - Injected internal endpoint handlers
//! - [`external`] - External HTTP call client
//! - [`events`] - Event sink and school lookup collaborators
//! - [`session`] / [`flow`] - Data model handed in by the flow walker
//! - [`telemetry`] - Tracing setup

pub mod actions;
pub mod events;
pub mod external;
pub mod flow;
pub mod paths;
pub mod registry;
pub mod session;
pub mod telemetry;
pub mod template;
