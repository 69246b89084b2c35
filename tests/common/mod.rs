#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatflow::events::{EventSink, EventSinkError, NewEvent};
use chatflow::flow::FlowNode;
use chatflow::registry::{HandlerError, HandlerRegistry, InternalHandler};
use chatflow::session::Session;
use serde_json::Value;
use uuid::Uuid;

/// Session with the given state, parked on a throwaway node.
pub fn make_session(state: Value) -> Session {
    Session::new(Uuid::new_v4(), Uuid::new_v4(), "test_node").with_state(state)
}

/// Action node owned by the session's flow.
pub fn make_action_node(session: &Session, content: Value) -> FlowNode {
    FlowNode::action(session.flow_id, "action_under_test", content)
}

/// Internal handler that records the body/params it was called with and
/// returns a canned response.
#[derive(Clone)]
pub struct CaptureHandler {
    pub response: Value,
    pub calls: Arc<Mutex<Vec<(Value, Value)>>>,
}

impl CaptureHandler {
    pub fn returning(response: Value) -> Self {
        Self {
            response,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<(Value, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InternalHandler for CaptureHandler {
    async fn call(&self, body: &Value, params: &Value) -> Result<Value, HandlerError> {
        self.calls
            .lock()
            .unwrap()
            .push((body.clone(), params.clone()));
        Ok(self.response.clone())
    }
}

/// Registry with a single endpoint that always fails.
pub fn failing_registry(endpoint: &str) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_fn(endpoint, |_body, _params| async move {
        Err(HandlerError::invalid_input("bad UUID"))
    });
    registry
}

/// Event sink whose create_event always fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingSink;

#[async_trait]
impl EventSink for FailingSink {
    async fn create_event(&self, _event: NewEvent) -> Result<(), EventSinkError> {
        Err(EventSinkError::unavailable("sink down"))
    }
}
