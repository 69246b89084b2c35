//! Session data model for chat-flow execution.
//!
//! A session is one user's walk through a flow graph. The action engine
//! treats the session as read-mostly input: it reads `state`, produces a
//! delta, and never writes back. Merging and persisting the delta belongs
//! to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lifecycle status of a chat session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// One user's in-flight walk through a flow.
///
/// `state` is a nested, string-keyed JSON mapping addressed by dotted state
/// paths (see [`crate::paths`]). `revision` increases monotonically each time
/// the caller persists a merged delta; the engine reads it but never bumps it.
///
/// Exactly one flow step is in flight per session at a time: the session
/// serialization layer enforces that, so the engine can assume its state
/// snapshot is not mutated concurrently.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flow_id: Uuid,
    /// Node the walker is currently parked on.
    pub current_node_id: String,
    /// Nested state mapping; always a JSON object.
    pub state: Value,
    pub revision: u32,
    pub status: SessionStatus,
}

impl Session {
    /// Fresh active session with empty state, parked on `current_node_id`.
    pub fn new(user_id: Uuid, flow_id: Uuid, current_node_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            flow_id,
            current_node_id: current_node_id.into(),
            state: Value::Object(serde_json::Map::new()),
            revision: 1,
            status: SessionStatus::Active,
        }
    }

    /// Replace the state mapping, builder style. Handy in tests and when
    /// rehydrating a session from storage.
    #[must_use]
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }
}
