//! Flow-node input types.
//!
//! The graph walker loads nodes and hands the engine one resolved node at a
//! time. Only nodes of kind [`NodeType::Action`] are executed here; the
//! `content` payload of such a node decodes into an ordered action list (see
//! [`crate::actions::config::ActionContent`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kind of a flow node. The walker dispatches on this; the action engine only
/// ever receives `Action` nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Message,
    Question,
    Action,
    Composite,
}

/// A node of a flow graph as loaded by the walker.
///
/// `node_id` is the author-facing identifier unique within the flow; `id` is
/// the storage row identity. `content` is the raw authored payload: for
/// action nodes, `{"actions": [...]}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: Uuid,
    pub flow_id: Uuid,
    pub node_id: String,
    pub node_type: NodeType,
    pub content: Value,
}

impl FlowNode {
    /// Construct an action node from raw content. Mostly used by tests and
    /// flow loaders.
    pub fn action(flow_id: Uuid, node_id: impl Into<String>, content: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            flow_id,
            node_id: node_id.into(),
            node_type: NodeType::Action,
            content,
        }
    }
}
