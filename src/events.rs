//! Analytics-event collaborators: the event sink and entity lookup.
//!
//! `emit_event` actions append records through an [`EventSink`]. Emission is
//! best-effort by contract: the engine swallows and logs every sink failure,
//! and records are created with `commit: false` so transactional commit stays
//! with the caller.
//!
//! [`MemoryEventSink`] and [`ChannelEventSink`] are in-process sinks used by
//! tests and embedders that fan events out to their own pipeline.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// A school (or equivalent contextual entity) attached to emitted events when
/// the session state carries a resolvable external identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: Uuid,
    /// Identifier the outside world uses for this school; what session state
    /// carries.
    pub external_id: String,
    pub name: Option<String>,
}

/// One analytics record produced by an `emit_event` action.
///
/// `title` and `description` are `None` when an authored template failed to
/// resolve; pruned placeholder text is never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Resolved metadata mapping; always a JSON object.
    pub info: Value,
    pub school: Option<School>,
    /// Deferred-commit flag: the engine always sets this false. Commit
    /// ownership belongs to the caller's transaction.
    pub commit: bool,
    pub created_at: DateTime<Utc>,
}

impl NewEvent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
            info: Value::Object(serde_json::Map::new()),
            school: None,
            commit: false,
            created_at: Utc::now(),
        }
    }
}

/// Failure appending an event record.
#[derive(Debug, Error, Diagnostic)]
pub enum EventSinkError {
    #[error("event sink unavailable: {message}")]
    #[diagnostic(code(chatflow::events::unavailable))]
    Unavailable { message: String },

    #[error("event rejected by sink: {message}")]
    #[diagnostic(code(chatflow::events::rejected))]
    Rejected { message: String },
}

impl EventSinkError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Append-only event store.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn create_event(&self, event: NewEvent) -> Result<(), EventSinkError>;
}

/// Lookup of schools by their external identifier.
///
/// A miss is `Ok(None)`: the emitted event simply goes out without a school.
#[async_trait]
pub trait SchoolDirectory: Send + Sync {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<School>, EventSinkError>;
}

/// In-memory sink capturing every event. For tests and snapshots.
#[derive(Clone, Default)]
pub struct MemoryEventSink {
    entries: Arc<Mutex<Vec<NewEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events, in emission order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<NewEvent> {
        self.entries.lock().expect("event sink lock poisoned").clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("event sink lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().expect("event sink lock poisoned").clear();
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn create_event(&self, event: NewEvent) -> Result<(), EventSinkError> {
        self.entries
            .lock()
            .map_err(|_| EventSinkError::unavailable("event sink lock poisoned"))?
            .push(event);
        Ok(())
    }
}

/// Channel-backed sink forwarding events to an async consumer.
#[derive(Clone)]
pub struct ChannelEventSink {
    tx: flume::Sender<NewEvent>,
}

impl ChannelEventSink {
    /// Create a sink plus the receiving end to drain from.
    #[must_use]
    pub fn unbounded() -> (Self, flume::Receiver<NewEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    pub fn new(tx: flume::Sender<NewEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn create_event(&self, event: NewEvent) -> Result<(), EventSinkError> {
        self.tx
            .send_async(event)
            .await
            .map_err(|_| EventSinkError::unavailable("event channel receiver dropped"))
    }
}

/// Fixed in-memory school directory. For tests and small deployments.
#[derive(Clone, Default)]
pub struct StaticSchoolDirectory {
    schools: Vec<School>,
}

impl StaticSchoolDirectory {
    pub fn new(schools: Vec<School>) -> Self {
        Self { schools }
    }
}

#[async_trait]
impl SchoolDirectory for StaticSchoolDirectory {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<School>, EventSinkError> {
        Ok(self
            .schools
            .iter()
            .find(|s| s.external_id == external_id)
            .cloned())
    }
}
