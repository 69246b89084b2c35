//! Internal endpoint handler registry.
//!
//! `api_call` actions with `auth_type: internal` do not leave the process:
//! they dispatch through a registry mapping endpoint paths to handler
//! implementations. The registry is built once at engine construction and
//! injected; there is no global mutable handler table, and the engine never
//! mutates the registry during a run.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

/// Failure surfaced by an internal handler or the external HTTP client.
///
/// The action layer treats every variant the same way: recover through
/// `fallback_response` when one is configured, otherwise propagate and fail
/// the node (see [`crate::actions`]).
#[derive(Debug, Error, Diagnostic)]
pub enum HandlerError {
    /// The handler rejected its input.
    #[error("invalid handler input: {message}")]
    #[diagnostic(code(chatflow::registry::invalid_input))]
    InvalidInput { message: String },

    /// Transport-level failure reaching an external endpoint.
    #[error("transport error calling {endpoint}: {message}")]
    #[diagnostic(code(chatflow::registry::transport))]
    Transport { endpoint: String, message: String },

    /// Non-success HTTP status from an external endpoint.
    #[error("endpoint {endpoint} returned status {status}")]
    #[diagnostic(code(chatflow::registry::status))]
    Status { endpoint: String, status: u16 },

    /// The handler ran but its response could not be decoded.
    #[error("undecodable handler response: {source}")]
    #[diagnostic(code(chatflow::registry::decode))]
    Decode {
        #[from]
        source: serde_json::Error,
    },

    /// Anything else the handler wants to surface.
    #[error("handler failed: {message}")]
    #[diagnostic(code(chatflow::registry::other))]
    Other { message: String },
}

impl HandlerError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// An internal endpoint implementation.
///
/// Handlers receive the resolved-and-pruned request body and query params and
/// return a response mapping for `response_mapping` projection. Handlers are
/// constructed already bound to whatever datastore or service they need.
#[async_trait]
pub trait InternalHandler: Send + Sync {
    async fn call(&self, body: &Value, params: &Value) -> Result<Value, HandlerError>;
}

/// Immutable endpoint-path → handler table.
///
/// # Examples
///
/// ```rust
/// use chatflow::registry::HandlerRegistry;
/// use serde_json::json;
///
/// let mut registry = HandlerRegistry::new();
/// registry.register_fn("/v1/recommend", |_body, _params| async move {
///     Ok(json!({"books": [], "count": 0}))
/// });
/// assert!(registry.get("/v1/recommend").is_some());
/// assert!(registry.get("/v1/unknown").is_none());
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: FxHashMap<String, Arc<dyn InternalHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an endpoint path, replacing any previous one.
    pub fn register(&mut self, endpoint: impl Into<String>, handler: Arc<dyn InternalHandler>) {
        self.handlers.insert(endpoint.into(), handler);
    }

    /// Register an async closure as a handler.
    pub fn register_fn<F, Fut>(&mut self, endpoint: impl Into<String>, f: F)
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.register(endpoint, Arc::new(FnHandler { f }));
    }

    #[must_use]
    pub fn get(&self, endpoint: &str) -> Option<&Arc<dyn InternalHandler>> {
        self.handlers.get(endpoint)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut endpoints: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        endpoints.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("endpoints", &endpoints)
            .finish()
    }
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> InternalHandler for FnHandler<F>
where
    F: Fn(Value, Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn call(&self, body: &Value, params: &Value) -> Result<Value, HandlerError> {
        (self.f)(body.clone(), params.clone()).await
    }
}
