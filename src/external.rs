//! External API calls for `auth_type: external` actions.
//!
//! The engine never talks to the network directly; it goes through the
//! [`ExternalApi`] trait so tests and embedders can substitute their own
//! transport. [`HttpApi`] is the production implementation, a thin wrapper
//! over `reqwest` that posts the resolved body as JSON, attaches query
//! params, and surfaces transport and status failures as [`HandlerError`]s -
//! the same shape internal handler failures take, so the fallback policy in
//! [`crate::actions`] applies uniformly.

use std::time::Duration;

use async_trait::async_trait;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::registry::HandlerError;

/// Transport used for external `api_call` actions.
///
/// Cancellation and timeout policy live here, not in the engine; a timeout
/// surfaces as a generic [`HandlerError`] and follows the fallback rule. The
/// engine performs at most one attempt per action: implementations should
/// not retry.
#[async_trait]
pub trait ExternalApi: Send + Sync {
    async fn call(
        &self,
        endpoint: &str,
        body: &Value,
        params: &Value,
    ) -> Result<Value, HandlerError>;
}

/// Configuration error while building an [`HttpApi`].
#[derive(Debug, Error, Diagnostic)]
pub enum ExternalApiError {
    #[error("missing required environment variable {name}")]
    #[diagnostic(
        code(chatflow::external::missing_env),
        help("Set {name} or construct HttpApiConfig directly.")
    )]
    MissingEnv { name: &'static str },

    #[error("failed to build HTTP client: {source}")]
    #[diagnostic(code(chatflow::external::client))]
    Client {
        #[from]
        source: reqwest::Error,
    },
}

/// Settings for [`HttpApi`].
#[derive(Clone, Debug)]
pub struct HttpApiConfig {
    /// Prefix joined with the action's resolved endpoint path.
    pub base_url: String,
    /// Bearer credential attached to every request, when present.
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load settings from the environment (`.env` honored via dotenvy):
    /// `CHATFLOW_API_BASE_URL` (required), `CHATFLOW_API_TOKEN`,
    /// `CHATFLOW_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ExternalApiError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("CHATFLOW_API_BASE_URL")
            .map_err(|_| ExternalApiError::MissingEnv {
                name: "CHATFLOW_API_BASE_URL",
            })?;
        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var("CHATFLOW_API_TOKEN") {
            config.bearer_token = Some(token);
        }
        if let Some(secs) = std::env::var("CHATFLOW_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// `reqwest`-backed [`ExternalApi`].
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: reqwest::Client,
    config: HttpApiConfig,
}

impl HttpApi {
    pub fn new(config: HttpApiConfig) -> Result<Self, ExternalApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn url_for(&self, endpoint: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[async_trait]
impl ExternalApi for HttpApi {
    async fn call(
        &self,
        endpoint: &str,
        body: &Value,
        params: &Value,
    ) -> Result<Value, HandlerError> {
        let url = self.url_for(endpoint);
        let mut request = self.client.post(&url).query(&query_pairs(params));
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }
        if !body.is_null() {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| HandlerError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| HandlerError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        if text.is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Flatten a JSON mapping into query pairs. Null values are dropped (they are
/// pruned placeholders); scalars render bare, containers as compact JSON.
fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = params else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let rendered = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), rendered)
        })
        .collect()
}
