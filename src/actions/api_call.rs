//! The `api_call` action handler.
//!
//! Resolves the call configuration against the effective state, dispatches
//! internally (handler registry) or externally (HTTP client) by `auth_type`,
//! applies the fallback policy on failure, and projects the response into a
//! state delta through `response_mapping`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::actions::ActionProcessor;
use crate::actions::config::ApiCallConfig;
use crate::actions::outcome::{ActionError, ActionOutcome};
use crate::paths::{get_path, set_path};
use crate::template::{resolve_and_prune, resolve_str};

impl ActionProcessor {
    /// Run one `api_call` action against the effective state.
    ///
    /// Failure of the underlying call recovers locally when
    /// `fallback_response` is configured (the fallback is used verbatim: no
    /// second resolution pass) and propagates as [`ActionError`] otherwise.
    pub(crate) async fn handle_api_call(
        &self,
        config: &ApiCallConfig,
        state: &Value,
    ) -> Result<ActionOutcome, ActionError> {
        // Endpoint is resolved but never pruned: an unresolved endpoint is a
        // configuration problem and should fail the call loudly, not turn
        // into a null.
        let endpoint = resolve_str(&config.endpoint, state);
        let body = config
            .body
            .as_ref()
            .map(|b| resolve_and_prune(b, state))
            .unwrap_or_else(empty_object);
        let params = config
            .query_params
            .as_ref()
            .map(|p| resolve_and_prune(p, state))
            .unwrap_or_else(empty_object);

        debug!(endpoint = %endpoint, auth_type = ?config.auth_type, "dispatching api_call");

        let call_result = if config.auth_type.is_internal() {
            match self.registry.get(&endpoint) {
                Some(handler) => handler.call(&body, &params).await.map_err(ActionError::from),
                None => Err(ActionError::UnknownEndpoint {
                    endpoint: endpoint.clone(),
                }),
            }
        } else {
            self.external
                .call(&endpoint, &body, &params)
                .await
                .map_err(ActionError::from)
        };

        match call_result {
            Ok(response) => Ok(ActionOutcome::Completed(project_response(
                &response,
                &config.response_mapping,
            ))),
            Err(error) => match &config.fallback_response {
                Some(fallback) => {
                    warn!(
                        endpoint = %endpoint,
                        error = %error,
                        "api_call failed, recovering with fallback_response"
                    );
                    Ok(ActionOutcome::Recovered(project_response(
                        fallback,
                        &config.response_mapping,
                    )))
                }
                None => Err(error),
            },
        }
    }
}

/// Apply a response mapping: each `(source_path, dest_path)` entry whose
/// source resolves inside the response becomes one write in the delta.
/// Absent sources skip their entry; that is data availability, not an error.
fn project_response(response: &Value, mapping: &Map<String, Value>) -> Value {
    let mut delta = empty_object();
    for (source_path, dest) in mapping {
        let Some(dest_path) = dest.as_str() else {
            continue;
        };
        if let Some(value) = get_path(response, source_path) {
            set_path(&mut delta, dest_path, value.clone());
        }
    }
    delta
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
