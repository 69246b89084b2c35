//! The `emit_event` action handler.
//!
//! Emission is strictly best-effort: this handler has no failure variant
//! visible to the dispatcher. A missing event sink skips emission entirely,
//! sink failures are logged and swallowed, and the action never contributes
//! to the state delta.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::actions::config::EmitEventConfig;
use crate::actions::{ActionContext, ActionProcessor};
use crate::events::{EventSink, NewEvent};
use crate::paths::{get_path, set_path};
use crate::template::{prune_unresolved, resolve_and_prune, resolve_str};

/// State path where a contextual school external identifier lives, when the
/// flow has one.
const SCHOOL_ID_PATH: &str = "context.school_wriveted_id";

/// Default iteration binding name when `item_alias` is not authored.
const DEFAULT_ITEM_ALIAS: &str = "item";

impl ActionProcessor {
    /// Run one `emit_event` action. Infallible by contract.
    pub(crate) async fn handle_emit_event(
        &self,
        config: &EmitEventConfig,
        state: &Value,
        ctx: &ActionContext,
    ) {
        let Some(sink) = &ctx.events else {
            debug!(title = %config.title, "no event sink in context, skipping emit_event");
            return;
        };

        match &config.iterate_over {
            Some(path) => {
                // Absent path or non-sequence value means zero iterations,
                // not an error.
                let items = get_path(state, path)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let alias = config.item_alias.as_deref().unwrap_or(DEFAULT_ITEM_ALIAS);
                for item in items {
                    let mut scoped = state.clone();
                    set_path(&mut scoped, &format!("temp.{alias}"), item);
                    self.emit_one(sink.as_ref(), ctx, config, &scoped).await;
                }
            }
            None => self.emit_one(sink.as_ref(), ctx, config, state).await,
        }
    }

    /// Resolve and emit a single event against `state`, swallowing failures.
    async fn emit_one(
        &self,
        sink: &dyn EventSink,
        ctx: &ActionContext,
        config: &EmitEventConfig,
        state: &Value,
    ) {
        // Title, description, and info all follow the resolve-then-prune
        // pipeline; an unresolved marker must never reach a stored record.
        let title = prune_field(&config.title, state);
        let description = config
            .description
            .as_deref()
            .and_then(|d| prune_field(d, state));
        let info = config
            .info
            .as_ref()
            .map(|i| resolve_and_prune(i, state))
            .unwrap_or_else(|| Value::Object(Map::new()));
        let school = self.resolve_school(ctx, state).await;

        let event = NewEvent {
            title,
            description,
            info,
            school,
            commit: false,
            created_at: chrono::Utc::now(),
        };

        if let Err(error) = sink.create_event(event).await {
            warn!(title = %config.title, error = %error, "emit_event failed, continuing");
        }
    }

    /// Look up the contextual school when state carries its external id.
    /// Misses and lookup failures both yield `None`; failures are logged.
    async fn resolve_school(
        &self,
        ctx: &ActionContext,
        state: &Value,
    ) -> Option<crate::events::School> {
        let directory = ctx.schools.as_ref()?;
        let external_id = get_path(state, SCHOOL_ID_PATH)?.as_str()?;

        match directory.find_by_external_id(external_id).await {
            Ok(found) => found,
            Err(error) => {
                warn!(school_id = %external_id, error = %error, "school lookup failed");
                None
            }
        }
    }
}

/// Resolve one string field and prune it: an unresolved marker collapses the
/// whole field to `None`.
fn prune_field(template: &str, state: &Value) -> Option<String> {
    match prune_unresolved(Value::String(resolve_str(template, state))) {
        Value::String(s) => Some(s),
        _ => None,
    }
}
