mod common;

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use chatflow::actions::{ActionContext, ActionProcessor};
use chatflow::events::{MemoryEventSink, School, StaticSchoolDirectory};
use chatflow::registry::HandlerRegistry;
use common::{FailingSink, make_action_node, make_session};

fn processor() -> ActionProcessor {
    ActionProcessor::internal_only(HandlerRegistry::new())
}

#[tokio::test]
async fn basic_emit_creates_one_deferred_commit_event() {
    let sink = Arc::new(MemoryEventSink::new());
    let ctx = ActionContext::new().with_events(sink.clone());

    let session = make_session(json!({}));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{
                "type": "emit_event",
                "title": "Huey: Chat started",
                "description": "User started a chat",
                "info": {"chatbot": "Huey"}
            }]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;

    assert!(result.success);
    assert_eq!(result.variables, json!({}));

    let events = sink.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title.as_deref(), Some("Huey: Chat started"));
    assert_eq!(events[0].description.as_deref(), Some("User started a chat"));
    assert_eq!(events[0].info, json!({"chatbot": "Huey"}));
    assert!(!events[0].commit);
    assert!(events[0].school.is_none());
}

#[tokio::test]
async fn emit_resolves_templates_in_title_and_info() {
    let sink = Arc::new(MemoryEventSink::new());
    let ctx = ActionContext::new().with_events(sink.clone());

    let session = make_session(json!({"user": {"age": 9}}));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{
                "type": "emit_event",
                "title": "Age: {{user.age}}",
                "info": {"age": "{{user.age}}", "missing": "{{user.grade}}"}
            }]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;

    assert!(result.success);
    let events = sink.snapshot();
    assert_eq!(events[0].title.as_deref(), Some("Age: 9"));
    // Resolved fields pass through; unresolved info fields prune to null.
    assert_eq!(events[0].info, json!({"age": "9", "missing": null}));
}

#[tokio::test]
async fn unresolvable_title_and_description_are_pruned() {
    let sink = Arc::new(MemoryEventSink::new());
    let ctx = ActionContext::new().with_events(sink.clone());

    let session = make_session(json!({}));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{
                "type": "emit_event",
                "title": "Chat started by {{user.name}}",
                "description": "{{user.name}} said hello",
                "info": {"chatbot": "Huey"}
            }]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;

    assert!(result.success);
    let events = sink.snapshot();
    assert_eq!(events.len(), 1);
    // Leftover marker syntax never reaches a stored record.
    assert_eq!(events[0].title, None);
    assert_eq!(events[0].description, None);
    assert_eq!(events[0].info, json!({"chatbot": "Huey"}));
}

#[tokio::test]
async fn iterate_over_emits_one_event_per_item() {
    let sink = Arc::new(MemoryEventSink::new());
    let ctx = ActionContext::new().with_events(sink.clone());

    let session = make_session(json!({
        "temp": {
            "book_results": [
                {"isbn": "111", "title": "Book A"},
                {"isbn": "222", "title": "Book B"}
            ]
        }
    }));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{
                "type": "emit_event",
                "title": "Huey: Book reviewed",
                "iterate_over": "temp.book_results",
                "item_alias": "book",
                "info": {"isbn": "{{temp.book.isbn}}"}
            }]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;

    assert!(result.success);
    let events = sink.snapshot();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].info, json!({"isbn": "111"}));
    assert_eq!(events[1].info, json!({"isbn": "222"}));
}

#[tokio::test]
async fn iterate_over_missing_or_non_sequence_is_a_noop() {
    let sink = Arc::new(MemoryEventSink::new());
    let ctx = ActionContext::new().with_events(sink.clone());

    let session = make_session(json!({"temp": {"not_a_list": "scalar"}}));
    for path in ["temp.not_a_list", "temp.absent"] {
        let node = make_action_node(
            &session,
            json!({
                "actions": [{
                    "type": "emit_event",
                    "title": "Never emitted",
                    "iterate_over": path,
                    "item_alias": "item"
                }]
            }),
        );
        let result = processor().process(&node, &session, &ctx).await;
        assert!(result.success);
    }
    assert!(sink.is_empty());
}

#[tokio::test]
async fn missing_sink_skips_emission_and_succeeds() {
    // Context with no event sink at all: the best-effort short-circuit.
    let ctx = ActionContext::default();

    let session = make_session(json!({}));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{"type": "emit_event", "title": "Test", "info": {}}]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;
    assert!(result.success);
}

#[tokio::test]
async fn sink_failure_is_swallowed() {
    let ctx = ActionContext::new().with_events(Arc::new(FailingSink));

    let session = make_session(json!({}));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{"type": "emit_event", "title": "Huey: Chat started", "info": {}}]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;
    assert!(result.success);
}

#[tokio::test]
async fn emit_failure_does_not_abort_following_actions() {
    let mut registry = HandlerRegistry::new();
    registry.register_fn("/v1/after", |_body, _params| async move {
        Ok(json!({"ok": true}))
    });
    let processor = ActionProcessor::internal_only(registry);
    let ctx = ActionContext::new().with_events(Arc::new(FailingSink));

    let session = make_session(json!({}));
    let node = make_action_node(
        &session,
        json!({
            "actions": [
                {"type": "emit_event", "title": "Dropped"},
                {
                    "type": "api_call",
                    "config": {
                        "endpoint": "/v1/after",
                        "auth_type": "internal",
                        "response_mapping": {"ok": "temp.ok"}
                    }
                }
            ]
        }),
    );

    let result = processor.process(&node, &session, &ctx).await;

    assert!(result.success);
    assert_eq!(result.variables, json!({"temp": {"ok": true}}));
}

#[tokio::test]
async fn resolvable_school_is_attached() {
    let school = School {
        id: Uuid::new_v4(),
        external_id: "84a5ade6-7f75-4155-831a-1d84c6256fc3".to_string(),
        name: Some("Test Primary".to_string()),
    };
    let sink = Arc::new(MemoryEventSink::new());
    let ctx = ActionContext::new()
        .with_events(sink.clone())
        .with_schools(Arc::new(StaticSchoolDirectory::new(vec![school.clone()])));

    let session = make_session(json!({
        "context": {"school_wriveted_id": "84a5ade6-7f75-4155-831a-1d84c6256fc3"}
    }));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{"type": "emit_event", "title": "Huey: Test", "info": {}}]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;

    assert!(result.success);
    let events = sink.snapshot();
    assert_eq!(events[0].school.as_ref(), Some(&school));
}

#[tokio::test]
async fn unresolvable_school_emits_without_attachment() {
    let sink = Arc::new(MemoryEventSink::new());
    let ctx = ActionContext::new()
        .with_events(sink.clone())
        .with_schools(Arc::new(StaticSchoolDirectory::default()));

    let session = make_session(json!({"context": {"school_wriveted_id": "not-a-known-school"}}));
    let node = make_action_node(
        &session,
        json!({
            "actions": [{"type": "emit_event", "title": "Huey: Test", "info": {}}]
        }),
    );

    let result = processor().process(&node, &session, &ctx).await;

    assert!(result.success);
    let events = sink.snapshot();
    assert_eq!(events.len(), 1);
    assert!(events[0].school.is_none());
}
