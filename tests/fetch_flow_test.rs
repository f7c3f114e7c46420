//! Permission gate, schema fetch, and update capability wiring

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use common::{
    drive, entity_from_json, schema_from_json, settle, view_permission, MockProvider,
    RecordingNotifier,
};
use serde_json::json;

use metahub_cli::api::{EntityDetails, ExtensionMap, OperationPermission};
use metahub_cli::tui::apps::custom_properties::{
    CustomPropertiesApp, ExtensionUpdateHandler, Msg, State, UpdateFuture,
};
use metahub_cli::tui::{App, Command, Resource};

fn orders_entity() -> EntityDetails {
    entity_from_json(json!({
        "id": "8f8e9d3a-1c2b-4d5e-9f60-7a8b9c0d1e2f",
        "name": "orders",
        "fullyQualifiedName": "sales.orders",
        "version": 1.3,
        "extension": { "tier": "Gold", "owner": "data-eng" }
    }))
}

fn table_schema() -> metahub_cli::api::TypeSchema {
    schema_from_json(json!({
        "name": "table",
        "customProperties": [
            { "name": "tier", "propertyType": { "name": "string" } },
            { "name": "owner", "propertyType": { "name": "string" } }
        ]
    }))
}

fn browsing_state(provider: Arc<MockProvider>, notifier: Arc<RecordingNotifier>) -> State {
    let mut state = State::default();
    state.entity_type = "table".to_string();
    state.fqn = "sales.orders".to_string();
    state.has_view_access = true;
    state.provider = provider;
    state.notifier = notifier;
    state
}

#[tokio::test]
async fn test_view_grant_chains_exactly_one_schema_fetch() {
    let provider = Arc::new(
        MockProvider::new()
            .with_permission(OperationPermission {
                view_basic: true,
                ..Default::default()
            })
            .with_schema(table_schema())
            .with_entity(orders_entity()),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut state = browsing_state(provider.clone(), notifier.clone());

    let command = CustomPropertiesApp::update(&mut state, Msg::Refresh);
    assert!(state.loading);
    settle(&mut state, command).await;

    assert_eq!(provider.permission_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.schema_calls.load(Ordering::SeqCst), 1);
    assert!(!state.loading);
    assert_eq!(state.schema.custom_properties.len(), 2);
    assert!(state.entity.is_success());
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_denied_view_never_fetches_schema() {
    let provider = Arc::new(
        MockProvider::new()
            .with_permission(OperationPermission::default())
            .with_schema(table_schema())
            .with_entity(orders_entity()),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut state = browsing_state(provider.clone(), notifier.clone());

    let command = CustomPropertiesApp::update(&mut state, Msg::Refresh);
    settle(&mut state, command).await;

    assert_eq!(provider.schema_calls.load(Ordering::SeqCst), 0);
    assert!(!state.loading);
    assert!(state.schema.custom_properties.is_empty());
    // The denial itself is a successful fetch, nothing to report
    assert_eq!(notifier.count(), 0);
    assert!(state.type_permission.is_some());
}

#[tokio::test]
async fn test_permission_failure_is_reported_and_clears_loading() {
    let provider = Arc::new(MockProvider::new().with_entity(orders_entity()));
    let notifier = Arc::new(RecordingNotifier::new());
    let mut state = browsing_state(provider.clone(), notifier.clone());

    let command = CustomPropertiesApp::update(&mut state, Msg::Refresh);
    settle(&mut state, command).await;

    assert!(!state.loading);
    assert!(state.type_permission.is_none());
    assert_eq!(provider.schema_calls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_schema_failure_keeps_previous_declarations() {
    let provider = Arc::new(
        MockProvider::new()
            .with_permission(view_permission())
            .with_entity(orders_entity()),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut state = browsing_state(provider.clone(), notifier.clone());
    state.schema = table_schema();

    let command = CustomPropertiesApp::update(&mut state, Msg::Refresh);
    settle(&mut state, command).await;

    // Fetch failed, but the table keeps rendering what it had
    assert_eq!(state.schema.custom_properties.len(), 2);
    assert!(!state.loading);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_results_from_a_superseded_wave_are_dropped() {
    let provider = Arc::new(
        MockProvider::new()
            .with_permission(view_permission())
            .with_schema(table_schema())
            .with_entity(orders_entity()),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut state = browsing_state(provider.clone(), notifier.clone());

    let first = CustomPropertiesApp::update(&mut state, Msg::Refresh);
    let (stale_messages, _) = drive(first).await;

    // A second wave starts before the first delivers
    let second = CustomPropertiesApp::update(&mut state, Msg::Refresh);

    for msg in stale_messages {
        let command = CustomPropertiesApp::update(&mut state, msg);
        assert!(matches!(command, Command::None));
    }
    assert!(state.type_permission.is_none());
    assert!(state.entity.is_loading());
    assert!(state.loading);
    assert_eq!(provider.schema_calls.load(Ordering::SeqCst), 0);

    // The live wave still lands normally
    settle(&mut state, second).await;
    assert!(state.entity.is_success());
    assert!(!state.loading);
    assert_eq!(provider.schema_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_clear_key_flows_through_handler_and_publishes() {
    let captured: Arc<Mutex<Option<ExtensionMap>>> = Arc::new(Mutex::new(None));
    let captured_in = captured.clone();
    let handler: ExtensionUpdateHandler = Arc::new(move |entity: EntityDetails| -> UpdateFuture {
        let captured = captured_in.clone();
        Box::pin(async move {
            *captured.lock().unwrap() = entity.extension.clone();
            Ok(EntityDetails {
                version: Some(1.4),
                ..entity
            })
        })
    });

    let mut state = State::default();
    state.has_edit_access = true;
    state.schema = table_schema();
    state.entity = Resource::Success(orders_entity());
    state.selected_row = 0;
    state.on_update = Some(handler);

    let command = CustomPropertiesApp::update(&mut state, Msg::ClearSelectedValue);
    let (messages, _) = drive(command).await;

    // The handler received the extension without the cleared key
    let sent = captured.lock().unwrap().clone().unwrap();
    assert!(!sent.contains_key("tier"));
    assert!(sent.contains_key("owner"));

    // Settling the update announces the persisted record
    let mut published = Vec::new();
    let mut adopted = None;
    for msg in messages {
        if let Msg::UpdateSettled(Ok(entity)) = &msg {
            adopted = Some(entity.clone());
        }
        let command = CustomPropertiesApp::update(&mut state, msg);
        let (_, mut topics) = drive(command).await;
        published.append(&mut topics);
    }
    assert_eq!(published, vec!["entity:updated".to_string()]);

    // The runtime echoes the announcement back as a push
    CustomPropertiesApp::update(&mut state, Msg::EntityPushed(adopted.unwrap()));
    let entity = state.entity.success().unwrap();
    assert_eq!(entity.version, Some(1.4));
    assert!(!entity.extension.as_ref().unwrap().contains_key("tier"));
}

#[tokio::test]
async fn test_failed_update_leaves_entity_untouched() {
    let handler: ExtensionUpdateHandler = Arc::new(|_entity: EntityDetails| -> UpdateFuture {
        Box::pin(async { Err("patch rejected".to_string()) })
    });

    let notifier = Arc::new(RecordingNotifier::new());
    let mut state = State::default();
    state.has_edit_access = true;
    state.schema = table_schema();
    state.entity = Resource::Success(orders_entity());
    state.notifier = notifier.clone();
    state.on_update = Some(handler);

    let command = CustomPropertiesApp::update(&mut state, Msg::ClearSelectedValue);
    let topics = settle(&mut state, command).await;

    assert!(topics.is_empty());
    let entity = state.entity.success().unwrap();
    assert_eq!(entity.version, Some(1.3));
    assert!(entity.extension.as_ref().unwrap().contains_key("tier"));
    // Surfacing the failure is the handler's job, not the browser's
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_clear_without_a_handler_is_a_no_op() {
    let mut state = State::default();
    state.has_edit_access = true;
    state.schema = table_schema();
    state.entity = Resource::Success(orders_entity());

    let command = CustomPropertiesApp::update(&mut state, Msg::ClearSelectedValue);
    assert!(matches!(command, Command::None));
}
