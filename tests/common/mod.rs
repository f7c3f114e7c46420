#![allow(dead_code)]

//! Shared helpers for driving the property browser without a catalog

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use metahub_cli::api::{
    EntityDetails, MetadataProvider, OperationPermission, ResourceKind, TypeSchema,
};
use metahub_cli::notify::Notifier;
use metahub_cli::tui::apps::custom_properties::{CustomPropertiesApp, Msg, State};
use metahub_cli::tui::{App, Command};

/// Provider with canned responses and per-endpoint call counters
#[derive(Default)]
pub struct MockProvider {
    pub permission: Option<OperationPermission>,
    pub schema: Option<TypeSchema>,
    pub entity: Option<EntityDetails>,
    pub permission_calls: AtomicUsize,
    pub schema_calls: AtomicUsize,
    pub entity_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permission(mut self, permission: OperationPermission) -> Self {
        self.permission = Some(permission);
        self
    }

    pub fn with_schema(mut self, schema: TypeSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_entity(mut self, entity: EntityDetails) -> Self {
        self.entity = Some(entity);
        self
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn type_schema_by_name(&self, _entity_type: &str) -> Result<TypeSchema> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        self.schema
            .clone()
            .ok_or_else(|| anyhow!("schema fetch refused"))
    }

    async fn resource_permission(
        &self,
        _resource: ResourceKind,
        _name: &str,
    ) -> Result<OperationPermission> {
        self.permission_calls.fetch_add(1, Ordering::SeqCst);
        self.permission
            .ok_or_else(|| anyhow!("permission fetch refused"))
    }

    async fn entity_by_name(&self, _entity_type: &str, _fqn: &str) -> Result<EntityDetails> {
        self.entity_calls.fetch_add(1, Ordering::SeqCst);
        self.entity
            .clone()
            .ok_or_else(|| anyhow!("entity fetch refused"))
    }
}

/// Notifier that records every surfaced message
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}

/// Run a command tree, awaiting every async operation. Returns the messages
/// it produced and the topics it published, in order.
pub async fn drive(command: Command<Msg>) -> (Vec<Msg>, Vec<String>) {
    let mut queue = VecDeque::from([command]);
    let mut messages = Vec::new();
    let mut topics = Vec::new();
    while let Some(command) = queue.pop_front() {
        match command {
            Command::None | Command::Quit => {}
            Command::Batch(batch) => queue.extend(batch),
            Command::Perform(future) => messages.push(future.await),
            Command::Publish { topic, .. } => topics.push(topic),
        }
    }
    (messages, topics)
}

/// Feed a command's results back through update until nothing is pending.
/// Returns every topic published along the way.
pub async fn settle(state: &mut State, command: Command<Msg>) -> Vec<String> {
    let mut topics = Vec::new();
    let mut pending = vec![command];
    while let Some(command) = pending.pop() {
        let (messages, mut published) = drive(command).await;
        topics.append(&mut published);
        for msg in messages {
            pending.push(CustomPropertiesApp::update(state, msg));
        }
    }
    topics
}

pub fn entity_from_json(value: Value) -> EntityDetails {
    serde_json::from_value(value).expect("entity fixture should deserialize")
}

pub fn schema_from_json(value: Value) -> TypeSchema {
    serde_json::from_value(value).expect("schema fixture should deserialize")
}

pub fn view_permission() -> OperationPermission {
    OperationPermission {
        view_all: true,
        edit_all: true,
        ..Default::default()
    }
}
