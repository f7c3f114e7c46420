//! Custom property viewer for a single catalog entity.
//!
//! Fetches the entity's type permission, then (when view access is granted)
//! the type schema, and renders the entity's extension values against the
//! declared properties. A version comparison flag switches the table to the
//! historical rendition resolved from the entity's change description.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use crossterm::event::KeyCode;
use once_cell::sync::OnceCell;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::api::{
    format_value, EntityDetails, ExtensionMap, MetadataProvider, OperationPermission,
    PropertyDefinition, ResourceKind, TypeSchema,
};
use crate::notify::{LogNotifier, Notifier};
use crate::tui::element::{ColumnBuilder, RowBuilder};
use crate::tui::{App, Command, Element, LayoutConstraint, Resource, Subscription, Theme};
use crate::versioning::{DiffCache, ExtensionDiff};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Event bus topics this app publishes and listens on
pub mod topics {
    /// Carries the persisted entity record after an extension update settles
    pub const ENTITY_UPDATED: &str = "entity:updated";
}

/// Future returned by an extension update handler
pub type UpdateFuture = Pin<Box<dyn Future<Output = std::result::Result<EntityDetails, String>> + Send>>;

/// Capability injected by the launcher: takes the entity with its replacement
/// extension already merged in, persists it, and resolves to the stored record.
pub type ExtensionUpdateHandler = Arc<dyn Fn(EntityDetails) -> UpdateFuture + Send + Sync>;

/// Everything the launcher wires into the app before the runtime starts
#[derive(Clone)]
pub struct LaunchParams {
    pub entity_type: String,
    pub fqn: String,
    pub catalog_name: String,
    pub has_view_access: bool,
    pub has_edit_access: bool,
    pub provider: Arc<dyn MetadataProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub on_update: Option<ExtensionUpdateHandler>,
}

static LAUNCH: OnceCell<LaunchParams> = OnceCell::new();

/// Install launch parameters. Must be called before the runtime constructs
/// the app; a second call is ignored.
pub fn configure_launch(params: LaunchParams) {
    if LAUNCH.set(params).is_err() {
        log::warn!("Custom properties launch parameters already configured, ignoring");
    }
}

/// Provider used before launch wiring happens. Every call fails.
struct UnconfiguredProvider;

#[async_trait]
impl MetadataProvider for UnconfiguredProvider {
    async fn type_schema_by_name(&self, _entity_type: &str) -> Result<TypeSchema> {
        bail!("No catalog configured")
    }

    async fn resource_permission(
        &self,
        _resource: ResourceKind,
        _name: &str,
    ) -> Result<OperationPermission> {
        bail!("No catalog configured")
    }

    async fn entity_by_name(&self, _entity_type: &str, _fqn: &str) -> Result<EntityDetails> {
        bail!("No catalog configured")
    }
}

/// What the property surface shows. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// A fetch for permission or schema is in flight
    Loading,
    /// Caller lacks view access to the entity's custom properties
    Forbidden,
    /// The type declares properties: render the schema-driven table
    SchemaTable,
    /// No declarations, but the entity carries an extension object
    RawExtensionTable,
    /// Nothing to show; invite the caller to declare properties
    EmptyPlaceholder,
}

/// Total mapping from observable state to display mode.
///
/// The order of the checks is the priority order: loading wins over
/// everything, and permission wins over content. An extension that is
/// present but empty still selects the raw table.
pub fn display_mode(
    loading: bool,
    has_view_access: bool,
    schema: &TypeSchema,
    extension: Option<&ExtensionMap>,
) -> DisplayMode {
    if loading {
        DisplayMode::Loading
    } else if !has_view_access {
        DisplayMode::Forbidden
    } else if !schema.custom_properties.is_empty() {
        DisplayMode::SchemaTable
    } else if extension.is_some() {
        DisplayMode::RawExtensionTable
    } else {
        DisplayMode::EmptyPlaceholder
    }
}

pub struct State {
    pub entity_type: String,
    pub fqn: String,
    pub catalog_name: String,
    pub has_view_access: bool,
    pub has_edit_access: bool,
    pub version_view: bool,

    pub entity: Resource<EntityDetails>,
    pub type_permission: Option<OperationPermission>,
    pub schema: TypeSchema,
    /// Covers the permission fetch and the schema fetch it may chain into
    pub loading: bool,
    /// Bumped on every refresh wave; stale fetch results are discarded
    pub generation: u64,
    pub selected_row: usize,
    pub spinner_frame: usize,
    pub diff_cache: DiffCache,

    pub provider: Arc<dyn MetadataProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub on_update: Option<ExtensionUpdateHandler>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            entity_type: String::new(),
            fqn: String::new(),
            catalog_name: String::new(),
            has_view_access: false,
            has_edit_access: false,
            version_view: false,
            entity: Resource::NotAsked,
            type_permission: None,
            schema: TypeSchema::default(),
            loading: false,
            generation: 0,
            selected_row: 0,
            spinner_frame: 0,
            diff_cache: DiffCache::new(),
            provider: Arc::new(UnconfiguredProvider),
            notifier: Arc::new(LogNotifier),
            on_update: None,
        }
    }
}

#[derive(Clone)]
pub enum Msg {
    Tick,
    Quit,
    Refresh,
    ToggleVersionView,
    RowUp,
    RowDown,
    ClearSelectedValue,
    EntityLoaded(u64, std::result::Result<EntityDetails, String>),
    PermissionLoaded(u64, std::result::Result<OperationPermission, String>),
    SchemaLoaded(u64, std::result::Result<TypeSchema, String>),
    UpdateSettled(std::result::Result<EntityDetails, String>),
    EntityPushed(EntityDetails),
}

pub struct CustomPropertiesApp;

impl App for CustomPropertiesApp {
    type State = State;
    type Msg = Msg;

    fn init() -> (State, Command<Msg>) {
        let Some(params) = LAUNCH.get() else {
            log::warn!("Custom properties app started without launch parameters");
            return (State::default(), Command::None);
        };

        let mut state = State::default();
        state.entity_type = params.entity_type.clone();
        state.fqn = params.fqn.clone();
        state.catalog_name = params.catalog_name.clone();
        state.has_view_access = params.has_view_access;
        state.has_edit_access = params.has_edit_access;
        state.provider = params.provider.clone();
        state.notifier = params.notifier.clone();
        state.on_update = params.on_update.clone();

        let command = begin_refresh(&mut state);
        (state, command)
    }

    fn update(state: &mut State, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Tick => {
                if state.loading || state.entity.is_loading() {
                    state.spinner_frame = (state.spinner_frame + 1) % SPINNER_FRAMES.len();
                }
                Command::None
            }

            Msg::Quit => Command::Quit,

            Msg::Refresh => begin_refresh(state),

            Msg::ToggleVersionView => {
                state.version_view = !state.version_view;
                clamp_selection(state);
                Command::None
            }

            Msg::RowUp => {
                state.selected_row = state.selected_row.saturating_sub(1);
                Command::None
            }

            Msg::RowDown => {
                let last = visible_row_count(state).saturating_sub(1);
                state.selected_row = (state.selected_row + 1).min(last);
                Command::None
            }

            Msg::ClearSelectedValue => clear_selected_value(state),

            Msg::EntityLoaded(generation, result) => {
                if generation != state.generation {
                    log::debug!(
                        "Discarding stale entity result (generation {} != {})",
                        generation,
                        state.generation
                    );
                    return Command::None;
                }
                match result {
                    Ok(entity) => {
                        log::debug!("Loaded entity '{}'", entity.display_title());
                        state.entity = Resource::Success(entity);
                        clamp_selection(state);
                    }
                    Err(message) => {
                        log::error!("Entity fetch failed: {}", message);
                        state.entity = Resource::Failure(message);
                    }
                }
                Command::None
            }

            Msg::PermissionLoaded(generation, result) => {
                if generation != state.generation {
                    log::debug!(
                        "Discarding stale permission result (generation {} != {})",
                        generation,
                        state.generation
                    );
                    return Command::None;
                }
                state.loading = false;
                match result {
                    Ok(permission) => {
                        let can_view = permission.can_view();
                        state.type_permission = Some(permission);
                        if can_view && !state.entity_type.is_empty() {
                            return load_schema(state);
                        }
                        Command::None
                    }
                    Err(message) => {
                        state
                            .notifier
                            .error(format!("Failed to fetch type permissions: {}", message));
                        Command::None
                    }
                }
            }

            Msg::SchemaLoaded(generation, result) => {
                if generation != state.generation {
                    log::debug!(
                        "Discarding stale schema result (generation {} != {})",
                        generation,
                        state.generation
                    );
                    return Command::None;
                }
                state.loading = false;
                match result {
                    Ok(schema) => {
                        log::debug!(
                            "Loaded type '{}' with {} custom properties",
                            schema.name,
                            schema.custom_properties.len()
                        );
                        state.schema = schema;
                        clamp_selection(state);
                    }
                    Err(message) => {
                        // Keep whatever schema we already had
                        state
                            .notifier
                            .error(format!("Failed to fetch type schema: {}", message));
                    }
                }
                Command::None
            }

            Msg::UpdateSettled(result) => match result {
                Ok(entity) => Command::publish(topics::ENTITY_UPDATED, &entity),
                // The update handler surfaces its own failures
                Err(_) => Command::None,
            },

            Msg::EntityPushed(entity) => {
                log::debug!("Adopting pushed entity '{}'", entity.display_title());
                state.entity = Resource::Success(entity);
                clamp_selection(state);
                Command::None
            }
        }
    }

    fn view(state: &mut State, theme: &Theme) -> Element<Msg> {
        let title = match state.entity.success() {
            Some(entity) => format!("Custom Properties: {}", entity.display_title()),
            None => "Custom Properties".to_string(),
        };

        let body: Element<Msg> = match &state.entity {
            Resource::Failure(message) => failure_body(message, theme),
            Resource::Success(entity) => {
                let mode = display_mode(
                    state.loading,
                    state.has_view_access,
                    &state.schema,
                    entity.extension.as_ref(),
                );
                match mode {
                    DisplayMode::Loading => loading_body(state.spinner_frame, theme),
                    DisplayMode::Forbidden => forbidden_body(theme),
                    DisplayMode::SchemaTable => {
                        let diff = state.diff_cache.resolve(entity, state.version_view);
                        schema_table(
                            &state.schema,
                            diff,
                            state.selected_row,
                            state.version_view,
                            theme,
                        )
                    }
                    DisplayMode::RawExtensionTable => {
                        let diff = state.diff_cache.resolve(entity, state.version_view);
                        raw_extension_table(diff, state.selected_row, state.version_view, theme)
                    }
                    DisplayMode::EmptyPlaceholder => {
                        empty_body(&state.entity_type, state.has_edit_access, theme)
                    }
                }
            }
            _ => loading_body(state.spinner_frame, theme),
        };

        Element::panel(Element::container(body).padding(1).build())
            .title(title)
            .build()
    }

    fn subscriptions(_state: &State) -> Vec<Subscription<Msg>> {
        vec![
            Subscription::keyboard(KeyCode::Char('q'), "Quit", Msg::Quit),
            Subscription::keyboard(KeyCode::Char('r'), "Refresh", Msg::Refresh),
            Subscription::keyboard(KeyCode::Char('v'), "Toggle version view", Msg::ToggleVersionView),
            Subscription::keyboard(KeyCode::Up, "Previous property", Msg::RowUp),
            Subscription::keyboard(KeyCode::Down, "Next property", Msg::RowDown),
            Subscription::keyboard(KeyCode::Char('x'), "Clear property value", Msg::ClearSelectedValue),
            Subscription::timer(Duration::from_millis(120), Msg::Tick),
            Subscription::subscribe(topics::ENTITY_UPDATED, |data| {
                serde_json::from_value::<EntityDetails>(data)
                    .ok()
                    .map(Msg::EntityPushed)
            }),
        ]
    }

    fn title() -> &'static str {
        "Custom Properties"
    }

    fn status(state: &State, theme: &Theme) -> Option<Line<'static>> {
        let mut spans = vec![Span::styled(
            state.catalog_name.clone(),
            Style::default().fg(theme.blue),
        )];
        if let Some(version) = state.entity.success().and_then(|e| e.version) {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("v{:.1}", version),
                Style::default().fg(theme.overlay1),
            ));
        }
        if state.version_view {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                "version view".to_string(),
                Style::default().fg(theme.mauve),
            ));
        }
        if state.loading || state.entity.is_loading() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                "fetching".to_string(),
                Style::default().fg(theme.yellow),
            ));
        }
        Some(Line::from(spans))
    }
}

/// Start a fresh fetch wave: entity bootstrap plus the permission gate.
/// Results from earlier waves no longer match the generation and get dropped.
fn begin_refresh(state: &mut State) -> Command<Msg> {
    state.generation += 1;
    state.entity = Resource::Loading;
    Command::batch(vec![load_entity(state), load_permission(state)])
}

fn load_entity(state: &State) -> Command<Msg> {
    let generation = state.generation;
    let provider = state.provider.clone();
    let entity_type = state.entity_type.clone();
    let fqn = state.fqn.clone();
    log::debug!("Fetching entity '{}' of type '{}'", fqn, entity_type);
    Command::perform(
        async move {
            provider
                .entity_by_name(&entity_type, &fqn)
                .await
                .map_err(|e| e.to_string())
        },
        move |result| Msg::EntityLoaded(generation, result),
    )
}

/// Permission fetch fires unconditionally, even for an empty type name.
/// Only the schema fetch behind it is guarded.
fn load_permission(state: &mut State) -> Command<Msg> {
    state.loading = true;
    let generation = state.generation;
    let provider = state.provider.clone();
    let entity_type = state.entity_type.clone();
    log::debug!("Fetching type permission for '{}'", entity_type);
    Command::perform(
        async move {
            provider
                .resource_permission(ResourceKind::Type, &entity_type)
                .await
                .map_err(|e| e.to_string())
        },
        move |result| Msg::PermissionLoaded(generation, result),
    )
}

fn load_schema(state: &mut State) -> Command<Msg> {
    state.loading = true;
    let generation = state.generation;
    let provider = state.provider.clone();
    let entity_type = state.entity_type.clone();
    log::debug!("Fetching type schema for '{}'", entity_type);
    Command::perform(
        async move {
            provider
                .type_schema_by_name(&entity_type)
                .await
                .map_err(|e| e.to_string())
        },
        move |result| Msg::SchemaLoaded(generation, result),
    )
}

/// Merge the current entity's identity with a replacement extension map and
/// hand it to the injected update handler. No-op when no handler was wired
/// or no entity is loaded.
pub fn request_extension_update(state: &State, replacement: ExtensionMap) -> Command<Msg> {
    let Some(handler) = state.on_update.clone() else {
        log::debug!("Extension update requested without a handler, ignoring");
        return Command::None;
    };
    let Some(entity) = state.entity.success() else {
        return Command::None;
    };
    let updated = entity.with_extension(replacement);
    Command::perform(async move { handler(updated).await }, Msg::UpdateSettled)
}

/// Drop the selected property's value from the extension and persist the
/// result. Only available in the plain view with edit access.
fn clear_selected_value(state: &State) -> Command<Msg> {
    if state.version_view || !state.has_edit_access {
        return Command::None;
    }
    let Some(entity) = state.entity.success() else {
        return Command::None;
    };
    let Some(extension) = entity.extension.as_ref() else {
        return Command::None;
    };
    let Some(name) = selected_property_name(state) else {
        return Command::None;
    };
    if !extension.contains_key(&name) {
        return Command::None;
    }

    let mut replacement = extension.clone();
    replacement.remove(&name);
    log::info!("Clearing custom property '{}'", name);
    request_extension_update(state, replacement)
}

/// Name of the property under the cursor, depending on which table is shown
fn selected_property_name(state: &State) -> Option<String> {
    if !state.schema.custom_properties.is_empty() {
        return state
            .schema
            .custom_properties
            .get(state.selected_row)
            .map(|def| def.name.clone());
    }
    state
        .entity
        .success()
        .and_then(|e| e.extension.as_ref())
        .and_then(|ext| ext.keys().nth(state.selected_row).cloned())
}

fn visible_row_count(state: &State) -> usize {
    if !state.schema.custom_properties.is_empty() {
        return state.schema.custom_properties.len();
    }
    state
        .entity
        .success()
        .and_then(|e| e.extension.as_ref())
        .map(|ext| ext.len())
        .unwrap_or(0)
}

fn clamp_selection(state: &mut State) {
    let last = visible_row_count(state).saturating_sub(1);
    state.selected_row = state.selected_row.min(last);
}

fn loading_body(spinner_frame: usize, theme: &Theme) -> Element<Msg> {
    let spinner = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
    let line = Line::from(vec![
        Span::styled(spinner.to_string(), Style::default().fg(theme.sky)),
        Span::styled(
            " Loading custom properties...".to_string(),
            Style::default().fg(theme.subtext0),
        ),
    ]);
    ColumnBuilder::new()
        .add(Element::None, LayoutConstraint::Fill(1))
        .add(Element::styled_text(line).build(), LayoutConstraint::Length(1))
        .add(Element::None, LayoutConstraint::Fill(2))
        .build()
}

fn failure_body(message: &str, theme: &Theme) -> Element<Msg> {
    ColumnBuilder::new()
        .add(
            Element::Text {
                content: "Failed to load entity".to_string(),
                style: Some(theme.error_style().add_modifier(Modifier::BOLD)),
            },
            LayoutConstraint::Length(1),
        )
        .add(
            Element::Text {
                content: message.to_string(),
                style: Some(Style::default().fg(theme.text)),
            },
            LayoutConstraint::Length(1),
        )
        .add(
            Element::Text {
                content: "Press r to retry, q to quit".to_string(),
                style: Some(Style::default().fg(theme.subtext0)),
            },
            LayoutConstraint::Length(1),
        )
        .spacing(1)
        .build()
}

fn forbidden_body(theme: &Theme) -> Element<Msg> {
    ColumnBuilder::new()
        .add(
            Element::Text {
                content: "You do not have permission to view the custom properties of this entity."
                    .to_string(),
                style: Some(theme.error_style()),
            },
            LayoutConstraint::Length(1),
        )
        .add(
            Element::Text {
                content: "Contact a catalog administrator to request access.".to_string(),
                style: Some(Style::default().fg(theme.subtext0)),
            },
            LayoutConstraint::Length(1),
        )
        .spacing(1)
        .build()
}

fn empty_body(entity_type: &str, has_edit_access: bool, theme: &Theme) -> Element<Msg> {
    let mut column = ColumnBuilder::new().add(
        Element::Text {
            content: format!("No custom properties defined for type '{}'.", entity_type),
            style: Some(Style::default().fg(theme.text)),
        },
        LayoutConstraint::Length(1),
    );
    if has_edit_access {
        column = column.add(
            Element::Text {
                content: "Add property declarations to the type to populate this view."
                    .to_string(),
                style: Some(Style::default().fg(theme.subtext0)),
            },
            LayoutConstraint::Length(1),
        );
    }
    column.spacing(1).build()
}

/// Schema-driven table: one row per declared property, in declaration order.
/// Values come from the resolved extension; names absent from it render
/// blank. In version view, keys the change description added are highlighted.
fn schema_table(
    schema: &TypeSchema,
    diff: &ExtensionDiff,
    selected_row: usize,
    version_view: bool,
    theme: &Theme,
) -> Element<Msg> {
    let empty = ExtensionMap::new();
    let extension = diff.extension.as_ref().unwrap_or(&empty);

    let mut rows = ColumnBuilder::new().add(
        header_row("Property", "Value", theme),
        LayoutConstraint::Length(1),
    );
    for (index, def) in schema.custom_properties.iter().enumerate() {
        let value = extension.get(&def.name).map(format_value);
        let added = version_view
            && diff
                .added_keys
                .as_ref()
                .is_some_and(|keys| keys.contains(&def.name));
        rows = rows.add(
            property_row(def, value, added, index == selected_row, theme),
            LayoutConstraint::Length(1),
        );
    }
    rows.build()
}

/// Fallback table for entities whose type declares nothing: every key in the
/// resolved extension, sorted, with its formatted value.
fn raw_extension_table(
    diff: &ExtensionDiff,
    selected_row: usize,
    version_view: bool,
    theme: &Theme,
) -> Element<Msg> {
    let empty = ExtensionMap::new();
    let extension = diff.extension.as_ref().unwrap_or(&empty);

    let mut rows = ColumnBuilder::new().add(
        header_row("Key", "Value", theme),
        LayoutConstraint::Length(1),
    );
    for (index, (key, value)) in extension.iter().enumerate() {
        let added = version_view
            && diff
                .added_keys
                .as_ref()
                .is_some_and(|keys| keys.contains(key.as_str()));
        rows = rows.add(
            value_row(
                key.clone(),
                format_value(value),
                added,
                index == selected_row,
                theme,
            ),
            LayoutConstraint::Length(1),
        );
    }
    rows.build()
}

fn header_row(left: &str, right: &str, theme: &Theme) -> Element<Msg> {
    let style = Style::default()
        .fg(theme.lavender)
        .add_modifier(Modifier::BOLD);
    RowBuilder::new()
        .add(
            Element::Text {
                content: left.to_string(),
                style: Some(style),
            },
            LayoutConstraint::Length(34),
        )
        .add(
            Element::Text {
                content: right.to_string(),
                style: Some(style),
            },
            LayoutConstraint::Fill(1),
        )
        .build()
}

fn property_row(
    def: &PropertyDefinition,
    value: Option<String>,
    added: bool,
    selected: bool,
    theme: &Theme,
) -> Element<Msg> {
    let name_line = Line::from(vec![
        Span::styled(
            def.display_title().to_string(),
            Style::default().fg(theme.subtext1),
        ),
        Span::styled(
            format!(" ({})", def.property_type.name),
            Style::default().fg(theme.overlay0),
        ),
    ]);
    let value_line = match value {
        Some(value) if added => Line::from(vec![
            Span::styled("+ ".to_string(), Style::default().fg(theme.green)),
            Span::styled(
                value,
                Style::default()
                    .fg(theme.green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Some(value) => Line::from(Span::styled(value, Style::default().fg(theme.text))),
        None => Line::from(Span::styled(
            "".to_string(),
            Style::default().fg(theme.overlay0),
        )),
    };
    styled_row(name_line, value_line, selected, theme)
}

fn value_row(
    key: String,
    value: String,
    added: bool,
    selected: bool,
    theme: &Theme,
) -> Element<Msg> {
    let key_line = Line::from(Span::styled(key, Style::default().fg(theme.subtext1)));
    let value_line = if added {
        Line::from(vec![
            Span::styled("+ ".to_string(), Style::default().fg(theme.green)),
            Span::styled(
                value,
                Style::default()
                    .fg(theme.green)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(Span::styled(value, Style::default().fg(theme.text)))
    };
    styled_row(key_line, value_line, selected, theme)
}

fn styled_row(
    left: Line<'static>,
    right: Line<'static>,
    selected: bool,
    theme: &Theme,
) -> Element<Msg> {
    let mut left_cell = Element::styled_text(left);
    let mut right_cell = Element::styled_text(right);
    if selected {
        let background = Style::default().bg(theme.surface0);
        left_cell = left_cell.background(background);
        right_cell = right_cell.background(background);
    }
    RowBuilder::new()
        .add(left_cell.build(), LayoutConstraint::Length(34))
        .add(right_cell.build(), LayoutConstraint::Fill(1))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_with(names: &[&str]) -> TypeSchema {
        TypeSchema {
            name: "table".to_string(),
            custom_properties: names
                .iter()
                .map(|name| PropertyDefinition {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn extension_with(pairs: &[(&str, &str)]) -> ExtensionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_display_mode_priority_order() {
        let schema = schema_with(&["tier"]);
        let extension = extension_with(&[("tier", "Gold")]);

        // Loading beats everything, even missing permission
        assert_eq!(
            display_mode(true, false, &schema, Some(&extension)),
            DisplayMode::Loading
        );
        // Permission beats content
        assert_eq!(
            display_mode(false, false, &schema, Some(&extension)),
            DisplayMode::Forbidden
        );
        // Declared schema beats the raw fallback
        assert_eq!(
            display_mode(false, true, &schema, Some(&extension)),
            DisplayMode::SchemaTable
        );
    }

    #[test]
    fn test_display_mode_raw_fallback_and_placeholder() {
        let no_schema = TypeSchema::default();
        let extension = extension_with(&[("tier", "Gold")]);

        assert_eq!(
            display_mode(false, true, &no_schema, Some(&extension)),
            DisplayMode::RawExtensionTable
        );
        // Present but empty extension still selects the raw table
        let empty = ExtensionMap::new();
        assert_eq!(
            display_mode(false, true, &no_schema, Some(&empty)),
            DisplayMode::RawExtensionTable
        );
        assert_eq!(
            display_mode(false, true, &no_schema, None),
            DisplayMode::EmptyPlaceholder
        );
    }

    #[test]
    fn test_selected_property_name_follows_active_table() {
        let mut state = State::default();
        state.schema = schema_with(&["tier", "owner"]);
        state.selected_row = 1;
        assert_eq!(selected_property_name(&state), Some("owner".to_string()));

        // Without declarations the raw extension keys drive the selection
        state.schema = TypeSchema::default();
        state.entity = Resource::Success(
            EntityDetails::default().with_extension(extension_with(&[("a", "1"), ("b", "2")])),
        );
        assert_eq!(selected_property_name(&state), Some("b".to_string()));
    }

    #[test]
    fn test_clear_requires_edit_access_and_plain_view() {
        let mut state = State::default();
        state.has_edit_access = true;
        state.schema = schema_with(&["tier"]);
        state.entity = Resource::Success(
            EntityDetails::default().with_extension(extension_with(&[("tier", "Gold")])),
        );

        // No handler wired: request collapses to a no-op
        assert!(matches!(clear_selected_value(&state), Command::None));

        state.version_view = true;
        assert!(matches!(clear_selected_value(&state), Command::None));

        state.version_view = false;
        state.has_edit_access = false;
        assert!(matches!(clear_selected_value(&state), Command::None));
    }

    #[test]
    fn test_row_count_caps_selection() {
        let mut state = State::default();
        state.schema = schema_with(&["tier", "owner"]);
        state.selected_row = 10;
        clamp_selection(&mut state);
        assert_eq!(state.selected_row, 1);

        state.schema = TypeSchema::default();
        clamp_selection(&mut state);
        assert_eq!(state.selected_row, 0);
    }
}
