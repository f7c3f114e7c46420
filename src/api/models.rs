//! MetaHub catalog wire models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Extension map carried by entities: custom property name -> value.
/// Keys are unique property names; values are arbitrary JSON.
pub type ExtensionMap = serde_json::Map<String, Value>;

/// An entity record as returned by the catalog.
///
/// Only the fields this client reads are typed; everything else the server
/// sent is kept in `other` so updates round-trip without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityDetails {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub fully_qualified_name: Option<String>,
    pub version: Option<f64>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
    pub extension: Option<ExtensionMap>,
    pub change_description: Option<ChangeDescription>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

impl EntityDetails {
    /// Human-facing label: displayName, falling back to name, then FQN
    pub fn display_title(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.fully_qualified_name.as_deref())
            .unwrap_or("")
    }

    /// The same entity identity carrying a replacement extension map
    pub fn with_extension(&self, extension: ExtensionMap) -> Self {
        let mut entity = self.clone();
        entity.extension = Some(extension);
        entity
    }
}

/// A custom property declared on an entity type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDefinition {
    pub name: String,
    pub display_name: Option<String>,
    pub property_type: TypeRef,
    pub description: Option<String>,
}

impl PropertyDefinition {
    /// Human-facing label: displayName, falling back to name
    pub fn display_title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Reference to a registered type (e.g. a property's value type)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeRef {
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: String,
}

/// An entity type record with its custom property declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeSchema {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub custom_properties: Vec<PropertyDefinition>,
}

/// Capability flags granted on a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationPermission {
    pub view_all: bool,
    pub view_basic: bool,
    pub edit_all: bool,
}

impl OperationPermission {
    /// Either view capability is enough to read type metadata
    pub fn can_view(&self) -> bool {
        self.view_all || self.view_basic
    }
}

/// Field-level change sets attached to versioned entity records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeDescription {
    pub fields_added: Vec<FieldChange>,
    pub fields_updated: Vec<FieldChange>,
    pub fields_deleted: Vec<FieldChange>,
    pub previous_version: Option<f64>,
}

/// One changed field; values arrive as serialized strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldChange {
    pub name: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Compact single-line rendering of a property value
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
