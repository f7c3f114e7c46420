//! Fetch seam consumed by the custom-property surfaces.
//!
//! The TUI app and the CLI command talk to this trait instead of the HTTP
//! client directly, so tests can drive them with canned responses.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{EntityDetails, OperationPermission, TypeSchema};

/// Resource kinds addressable by the permission endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An entity type record (custom property declarations live here)
    Type,
}

impl ResourceKind {
    /// Path segment used by the permissions endpoint
    pub fn as_path(&self) -> &'static str {
        match self {
            ResourceKind::Type => "type",
        }
    }
}

/// Catalog reads needed to render an entity's custom properties
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Type schema by type name, with the customProperties projection
    async fn type_schema_by_name(&self, entity_type: &str) -> Result<TypeSchema>;

    /// Operation permission granted to the caller on a named resource
    async fn resource_permission(
        &self,
        resource: ResourceKind,
        name: &str,
    ) -> Result<OperationPermission>;

    /// Entity record by fully qualified name, with extension and change data
    async fn entity_by_name(&self, entity_type: &str, fqn: &str) -> Result<EntityDetails>;
}
