//! MetaHub catalog API: wire models, HTTP client, and the fetch seam
//! consumed by the custom-property surfaces.

pub mod client;
pub mod models;
pub mod provider;

pub use client::CatalogClient;
pub use models::{
    format_value, ChangeDescription, EntityDetails, ExtensionMap, FieldChange,
    OperationPermission, PropertyDefinition, TypeRef, TypeSchema,
};
pub use provider::{MetadataProvider, ResourceKind};
