//! HTTP client for the MetaHub catalog API

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde::de::DeserializeOwned;

use super::models::{EntityDetails, OperationPermission, TypeSchema};
use super::provider::{MetadataProvider, ResourceKind};

/// Catalog API client with connection pooling
#[derive(Clone)]
pub struct CatalogClient {
    host: String,
    token: String,
    http_client: reqwest::Client,
}

impl CatalogClient {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("metahub-cli/0.1")
            .build()
            .expect("Failed to build HTTP client");

        let mut host = host.into();
        while host.ends_with('/') {
            host.pop();
        }

        Self {
            host,
            token: token.into(),
            http_client,
        }
    }

    /// Type schema for an entity type, including its custom properties
    pub async fn type_schema_by_name(&self, entity_type: &str) -> Result<TypeSchema> {
        info!("Fetching type schema for '{}'", entity_type);
        let url = format!(
            "{}/api/v1/types/name/{}?fields=customProperties",
            self.host,
            urlencoding::encode(entity_type)
        );
        self.get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch type schema for '{}'", entity_type))
    }

    /// Permission granted to the calling token on a named resource
    pub async fn resource_permission(
        &self,
        resource: ResourceKind,
        name: &str,
    ) -> Result<OperationPermission> {
        info!("Fetching {} permission for '{}'", resource.as_path(), name);
        let url = format!(
            "{}/api/v1/permissions/{}/name/{}",
            self.host,
            resource.as_path(),
            urlencoding::encode(name)
        );
        self.get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch permission for '{}'", name))
    }

    /// Entity record by fully qualified name
    pub async fn entity_by_name(&self, entity_type: &str, fqn: &str) -> Result<EntityDetails> {
        info!("Fetching {} '{}'", entity_type, fqn);
        let url = format!(
            "{}/api/v1/entities/{}/name/{}?fields=extension,changeDescription",
            self.host,
            urlencoding::encode(entity_type),
            urlencoding::encode(fqn)
        );
        self.get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch {} '{}'", entity_type, fqn))
    }

    /// Persist a replacement extension map via a single-op JSON Patch.
    /// Returns the updated entity record as stored by the server.
    pub async fn update_extension(
        &self,
        entity_type: &str,
        entity: &EntityDetails,
    ) -> Result<EntityDetails> {
        let id = entity
            .id
            .context("Cannot update extension: entity record has no id")?;

        info!("Updating extension of {} {}", entity_type, id);
        let url = format!(
            "{}/api/v1/entities/{}/{}",
            self.host,
            urlencoding::encode(entity_type),
            id
        );

        let patch = serde_json::json!([
            { "op": "add", "path": "/extension", "value": entity.extension }
        ]);

        let response = self
            .http_client
            .patch(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json-patch+json")
            .header("Accept", "application/json")
            .json(&patch)
            .send()
            .await?;

        debug!("Patch response status: {}", response.status());

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Extension update failed ({}): {}", status, error_text)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        debug!("Response status: {}", response.status());

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Request failed ({}): {}", status, error_text)
        }
    }
}

#[async_trait]
impl MetadataProvider for CatalogClient {
    async fn type_schema_by_name(&self, entity_type: &str) -> Result<TypeSchema> {
        CatalogClient::type_schema_by_name(self, entity_type).await
    }

    async fn resource_permission(
        &self,
        resource: ResourceKind,
        name: &str,
    ) -> Result<OperationPermission> {
        CatalogClient::resource_permission(self, resource, name).await
    }

    async fn entity_by_name(&self, entity_type: &str, fqn: &str) -> Result<EntityDetails> {
        CatalogClient::entity_by_name(self, entity_type, fqn).await
    }
}
