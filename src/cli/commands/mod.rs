pub mod auth;
pub mod properties;
pub mod settings;
pub mod tui;

pub use auth::{auth_command, AuthCommands};
pub use properties::{properties_command, PropertiesCommands};
pub use settings::{settings_command, SettingsCommands};
pub use tui::{tui_command, TuiCommands};

use anyhow::{Context, Result};

use crate::api::CatalogClient;
use crate::config::Config;

/// Resolve the currently selected catalog into a name and a ready client
pub(crate) fn current_client(config: &Config) -> Result<(String, CatalogClient)> {
    let name = config
        .get_current_catalog_name()
        .context("No catalog selected. Run 'metahub-cli auth add' to configure one")?
        .clone();
    let catalog = config
        .get_current_catalog()
        .with_context(|| format!("Catalog '{}' has no configuration", name))?;
    let client = CatalogClient::new(catalog.host.clone(), catalog.token.clone());
    Ok((name, client))
}
