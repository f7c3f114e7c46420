use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub host: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_catalog: Option<String>,
    pub catalogs: HashMap<String, CatalogConfig>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    "mocha".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("metahub-cli")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".metahub-cli")
        };

        // Ensure the directory exists
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, creating default config");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded config with {} catalogs", config.catalogs.len());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        debug!("Saving config to: {:?}", config_path);

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn add_catalog(&mut self, name: String, catalog_config: CatalogConfig) -> Result<()> {
        info!("Adding catalog: {}", name);
        self.catalogs.insert(name.clone(), catalog_config);

        // Set as current catalog if it's the first one
        if self.current_catalog.is_none() {
            self.current_catalog = Some(name.clone());
            info!("Set {} as current catalog", name);
        }

        self.save()
    }

    pub fn get_current_catalog(&self) -> Option<&CatalogConfig> {
        let current = self.current_catalog.as_ref()?;
        self.catalogs.get(current)
    }

    pub fn get_current_catalog_name(&self) -> Option<&String> {
        self.current_catalog.as_ref()
    }

    pub fn set_current_catalog(&mut self, name: String) -> Result<()> {
        if !self.catalogs.contains_key(&name) {
            anyhow::bail!("Catalog '{}' not found", name);
        }

        info!("Setting current catalog to: {}", name);
        self.current_catalog = Some(name);
        self.save()
    }

    pub fn list_catalogs(&self) -> Vec<&String> {
        self.catalogs.keys().collect()
    }

    pub fn remove_catalog(&mut self, name: &str) -> Result<()> {
        if !self.catalogs.contains_key(name) {
            anyhow::bail!("Catalog '{}' not found", name);
        }

        info!("Removing catalog: {}", name);
        self.catalogs.remove(name);

        // If this was the current catalog, clear it
        if self.current_catalog.as_deref() == Some(name) {
            warn!("Removed current catalog, clearing current selection");
            self.current_catalog = None;
        }

        self.save()
    }

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_theme(&mut self, theme: String) -> Result<()> {
        info!("Updating theme to: {}", theme);
        self.settings.theme = theme;
        self.save()
    }
}
