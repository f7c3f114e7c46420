//! One-shot custom property inspection from the command line

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use dialoguer::Confirm;
use serde_json::json;

use crate::api::{format_value, EntityDetails, ExtensionMap, ResourceKind, TypeSchema};
use crate::cli::ui::with_spinner;
use crate::config::Config;
use crate::tui::apps::custom_properties::{display_mode, DisplayMode};
use crate::versioning::{resolve_extension, ExtensionDiff};

#[derive(Args)]
pub struct PropertiesCommands {
    #[command(subcommand)]
    pub command: PropertiesSubcommands,
}

#[derive(Subcommand)]
pub enum PropertiesSubcommands {
    /// Show an entity's custom properties
    Show {
        /// Entity type (e.g., "table", "dashboard")
        entity_type: String,
        /// Fully qualified entity name
        fqn: String,
        /// Resolve against the entity's change description and highlight added keys
        #[arg(short, long)]
        diff: bool,
        /// Print the resolved extension as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Clear a custom property value on an entity
    Clear {
        /// Entity type (e.g., "table", "dashboard")
        entity_type: String,
        /// Fully qualified entity name
        fqn: String,
        /// Property name to clear
        property: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn properties_command(args: PropertiesCommands) -> Result<()> {
    match args.command {
        PropertiesSubcommands::Show {
            entity_type,
            fqn,
            diff,
            json,
        } => show_command(&entity_type, &fqn, diff, json).await,
        PropertiesSubcommands::Clear {
            entity_type,
            fqn,
            property,
            force,
        } => clear_command(&entity_type, &fqn, &property, force).await,
    }
}

async fn show_command(entity_type: &str, fqn: &str, diff: bool, json: bool) -> Result<()> {
    let config = Config::load()?;
    let (catalog_name, client) = super::current_client(&config)?;

    let permission = with_spinner("Fetching permissions...", async {
        client.resource_permission(ResourceKind::Type, entity_type).await
    })
    .await?;

    let entity = with_spinner("Fetching entity...", async {
        client.entity_by_name(entity_type, fqn).await
    })
    .await?;

    let schema = if permission.can_view() && !entity_type.is_empty() {
        with_spinner("Fetching type schema...", async {
            client.type_schema_by_name(entity_type).await
        })
        .await
        .unwrap_or_else(|e| {
            log::warn!("Type schema fetch failed: {}", e);
            TypeSchema::default()
        })
    } else {
        TypeSchema::default()
    };

    let resolved = resolve_extension(&entity, diff);

    if json {
        let payload = json!({
            "entity": entity.fully_qualified_name,
            "extension": resolved.extension,
            "addedKeys": resolved.added_keys,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        "🗂  Custom Properties:".bright_blue().bold(),
        entity.display_title().bright_white().bold()
    );
    println!(
        "  {} {} {} {}",
        catalog_name.dimmed(),
        entity_type.cyan(),
        fqn.dimmed(),
        entity
            .version
            .map(|v| format!("v{:.1}", v))
            .unwrap_or_default()
            .dimmed()
    );

    let mode = display_mode(false, permission.can_view(), &schema, entity.extension.as_ref());
    match mode {
        DisplayMode::Forbidden => {
            println!();
            println!(
                "  {}",
                "✗ You do not have permission to view these properties"
                    .bright_red()
                    .bold()
            );
        }
        DisplayMode::SchemaTable => print_schema_table(&schema, &resolved, diff),
        DisplayMode::RawExtensionTable => print_raw_table(&resolved, diff),
        DisplayMode::EmptyPlaceholder => {
            println!();
            println!(
                "  {}",
                format!("No custom properties defined for type '{}'", entity_type)
                    .bright_yellow()
            );
        }
        // Nothing is in flight once the awaits above resolved
        DisplayMode::Loading => {}
    }

    Ok(())
}

fn print_schema_table(schema: &TypeSchema, resolved: &ExtensionDiff, diff: bool) {
    let empty = ExtensionMap::new();
    let extension = resolved.extension.as_ref().unwrap_or(&empty);

    println!();
    println!(
        "  {:<36} {}",
        "Property".bright_white().bold(),
        "Value".bright_white().bold()
    );
    for def in &schema.custom_properties {
        let label = format!("{} ({})", def.display_title(), def.property_type.name);
        let value = extension.get(&def.name).map(format_value).unwrap_or_default();
        let added = diff
            && resolved
                .added_keys
                .as_ref()
                .is_some_and(|keys| keys.contains(&def.name));
        if added {
            println!("  {:<36} {} {}", label.dimmed(), "+".bright_green(), value.bright_green().bold());
        } else {
            println!("  {:<36} {}", label.dimmed(), value.white());
        }
    }
}

fn print_raw_table(resolved: &ExtensionDiff, diff: bool) {
    let empty = ExtensionMap::new();
    let extension = resolved.extension.as_ref().unwrap_or(&empty);

    println!();
    println!(
        "  {:<36} {}",
        "Key".bright_white().bold(),
        "Value".bright_white().bold()
    );
    for (key, value) in extension {
        let added = diff
            && resolved
                .added_keys
                .as_ref()
                .is_some_and(|keys| keys.contains(key.as_str()));
        let rendered = format_value(value);
        if added {
            println!("  {:<36} {} {}", key.dimmed(), "+".bright_green(), rendered.bright_green().bold());
        } else {
            println!("  {:<36} {}", key.dimmed(), rendered.white());
        }
    }
}

async fn clear_command(entity_type: &str, fqn: &str, property: &str, force: bool) -> Result<()> {
    let config = Config::load()?;
    let (_, client) = super::current_client(&config)?;

    let entity = with_spinner("Fetching entity...", async {
        client.entity_by_name(entity_type, fqn).await
    })
    .await?;

    let Some(extension) = entity.extension.as_ref() else {
        anyhow::bail!("Entity '{}' has no custom property values", fqn);
    };
    if !extension.contains_key(property) {
        anyhow::bail!("Entity '{}' has no value for property '{}'", fqn, property);
    }

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Clear property '{}' on '{}'?", property, fqn))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    let mut replacement = extension.clone();
    replacement.remove(property);
    let updated: EntityDetails = with_spinner("Updating entity...", async {
        client
            .update_extension(entity_type, &entity.with_extension(replacement))
            .await
    })
    .await?;

    println!(
        "{} Cleared '{}' on '{}' (now {})",
        "✓".bright_green().bold(),
        property.bright_yellow(),
        updated.display_title().bright_white(),
        updated
            .version
            .map(|v| format!("v{:.1}", v))
            .unwrap_or_else(|| "unversioned".to_string())
            .dimmed()
    );

    Ok(())
}
