//! Catalog connection management

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password, Select};

use crate::api::ResourceKind;
use crate::cli::ui::with_spinner;
use crate::config::{CatalogConfig, Config};

#[derive(Args)]
pub struct AuthCommands {
    #[command(subcommand)]
    pub command: AuthSubcommands,
}

#[derive(Subcommand)]
pub enum AuthSubcommands {
    /// Add a catalog connection
    Add {
        /// Name for this catalog (e.g., "production", "staging")
        #[arg(short, long)]
        name: Option<String>,
        /// MetaHub host URL
        #[arg(long)]
        host: Option<String>,
        /// Personal access token
        #[arg(long)]
        token: Option<String>,
        /// Import connection details from METAHUB_HOST and METAHUB_TOKEN
        #[arg(long)]
        from_env: bool,
    },
    /// Select the current catalog
    Select {
        /// Catalog name to select
        name: Option<String>,
    },
    /// Remove a catalog connection
    Remove {
        /// Catalog name to remove
        name: String,
        /// Force removal without confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Show connection status
    Status,
}

pub async fn auth_command(args: AuthCommands) -> Result<()> {
    match args.command {
        AuthSubcommands::Add {
            name,
            host,
            token,
            from_env,
        } => add_command(name, host, token, from_env).await,
        AuthSubcommands::Select { name } => select_command(name).await,
        AuthSubcommands::Remove { name, force } => remove_command(&name, force).await,
        AuthSubcommands::Status => status_command().await,
    }
}

async fn add_command(
    name: Option<String>,
    host: Option<String>,
    token: Option<String>,
    from_env: bool,
) -> Result<()> {
    let mut config = Config::load()?;

    let (name, host, token) = if from_env {
        let host = std::env::var("METAHUB_HOST")
            .map_err(|_| anyhow::anyhow!("METAHUB_HOST is not set"))?;
        let token = std::env::var("METAHUB_TOKEN")
            .map_err(|_| anyhow::anyhow!("METAHUB_TOKEN is not set"))?;
        let name = name.unwrap_or_else(|| "default".to_string());
        (name, host, token)
    } else {
        let name = match name {
            Some(name) => name,
            None => Input::<String>::new()
                .with_prompt("Catalog name (e.g., 'production', 'staging')")
                .interact()?,
        };
        let host = match host {
            Some(host) => host,
            None => Input::<String>::new()
                .with_prompt("MetaHub host URL")
                .interact()?,
        };
        let token = match token {
            Some(token) => token,
            None => Password::new()
                .with_prompt("Personal access token")
                .interact()?,
        };
        (name, host, token)
    };

    if config.catalogs.contains_key(&name) {
        let overwrite = Confirm::new()
            .with_prompt(format!("Catalog '{}' already exists. Overwrite?", name))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    config.add_catalog(name.clone(), CatalogConfig { host, token })?;
    println!(
        "{} Catalog '{}' added successfully",
        "✓".bright_green().bold(),
        name.bright_green().bold()
    );

    Ok(())
}

async fn select_command(name: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    let name = match name {
        Some(name) => name,
        None => {
            let mut names: Vec<String> = config.catalogs.keys().cloned().collect();
            names.sort();
            if names.is_empty() {
                anyhow::bail!("No catalogs configured. Run 'metahub-cli auth add' first");
            }
            let default = config
                .get_current_catalog_name()
                .and_then(|current| names.iter().position(|n| n == current))
                .unwrap_or(0);
            let selection = Select::new()
                .with_prompt("Select catalog")
                .items(&names)
                .default(default)
                .interact()?;
            names[selection].clone()
        }
    };

    config.set_current_catalog(name.clone())?;
    println!(
        "{} Now using catalog '{}'",
        "✓".bright_green().bold(),
        name.bright_green().bold()
    );

    Ok(())
}

async fn remove_command(name: &str, force: bool) -> Result<()> {
    let mut config = Config::load()?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove catalog '{}'?", name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    config.remove_catalog(name)?;
    println!(
        "{} Catalog '{}' removed",
        "✓".bright_green().bold(),
        name.bright_yellow()
    );

    Ok(())
}

async fn status_command() -> Result<()> {
    let config = Config::load()?;

    println!();
    println!(
        "  {}",
        "📊 MetaHub CLI Connection Status".bright_blue().bold()
    );
    println!("  {}", "════════════════════════════════".bright_blue());

    let mut names: Vec<&String> = config.catalogs.keys().collect();
    names.sort();

    if names.is_empty() {
        println!();
        println!("  {}", "⚠️  No catalogs configured".bright_yellow().bold());
        println!(
            "  {}",
            "Run 'metahub-cli auth add' to configure one.".dimmed()
        );
        return Ok(());
    }

    let current = config.get_current_catalog_name();

    println!();
    println!("  {}", "Configured catalogs:".bright_white().bold());
    for name in &names {
        let (marker, name_colored) = if current == Some(*name) {
            ("●", name.bright_green().bold())
        } else {
            ("○", name.white())
        };
        println!("  {} {}", marker.bright_green(), name_colored);
        if let Some(catalog) = config.catalogs.get(*name) {
            println!("    {}: {}", "Host".dimmed(), catalog.host.cyan());
        }
    }

    // Probe the current catalog with a harmless read
    if let Ok((name, client)) = super::current_client(&config) {
        println!();
        println!(
            "  {} {}",
            "Current catalog:".bright_white().bold(),
            name.bright_green().bold()
        );

        let probe = with_spinner("Testing connection...", async {
            client.resource_permission(ResourceKind::Type, "table").await
        })
        .await;

        match probe {
            Ok(permission) => {
                println!("  {}", "✓ Connection successful".bright_green().bold());
                let access = if permission.can_view() {
                    "view access granted".bright_green()
                } else {
                    "view access denied".bright_red()
                };
                println!("    {}: {}", "Type metadata".dimmed(), access);
            }
            Err(e) => {
                println!(
                    "  {} {}",
                    "✗ Connection failed:".bright_red().bold(),
                    e.to_string().red()
                );
            }
        }
    } else {
        println!();
        println!(
            "  {}",
            "⚠️  No current catalog selected".bright_yellow().bold()
        );
        println!(
            "  {}",
            "Use 'metahub-cli auth select' to choose one.".dimmed()
        );
    }

    Ok(())
}
