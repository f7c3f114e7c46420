use anyhow::Result;
use clap::Parser;
use log::info;

use metahub_cli::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("metahub-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting metahub-cli");

    match cli.command {
        Commands::Auth(auth_args) => {
            commands::auth_command(auth_args).await?;
        }
        Commands::Properties(properties_args) => {
            commands::properties_command(properties_args).await?;
        }
        Commands::Settings(settings_args) => {
            commands::settings_command(settings_args).await?;
        }
        Commands::Tui(tui_args) => {
            commands::tui_command(tui_args).await?;
        }
    }

    Ok(())
}
