//! Sublayer CLI
//!
//! Opens the generator window, or renders and plays mixes from the shell.

use anyhow::Context;
use clap::Parser;

use sublayer::cli::{commands, Cli, Commands};
use sublayer::config::{default_config_path, AppConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("Sublayer v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.clone().or_else(default_config_path);
    let mut config = match config_path {
        Some(path) => AppConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    commands::apply_overrides(&mut config, cli.engine);

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => commands::gui(&config)?,
        Commands::Manual { layers, output } => commands::manual(&config, &layers, &output)?,
        Commands::Auto {
            text,
            layers,
            output,
        } => commands::auto(&config, &text, layers, &output)?,
        Commands::Play { file, looping } => commands::play(&file, looping)?,
    }

    Ok(())
}
