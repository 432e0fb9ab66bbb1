// Warden Engine
// Main entry point for the warden binary

use clap::Parser;
use warden_engine::cli::{Cli, Command, ConfigAction};
use warden_engine::config::Config;
use warden_engine::handlers::{
    handle_config_path, handle_config_show, handle_levels, handle_plan, OutputFormat,
};
use warden_engine::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    init_telemetry(
        cli.log.as_deref().unwrap_or(&config.core.log_level),
        config.core.log_format,
    );

    tracing::info!(
        "Warden Engine v{} ({} - {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Levels { plan } => handle_levels(&plan, format),

        Command::Plan { request } => {
            tracing::info!("Planning request...");
            handle_plan(&request, &config, format).await
        }

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
            ConfigAction::Path => handle_config_path(cli.config.as_deref(), format),
        },
    }
}
