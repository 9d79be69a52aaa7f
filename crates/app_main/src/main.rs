//! Lumen - catalog tool for the Lumen photo manager
//!
//! Replays backend event logs and command scripts against a catalog,
//! inspects catalogs and migrates old ones.

mod cli;
mod commands;
mod offline;

use anyhow::Result;
use app_core::AppConfig;
use app_log::LogOptions;
use clap::Parser;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging and panic hook first
    let log_dir = app_log::log_dir();
    let _guard = app_log::init(LogOptions {
        default_directive: cli.log_directive().to_string(),
        log_dir: (!cli.no_log_file).then(|| log_dir.clone()),
        console: true,
    })?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(&log_dir, 7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("Lumen {} starting", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let mut config = AppConfig::load_from(&config_path).unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable configuration {:?}: {}", config_path, e);
        AppConfig::default()
    });

    if let Some(endpoint) = config.endpoint() {
        tracing::info!(
            "Backend configured at {}; lumen works on catalog files and does not connect",
            endpoint.url(ipc_proto::Route::SavedState)
        );
    }

    match &cli.command {
        Command::Replay(args) => {
            let summary = commands::run_replay(args, &config).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);

            config.push_recent_catalog(&summary.output);
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Failed to save configuration: {}", e);
            }
        }
        Command::Inspect(args) => {
            let summary = commands::run_inspect(args, &config)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Migrate(args) => {
            let version = commands::run_migrate(args)?;
            tracing::info!("Migrated {:?} (schema version {})", args.output, version);
        }
    }

    Ok(())
}
