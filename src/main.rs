//! mnemo - hybrid retrieval engine and TTL session cache.
//!
//! Main entry point for the mnemo CLI.

use clap::Parser;
use tracing::{debug, warn};

use mnemo_config::{ConfigLoader, ConfigValidator, mnemo_dir};
use mnemo_protocols::{ConversationId, DocumentSource};

mod cli;
mod cmd_cache;
mod cmd_retrieval;
mod components;
mod logging;

use cli::{Cli, Commands};
use cmd_cache::handle_cache_command;
use cmd_retrieval::handle_retrieval_command;
use logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| mnemo_dir().join("config.toml"));
    let config = ConfigLoader::load_or_default(&config_path)?;

    init_tracing(&config.logging)?;
    debug!("Loaded configuration from {}", config_path.display());

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    validation.into_result()?;

    match cli.command {
        Commands::Cache { action } => handle_cache_command(action, &config).await,
        command => match config.retrieval.scope_kind.as_str() {
            "conversation" => handle_retrieval_command::<ConversationId>(command, &config).await,
            _ => handle_retrieval_command::<DocumentSource>(command, &config).await,
        },
    }
}
