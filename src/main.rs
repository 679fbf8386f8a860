use anyhow::Context;
use caserag::cli::handle_ask_command;
use caserag::cli::handle_config_command;
use caserag::cli::handle_inspect_command;
use caserag::cli::handle_search_command;
use caserag::cli::AskOverrides;
use caserag::cli::Cli;
use caserag::cli::Commands;
use caserag::config::AppConfig;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().context("failed to load configuration")?,
    };

    // Initialize logging with configuration
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    let _guard = caserag::logging::init_logging_with_config(&logging)
        .context("failed to initialize logging")?;
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Search { query, topk, json } => {
            handle_search_command(&config, &query, topk, json).with_context(|| {
                format!("search failed for index {}", config.index_path().display())
            })?;
        }
        Commands::Ask {
            query,
            topk,
            backend,
            model,
            temperature,
            json,
        } => {
            let overrides = AskOverrides {
                backend,
                model,
                temperature,
            };
            handle_ask_command(&config, &query, topk, &overrides, json)
                .await
                .context("ask failed")?;
        }
        Commands::Inspect => {
            handle_inspect_command(&config).with_context(|| {
                format!("cannot inspect index {}", config.index_path().display())
            })?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
