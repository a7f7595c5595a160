//! KB Query CLI
//!
//! Main entry point for the kbquery command-line tool.
//! Asks questions of a remote knowledge base from the console or serves
//! the web UI.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ConfigCommand, ServeCommand};
use kbquery_core::{config::AppConfig, logging};
use std::path::PathBuf;
use tracing::Instrument;

/// KB Query - ask questions of a managed knowledge base
#[derive(Parser, Debug)]
#[command(name = "kbquery")]
#[command(about = "Ask questions of a managed knowledge base", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "KBQUERY_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "KBQUERY_CONFIG")]
    config: Option<PathBuf>,

    /// Knowledge base name
    #[arg(short, long, global = true, env = "KBQUERY_KNOWLEDGE_BASE")]
    knowledge_base: Option<String>,

    /// Seconds to wait for the knowledge base before giving up
    #[arg(short, long, global = true, env = "KBQUERY_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskCommand),

    /// Interactive question loop
    Chat(ChatCommand),

    /// Serve the web UI and JSON API
    Serve(ServeCommand),

    /// Show the effective configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from the workspace and environment
    let config = AppConfig::load_from(cli.workspace.as_deref(), cli.config.as_deref())
        .context("Failed to load configuration")?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.knowledge_base,
        cli.timeout,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Knowledge base: {}", config.knowledge_base_name);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Serve(_) => "serve",
        Commands::Config(_) => "config",
    };

    // Route to command handlers
    let result = async {
        match cli.command {
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Chat(cmd) => cmd.execute(&config).await,
            Commands::Serve(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(&config),
        }
    }
    .instrument(tracing::info_span!("command", name = command_name))
    .await;

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    Ok(result?)
}
