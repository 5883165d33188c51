//! Ragline CLI
//!
//! Main entry point for the ragline command-line tool.
//! Provides commands for ingesting documents and chatting over them.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, LoadCommand, StatsCommand};
use ragline_core::{logging, AppConfig, AppResult};
use std::path::PathBuf;

/// Ragline CLI - retrieval-augmented chat over local documents
#[derive(Parser, Debug)]
#[command(name = "ragline")]
#[command(about = "Retrieval-augmented chat over local documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "RAGLINE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "RAGLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Chat provider (openai)
    #[arg(short, long, global = true, env = "RAGLINE_CHAT_PROVIDER")]
    provider: Option<String>,

    /// Chat model identifier
    #[arg(short, long, global = true, env = "RAGLINE_CHAT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest documents into the vector index
    Load(LoadCommand),

    /// Interactive chat over the indexed documents
    Chat(ChatCommand),

    /// Ask a single question against the indexed documents
    Ask(AskCommand),

    /// Show vector index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Ragline CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Chat provider: {}", config.chat.provider);
    tracing::debug!("Embedding provider: {}", config.embedding.provider);

    // Missing secrets and malformed settings are fatal before any command runs
    config.validate()?;
    config.ensure_ragline_dir()?;

    let command_name = match &cli.command {
        Commands::Load(_) => "load",
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Load(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
