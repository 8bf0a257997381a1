//! streamcall CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write a default config file
//! - `chat`     — Interactive chat or single-message mode
//! - `config`   — Show, locate, or validate the configuration
//! - `commands` — List the functions the model may call

use clap::{Parser, Subcommand};
use streamcall_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "streamcall",
    about = "streamcall — streaming chat agent with function calling",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List the commands advertised to the model
    Commands {
        /// Print the descriptors as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration
    Validate,
}

/// Log filter: `RUST_LOG` wins, then `--verbose`, then the config's debug flag.
fn log_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
    if let Ok(filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = if verbose {
        "debug"
    } else if AppConfig::load().is_ok_and(|c| c.debug) {
        "info,streamcall_agent=debug,streamcall_core=debug"
    } else {
        "info"
    };
    tracing_subscriber::EnvFilter::new(directive)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so streamed replies on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
        Commands::Commands { json } => commands::list::run(json).await?,
    }

    Ok(())
}
