use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod ask;
pub mod chat;
pub mod serve;

use crate::core::{AppConfig, init_tracing};

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session (default)
    Chat {},
    /// Ask a single question and print the answer
    Ask {
        #[arg(long)]
        question: String,
    },
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.unwrap_or(Command::Chat {});

    // Keep the terminal quiet unless asked, the server logs requests
    let default_directives = match command {
        Command::Serve { .. } => "ragchat=debug,tower_http=debug",
        _ => "ragchat=warn",
    };
    // Variables already in the environment take precedence over .env.
    // Loaded before tracing so RUST_LOG can come from .env too
    let dotenv = dotenvy::dotenv();
    init_tracing(default_directives);
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    // Fail before any session starts if something is missing
    let config = AppConfig::from_env()?;
    tracing::debug!("Loaded config {:?}", config);

    // Handle each sub command
    match command {
        Command::Chat {} => {
            chat::run(config).await?;
        }
        Command::Ask { question } => {
            ask::run(config, &question).await?;
        }
        Command::Serve { host, port } => {
            serve::run(host, port, config).await?;
        }
    }

    Ok(())
}
