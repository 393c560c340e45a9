//! # roost-cli
//!
//! CLI tool for exercising Roost against an in-memory store.
//!
//! ## Commands
//!
//! - `reorder`: Create a todo list and apply moves to it
//! - `page`: Page backwards through a message history
//! - `search`: Search a set of todos page by page
//! - `watch`: Print the live-update stream while todos are written
//!
//! ## Example
//!
//! ```bash
//! # Move the fourth of five todos up one place
//! roost reorder --items 5 --move 3:2
//!
//! # Page through 43 messages, 20 at a time
//! roost page --messages 43
//!
//! # Search with a custom page size, as JSON
//! roost --config roost.toml --json search --term lawn
//!
//! # Watch updates while three todos are created and one completed
//! RUST_LOG=debug roost watch --todos 3
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roost_client::RoostConfig;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{page, reorder, search, watch};

/// CLI tool for exercising Roost.
#[derive(Parser, Debug)]
#[command(name = "roost")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a roost.toml configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a todo list and apply moves to it
    Reorder {
        /// Number of todos to create
        #[arg(long, default_value = "5")]
        items: usize,

        /// Move as FROM:TO (zero-based, repeatable)
        #[arg(long = "move", value_parser = reorder::parse_move)]
        moves: Vec<reorder::Move>,
    },

    /// Page backwards through a message history
    Page {
        /// Number of messages to create
        #[arg(long, default_value = "43")]
        messages: usize,
    },

    /// Search a set of todos page by page
    Search {
        /// Search term
        #[arg(long, short)]
        term: String,

        /// Todo text to search (repeatable; a sample list is used if absent)
        #[arg(long = "todo")]
        todos: Vec<String>,
    },

    /// Print the live-update stream while todos are written
    Watch {
        /// Number of todos to create
        #[arg(long, default_value = "3")]
        todos: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RoostConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RoostConfig::default(),
    };
    init_logging(&config.logging.level);
    tracing::debug!("Using config: {:?}", config);

    match cli.command {
        Commands::Reorder { items, moves } => {
            reorder::run(&config, cli.json, items, &moves).await?;
        }
        Commands::Page { messages } => {
            page::run(&config, cli.json, messages).await?;
        }
        Commands::Search { term, todos } => {
            search::run(&config, cli.json, &term, &todos).await?;
        }
        Commands::Watch { todos } => {
            watch::run(&config, cli.json, todos).await?;
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` or else the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
