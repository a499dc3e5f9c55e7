//! # Quickfill CLI
//!
//! Command-line interface for Quickfill autocomplete collections.
//!
//! ## Commands
//!
//! - `quickfill load <kind>` - Replace a collection with records from stdin
//! - `quickfill query <kind> <text>` - Print the best matching terms
//! - `quickfill status <kind>` - Show collection sizes
//! - `quickfill clear <kind>` - Delete a collection
//!
//! ## Example Usage
//!
//! ```bash
//! # Load one JSON record per line
//! quickfill load fruit < fruit.jsonl
//!
//! # Autocomplete
//! quickfill query fruit "app"
//!
//! # Use another server
//! QUICKFILL_REDIS_URL=redis://cache:6379/1 quickfill query fruit "apple pie"
//! ```

mod app;
mod commands;

use clap::{Parser, Subcommand};
use quickfill_core::Kind;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Quickfill - Ranked prefix autocomplete
#[derive(Parser)]
#[command(name = "quickfill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Redis connection URL [default: redis://127.0.0.1:6379/0]
    #[arg(short = 'r', long, env = "QUICKFILL_REDIS_URL", global = true)]
    redis_url: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace a collection with JSON records read from stdin, one per line
    Load {
        /// Collection to rebuild
        kind: Kind,
    },

    /// Print the best matching terms for a query
    #[command(alias = "q")]
    Query {
        /// Collection to search
        kind: Kind,

        /// Query words
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Show how many prefixes and records a collection holds
    Status {
        /// Collection to inspect
        kind: Kind,
    },

    /// Delete a collection's index, data and cached results
    Clear {
        /// Collection to delete
        kind: Kind,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => quickfill_core::Config::load_from(path)?,
        None => quickfill_core::Config::load()?,
    };

    // Setup logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.general.log_level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Execute command
    match cli.command {
        Commands::Load { kind } => commands::load::run(config, cli.redis_url, kind),
        Commands::Query { kind, text, output } => {
            commands::query::run(config, cli.redis_url, kind, &text.join(" "), output)
        }
        Commands::Status { kind } => commands::status::run(config, cli.redis_url, kind),
        Commands::Clear { kind, yes } => commands::clear::run(config, cli.redis_url, kind, yes),
    }
}
