//! Tomte CLI - identify images by pixel content and report their capture dates.
//!
//! Every image gets a SHA-1 fingerprint of its decoded pixels (so metadata-only
//! differences between copies do not matter) and the EXIF capture date, or
//! `1900-01-01 00:00:00` when it has none.
//!
//! # Usage
//!
//! ```bash
//! # Fingerprint a single image
//! tomte scan image.jpg
//!
//! # Fingerprint a directory tree on 8 workers
//! tomte scan ./photos/ --recurse --parallel 8
//!
//! # View configuration
//! tomte config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Tomte - identify images by pixel content and report their capture dates.
#[derive(Parser, Debug)]
#[command(name = "tomte")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long = "config", global = true, env = "TOMTE_CONFIG", value_name = "FILE")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fingerprint images and print their capture dates
    Scan(cli::scan::ScanArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = match &cli.config_file {
        Some(path) => tomte_core::Config::load_from(path),
        None => tomte_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tomte config path`."
            );
            tomte_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Tomte v{}", tomte_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Scan(args) => cli::scan::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config_file).await,
    }
}
