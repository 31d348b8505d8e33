//! Jeeves Control - host maintenance and session inspection CLI.
//!
//! Thin shell over `jeeves_core`: parses arguments, loads configuration,
//! wires the real runner and log sink into the core components.

use anyhow::Result;
use clap::{Parser, Subcommand};
use jeevesctl::commands;
use jeeves_core::JeevesConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jeevesctl")]
#[command(about = "Package maintenance and login session inspection for EL hosts", long_about = None)]
#[command(version)]
struct Cli {
    /// Read configuration from this file instead of the default chain
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the package cache, evict it, and check for updates
    Maintain {
        /// Machine-readable JSON report
        #[arg(long)]
        json: bool,
    },

    /// List active login sessions with their details
    Sessions {
        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },

    /// Identify the OS distribution from the release file
    Release {
        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("JEEVES_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            tracing::debug!("loading configuration from {}", path.display());
            JeevesConfig::load_from(path)?
        }
        None => JeevesConfig::load()?,
    };

    match cli.command {
        Commands::Maintain { json } => commands::maintain(&config, json),
        Commands::Sessions { json } => commands::sessions(&config, json),
        Commands::Release { json } => commands::release(&config, json),
    }
}
