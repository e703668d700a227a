//! CLI argument parsing for the vecserve daemon.
//!
//! CLI flags override every other config source.

use clap::{Parser, Subcommand};

/// vecserve Daemon
///
/// k-NN similarity search over a precomputed vector index.
#[derive(Parser, Debug)]
#[command(name = "vecserve-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/vecserve/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the search service
    Serve {
        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the ANN index file path
        #[arg(long)]
        index_path: Option<String>,

        /// Override the metadata file path
        #[arg(long)]
        metadata_path: Option<String>,
    },
}
