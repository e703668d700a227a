//! vecserve Daemon
//!
//! Serves k-NN similarity search over a precomputed vector index with
//! positionally aligned metadata.
//!
//! # Usage
//!
//! ```bash
//! vecserve-daemon serve [--port PORT] [--index-path PATH] [--metadata-path PATH]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/vecserve/config.toml)
//! 3. Environment variables (VECSERVE_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use vecserve_daemon::{serve, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            index_path,
            metadata_path,
        } => {
            serve(
                cli.config.as_deref(),
                port,
                index_path.as_deref(),
                metadata_path.as_deref(),
                cli.log_level.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}
