//! # vecserve-types
//!
//! Shared configuration and error types for the vecserve workspace.
//!
//! Configuration is layered: built-in defaults, then the config file at
//! `~/.config/vecserve/config.toml`, then environment variables
//! (`VECSERVE_*`), with CLI flags applied last by the daemon.

pub mod config;
pub mod error;

pub use config::{EmbeddingBackend, EmbeddingSettings, Settings};
pub use error::ConfigError;
