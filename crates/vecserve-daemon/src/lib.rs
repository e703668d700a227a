//! vecserve daemon library exports.
//!
//! This crate provides the CLI daemon binary for vecserve.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (serve)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::serve;
