//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration sources could not be read or merged
    #[error("Configuration error: {0}")]
    Load(String),

    /// Configuration loaded but contains invalid values
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
