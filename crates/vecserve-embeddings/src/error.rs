//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while generating an embedding.
///
/// All variants are scoped to a single query: an embedding failure fails
/// that query and nothing else.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Remote API transport or status failure
    #[error("Embedding API error: {0}")]
    Api(String),

    /// Remote call exceeded the configured deadline
    #[error("Embedding request timed out after {0} ms")]
    Timeout(u64),

    /// Upstream returned a response missing or malforming the embedding
    #[error("Malformed upstream response: {0}")]
    UpstreamResponse(String),

    /// Candle model error
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Tokenizer error
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model file not found
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    /// Failed to download model files
    #[error("Failed to download model: {0}")]
    Download(String),

    /// Blocking embedding task failed to complete
    #[error("Embedding task failed: {0}")]
    Task(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
