//! Embedding provider trait and vector type.
//!
//! Defines the single capability the rest of the service depends on:
//! text in, fixed-dimension float vector out.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// A dense query vector.
///
/// Values are carried exactly as the backend produced them. The ANN index
/// owns the distance metric, so this type never normalizes or otherwise
/// rescales.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding from raw backend output.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// Trait for embedding backends.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use,
/// deterministic per input (same text -> same vector), and stateless
/// across calls.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// The fixed dimension every vector from this provider has.
    fn dimension(&self) -> usize;

    /// Generate the embedding for a single text.
    ///
    /// A failure here is scoped to the calling query; implementations must
    /// fail loudly rather than return a zero vector.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;
}

impl std::fmt::Debug for dyn EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("dimension", &self.dimension())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_passes_values_through() {
        let emb = Embedding::new(vec![3.0, 4.0]);
        // No normalization: the index owns the metric.
        assert_eq!(emb.values, vec![3.0, 4.0]);
        assert_eq!(emb.dimension(), 2);
    }

    #[test]
    fn test_empty_embedding_dimension() {
        let emb = Embedding::new(vec![]);
        assert_eq!(emb.dimension(), 0);
    }
}
