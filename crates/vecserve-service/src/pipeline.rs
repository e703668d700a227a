//! End-to-end query pipeline.
//!
//! One best-effort attempt per call: validate k, embed the text, search
//! the current snapshot. Each stage is a failure boundary tagged with its
//! name; no retries happen here, the caller owns any retry policy.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use vecserve_embeddings::{EmbeddingError, EmbeddingProvider};
use vecserve_index::{IndexError, IndexManager, RankedRecord};

/// A query failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// k outside the service bounds; rejected before any embedding or
    /// index call
    #[error("invalid k: {k} (must be between 1 and {max})")]
    InvalidK { k: usize, max: usize },

    /// Embedding backend failure
    #[error("embed stage failed: {0}")]
    Embed(#[source] EmbeddingError),

    /// Index search failure (e.g. dimension mismatch)
    #[error("search stage failed: {0}")]
    Search(#[source] IndexError),
}

impl PipelineError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::InvalidK { .. } => "validate",
            PipelineError::Embed(_) => "embed",
            PipelineError::Search(_) => "search",
        }
    }
}

/// Orchestrates the embedding provider and the index manager to answer a
/// query end-to-end.
pub struct QueryPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    manager: Arc<IndexManager>,
    k_max: usize,
}

impl QueryPipeline {
    /// Create a pipeline over one provider and one index manager.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        manager: Arc<IndexManager>,
        k_max: usize,
    ) -> Self {
        Self {
            provider,
            manager,
            k_max,
        }
    }

    /// Answer a text query with `k` ranked (record, distance) slots.
    pub async fn answer(&self, text: &str, k: usize) -> Result<Vec<RankedRecord>, PipelineError> {
        if k < 1 || k > self.k_max {
            return Err(PipelineError::InvalidK { k, max: self.k_max });
        }

        let embedding = self
            .provider
            .embed(text)
            .await
            .map_err(PipelineError::Embed)?;

        let results = self
            .manager
            .search(&embedding, k)
            .map_err(PipelineError::Search)?;

        debug!(k = k, "Query answered");
        Ok(results)
    }
}
