//! Service boundary handlers.
//!
//! Implements the health/reload/search contract the HTTP layer exposes.
//! Per-request failures are reported here as structured values; nothing
//! in this module can take down the serving process.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use vecserve_embeddings::EmbeddingProvider;
use vecserve_index::{IndexError, IndexManager};

use crate::pipeline::{PipelineError, QueryPipeline};

/// Health surface: readiness plus the serving snapshot's vitals.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ready: bool,
    pub index_path: String,
    pub metadata_count: usize,
}

/// Reload outcome.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReloadResponse {
    pub fn success(metadata_count: usize) -> Self {
        Self {
            ok: true,
            metadata_count: Some(metadata_count),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            metadata_count: None,
            error: Some(error.into()),
        }
    }
}

/// Ranked records and their distances as parallel arrays.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<Option<Value>>,
    pub distances: Vec<f32>,
}

/// Search outcome.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Option<Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distances: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn success(results: SearchResults) -> Self {
        Self {
            ok: true,
            results: Some(results.results),
            distances: Some(results.distances),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            results: None,
            distances: None,
            error: Some(error.into()),
        }
    }
}

/// Shared service state behind the HTTP routes.
pub struct ServiceState {
    pipeline: QueryPipeline,
    manager: Arc<IndexManager>,
    top_k: usize,
}

impl ServiceState {
    /// Wire the pipeline over one provider and one index manager.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        manager: Arc<IndexManager>,
        top_k: usize,
        k_max: usize,
    ) -> Self {
        Self {
            pipeline: QueryPipeline::new(provider, manager.clone(), k_max),
            manager,
            top_k,
        }
    }

    /// Current readiness and snapshot vitals.
    ///
    /// A serving process is Ready by construction: the first snapshot
    /// load is fatal on failure, so there is no not-ready state to
    /// report once requests are being answered.
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            ready: true,
            index_path: self.manager.index_path().to_string_lossy().to_string(),
            metadata_count: self.manager.metadata_count(),
        }
    }

    /// Reload the snapshot from disk, returning the new metadata count.
    pub fn reload(&self) -> Result<usize, IndexError> {
        info!("Reload requested");
        self.manager.reload()
    }

    /// Answer a search query; `k` falls back to the configured default.
    pub async fn search(
        &self,
        query: &str,
        k: Option<usize>,
    ) -> Result<SearchResults, PipelineError> {
        let k = k.unwrap_or(self.top_k);
        let ranked = self.pipeline.answer(query, k).await?;

        let (results, distances) = ranked.into_iter().unzip();
        Ok(SearchResults { results, distances })
    }
}
