//! HTTP transport for the service contract.
//!
//! Three JSON GET routes mirror the service boundary: /health, /reload,
//! /search?q=...&k=N. Every per-request failure becomes a structured
//! `{ ok: false, error }` body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::handlers::{HealthResponse, ReloadResponse, SearchResponse, ServiceState};
use crate::pipeline::PipelineError;

/// Build the service router.
pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/reload", get(reload))
        .route("/search", get(search))
        .with_state(state)
}

/// Run the HTTP server until the shutdown signal resolves.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    state: Arc<ServiceState>,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server ready on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn health(State(state): State<Arc<ServiceState>>) -> Json<HealthResponse> {
    Json(state.health())
}

async fn reload(State(state): State<Arc<ServiceState>>) -> (StatusCode, Json<ReloadResponse>) {
    match state.reload() {
        Ok(count) => (StatusCode::OK, Json(ReloadResponse::success(count))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ReloadResponse::failure(e.to_string())),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    /// Query text
    q: String,
    /// Result count; defaults to the configured top_k
    k: Option<usize>,
}

async fn search(
    State(state): State<Arc<ServiceState>>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<SearchResponse>) {
    match state.search(&params.q, params.k).await {
        Ok(results) => (StatusCode::OK, Json(SearchResponse::success(results))),
        Err(e) => (status_for(&e), Json(SearchResponse::failure(e.to_string()))),
    }
}

/// Caller errors are 400s; embedding and index failures are 500s.
fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::InvalidK { .. } => StatusCode::BAD_REQUEST,
        PipelineError::Embed(_) | PipelineError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use async_trait::async_trait;
    use tempfile::TempDir;
    use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

    use vecserve_embeddings::{Embedding, EmbeddingError, EmbeddingProvider};
    use vecserve_index::IndexManager;

    const DIM: usize = 8;

    struct ZeroProvider;

    #[async_trait]
    impl EmbeddingProvider for ZeroProvider {
        fn dimension(&self) -> usize {
            DIM
        }

        async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::new(vec![0.0; DIM]))
        }
    }

    fn build_fixture(dir: &Path, count: usize) {
        let options = IndexOptions {
            dimensions: DIM,
            metric: MetricKind::L2sq,
            quantization: ScalarKind::F32,
            connectivity: 0,
            expansion_add: 0,
            expansion_search: 0,
            multi: false,
        };
        let index = Index::new(&options).unwrap();
        index.reserve(count.max(1)).unwrap();
        for i in 0..count {
            let mut values = vec![0.0f32; DIM];
            values[0] = i as f32;
            index.add(i as u64, &values).unwrap();
        }
        index
            .save(dir.join("index.usearch").to_str().unwrap())
            .unwrap();

        let records: Vec<_> = (0..count)
            .map(|i| serde_json::json!({"chunk": format!("chunk-{}", i)}))
            .collect();
        std::fs::write(
            dir.join("metadata.json"),
            serde_json::to_string(&records).unwrap(),
        )
        .unwrap();
    }

    fn fixture_state(count: usize) -> (TempDir, Arc<ServiceState>) {
        let temp = TempDir::new().unwrap();
        build_fixture(temp.path(), count);
        let manager = Arc::new(
            IndexManager::open(
                temp.path().join("index.usearch"),
                temp.path().join("metadata.json"),
                DIM,
            )
            .unwrap(),
        );
        let state = Arc::new(ServiceState::new(Arc::new(ZeroProvider), manager, 5, 50));
        (temp, state)
    }

    #[tokio::test]
    async fn test_health_route() {
        let (_temp, state) = fixture_state(4);
        let Json(body) = health(State(state)).await;
        assert!(body.ready);
        assert_eq!(body.metadata_count, 4);
    }

    #[tokio::test]
    async fn test_search_route_ok() {
        let (_temp, state) = fixture_state(5);
        let params = SearchParams {
            q: "hello world".to_string(),
            k: Some(3),
        };

        let (status, Json(body)) = search(State(state), Query(params)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ok);
        assert_eq!(body.results.unwrap().len(), 3);
        assert_eq!(body.distances.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_route_rejects_oversized_k() {
        let (_temp, state) = fixture_state(5);
        let params = SearchParams {
            q: "hello".to_string(),
            k: Some(51),
        };

        let (status, Json(body)) = search(State(state), Query(params)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.ok);
        assert!(body.error.unwrap().contains("invalid k"));
    }

    #[tokio::test]
    async fn test_reload_route_failure_is_500() {
        let (temp, state) = fixture_state(5);
        std::fs::remove_file(temp.path().join("metadata.json")).unwrap();

        let (status, Json(body)) = reload(State(state.clone())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.ok);
        assert!(body.error.is_some());

        // The old snapshot keeps serving.
        assert_eq!(state.health().metadata_count, 5);
    }

    #[tokio::test]
    async fn test_reload_route_success() {
        let (temp, state) = fixture_state(5);
        build_fixture(temp.path(), 7);

        let (status, Json(body)) = reload(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ok);
        assert_eq!(body.metadata_count, Some(7));
    }
}
