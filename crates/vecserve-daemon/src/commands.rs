//! Command implementations for the vecserve daemon.
//!
//! `serve` loads config, selects the embedding backend, performs the
//! first snapshot load (fatal on failure), and runs the HTTP server
//! until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use vecserve_embeddings::{CandleEmbedder, EmbeddingProvider, GeminiConfig, GeminiEmbedder};
use vecserve_index::IndexManager;
use vecserve_service::{run_server_with_shutdown, ServiceState};
use vecserve_types::{EmbeddingBackend, Settings};

/// Start the search service.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Select and construct the embedding backend
/// 3. Load the first index snapshot (failure here is fatal)
/// 4. Serve HTTP with graceful shutdown on SIGINT/SIGTERM
pub async fn serve(
    config_path: Option<&str>,
    port_override: Option<u16>,
    index_path_override: Option<&str>,
    metadata_path_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    // Apply CLI overrides (highest precedence)
    if let Some(port) = port_override {
        settings.http_port = port;
    }
    if let Some(path) = index_path_override {
        settings.index_path = path.to_string();
    }
    if let Some(path) = metadata_path_override {
        settings.metadata_path = path.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    settings.validate().context("Invalid configuration")?;

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("vecserve daemon starting...");
    info!("Configuration:");
    info!("  Index path: {}", settings.index_path);
    info!("  Metadata path: {}", settings.metadata_path);
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Embedding backend: {:?}", settings.embedding.backend);
    info!("  Embedding dimension: {}", settings.embedding.dimension);

    let provider = build_provider(&settings)?;
    if provider.dimension() != settings.embedding.dimension {
        anyhow::bail!(
            "Embedding backend produces {}-dimensional vectors but embedding.dimension is {}",
            provider.dimension(),
            settings.embedding.dimension
        );
    }

    // First snapshot load. No Ready state without it.
    let manager = Arc::new(
        IndexManager::open(
            &settings.index_path,
            &settings.metadata_path,
            settings.embedding.dimension,
        )
        .context("Failed to load index and metadata")?,
    );

    let state = Arc::new(ServiceState::new(
        provider,
        manager,
        settings.top_k,
        settings.k_max,
    ));

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    };

    run_server_with_shutdown(addr, state, shutdown_signal)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Construct the configured embedding backend.
///
/// The backend is fixed for the process lifetime; the query path never
/// branches on which one is active.
fn build_provider(settings: &Settings) -> Result<Arc<dyn EmbeddingProvider>> {
    match settings.embedding.backend {
        EmbeddingBackend::Gemini => {
            let api_key = settings
                .embedding
                .api_key
                .clone()
                .context("embedding.api_key is required for the gemini backend (set VECSERVE_EMBEDDING__API_KEY)")?;

            let mut config = GeminiConfig::new(
                api_key,
                settings.embedding.model.clone(),
                settings.embedding.dimension,
            )
            .with_timeout(Duration::from_millis(settings.embedding.timeout_ms));

            if let Some(base_url) = &settings.embedding.api_base_url {
                config = config.with_base_url(base_url);
            }

            Ok(Arc::new(
                GeminiEmbedder::new(config).context("Failed to build embedding client")?,
            ))
        }
        EmbeddingBackend::Local => Ok(Arc::new(
            CandleEmbedder::load_default().context("Failed to load local embedding model")?,
        )),
    }
}
