//! Configuration loading for vecserve.
//!
//! Layered precedence: defaults -> config file -> env vars -> CLI flags.
//! The config file lives at ~/.config/vecserve/config.toml; environment
//! variables use the VECSERVE_ prefix with `__` for nesting
//! (e.g. VECSERVE_HTTP_PORT=8080, VECSERVE_EMBEDDING__API_KEY=...).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Which embedding backend to activate at startup.
///
/// Exactly one backend is active per deployment; it is selected here and
/// never swapped while the service is running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Remote call to the Gemini embedContent API
    #[default]
    Gemini,
    /// In-process Candle model (all-MiniLM-L6-v2)
    Local,
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Backend selection ("gemini" or "local")
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Model name for the remote backend (e.g. "text-embedding-004")
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API key for the remote backend (loaded from env, not stored in the
    /// config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL override (for custom endpoints and tests)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-call timeout for remote embedding requests, in milliseconds
    #[serde(default = "default_embedding_timeout_ms")]
    pub timeout_ms: u64,

    /// Embedding vector dimension; must match the dimension the index was
    /// built with
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_embedding_timeout_ms() -> u64 {
    30_000
}

fn default_embedding_dimension() -> usize {
    768
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_embedding_model(),
            api_key: None,
            api_base_url: None,
            timeout_ms: default_embedding_timeout_ms(),
            dimension: default_embedding_dimension(),
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the prebuilt ANN index file
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Path to the metadata JSON file
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,

    /// Default number of results when the caller does not pass k
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Upper bound on k accepted by the search endpoint
    #[serde(default = "default_k_max")]
    pub k_max: usize,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding backend configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

fn default_index_path() -> String {
    "./vector_index.usearch".to_string()
}

fn default_metadata_path() -> String {
    "./metadata.json".to_string()
}

fn default_top_k() -> usize {
    5
}

fn default_k_max() -> usize {
    50
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            metadata_path: default_metadata_path(),
            top_k: default_top_k(),
            k_max: default_k_max(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/vecserve/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (VECSERVE_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "vecserve")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("index_path", default_index_path())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("metadata_path", default_metadata_path())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("top_k", default_top_k() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("k_max", default_k_max() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("http_host", default_http_host())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("embedding.model", default_embedding_model())
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("embedding.timeout_ms", default_embedding_timeout_ms() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .set_default("embedding.dimension", default_embedding_dimension() as i64)
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Double-underscore nesting keeps flat keys with underscores
        // (top_k, index_path) addressable: VECSERVE_TOP_K=10,
        // VECSERVE_EMBEDDING__API_KEY=...
        builder = builder.add_source(
            Environment::with_prefix("VECSERVE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Validate settings before the service starts serving.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k_max == 0 {
            return Err(ConfigError::Invalid("k_max must be >= 1".to_string()));
        }
        if self.top_k == 0 || self.top_k > self.k_max {
            return Err(ConfigError::Invalid(format!(
                "top_k must be between 1 and k_max ({}), got {}",
                self.k_max, self.top_k
            )));
        }
        if self.embedding.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "embedding.timeout_ms must be > 0".to_string(),
            ));
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimension must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the socket address for the HTTP server.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
