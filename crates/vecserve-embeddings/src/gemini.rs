//! Gemini embedContent API backend.
//!
//! Calls the managed embedding endpoint with a bounded per-call timeout.
//! No retries happen here: the pipeline is a single best-effort attempt
//! per query and the caller owns any retry policy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EmbeddingError;
use crate::provider::{Embedding, EmbeddingProvider};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini embedding backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL
    pub base_url: String,

    /// Embedding model (e.g. "text-embedding-004")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Per-call request timeout
    pub timeout: Duration,

    /// Expected embedding dimension (e.g. 768 for text-embedding-004)
    pub dimension: usize,
}

impl GeminiConfig {
    /// Create a config with the default endpoint and a 30s timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(30),
            dimension,
        }
    }

    /// Override the API base URL (custom endpoints, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    content: RequestContent<'a>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ResponseEmbedding>,
}

#[derive(Deserialize)]
struct ResponseEmbedding {
    values: Vec<f32>,
}

/// Remote embedding backend using the Gemini embedContent API.
pub struct GeminiEmbedder {
    client: Client,
    config: GeminiConfig,
}

impl GeminiEmbedder {
    /// Create a new embedder with a timeout-bounded HTTP client.
    pub fn new(config: GeminiConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Api(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:embedContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "query text is empty".to_string(),
            ));
        }

        let request = EmbedContentRequest {
            content: RequestContent {
                parts: vec![RequestPart { text }],
            },
        };

        debug!(model = %self.config.model, "Requesting embedding");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    EmbeddingError::Api(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::UpstreamResponse(e.to_string()))?;

        extract_embedding(body, self.config.dimension)
    }
}

/// Pull the vector out of a decoded response, rejecting shapes that would
/// otherwise degrade into a zero or mis-sized vector.
fn extract_embedding(
    response: EmbedContentResponse,
    expected_dimension: usize,
) -> Result<Embedding, EmbeddingError> {
    let values = response
        .embedding
        .map(|e| e.values)
        .ok_or_else(|| EmbeddingError::UpstreamResponse("missing `embedding` field".to_string()))?;

    if values.is_empty() {
        return Err(EmbeddingError::UpstreamResponse(
            "embedding has no values".to_string(),
        ));
    }

    if values.len() != expected_dimension {
        return Err(EmbeddingError::UpstreamResponse(format!(
            "expected {} values, got {}",
            expected_dimension,
            values.len()
        )));
    }

    Ok(Embedding::new(values))
}
