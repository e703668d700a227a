//! Local embedding backend using Candle.
//!
//! Runs all-MiniLM-L6-v2 (384 dimensions) in-process. The forward pass is
//! CPU-bound, so the async trait impl moves it onto the blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::cache::ModelCache;
use crate::error::EmbeddingError;
use crate::provider::{Embedding, EmbeddingProvider};

/// Embedding dimension for all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Maximum sequence length in tokens
pub const MAX_SEQ_LENGTH: usize = 256;

/// The loaded model, shared across blocking tasks.
struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl BertEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let ids = encoding.get_ids();
        let mask = encoding.get_attention_mask();
        let len = ids.len().min(MAX_SEQ_LENGTH);
        if len == 0 {
            return Err(EmbeddingError::InvalidInput(
                "text tokenized to zero tokens".to_string(),
            ));
        }

        let input_ids = Tensor::from_vec(ids[..len].to_vec(), (1, len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask[..len].to_vec(), (1, len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = self.mean_pooling(&output, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_vec2()?;
        rows.into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidInput("empty model output".to_string()))
    }

    /// Mean pooling over token embeddings, excluding padding.
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(embeddings.shape())?;
        let mask_f32 = mask.to_dtype(DType::F32)?;

        let masked = embeddings.broadcast_mul(&mask_f32)?;
        let sum = masked.sum(1)?;

        let mask_sum = mask_f32.sum(1)?;
        let mask_sum = mask_sum.clamp(1e-9, f64::MAX)?;

        Ok(sum.broadcast_div(&mask_sum)?)
    }
}

/// Local embedding backend.
pub struct CandleEmbedder {
    encoder: Arc<BertEncoder>,
}

impl CandleEmbedder {
    /// Load the model from cache, downloading files if needed.
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = cache.ensure()?;
        Self::load_from_paths(&paths.config, &paths.tokenizer, &paths.weights)
    }

    /// Load with default cache settings.
    pub fn load_default() -> Result<Self, EmbeddingError> {
        Self::load(&ModelCache::default())
    }

    /// Load from explicit file paths.
    pub fn load_from_paths(
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self, EmbeddingError> {
        info!("Loading embedding model...");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(dim = EMBEDDING_DIM, max_seq = MAX_SEQ_LENGTH, "Model loaded");

        Ok(Self {
            encoder: Arc::new(BertEncoder {
                model,
                tokenizer,
                device,
            }),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for CandleEmbedder {
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "query text is empty".to_string(),
            ));
        }

        let encoder = self.encoder.clone();
        let owned = text.to_string();
        let values = tokio::task::spawn_blocking(move || encoder.encode(&owned))
            .await
            .map_err(|e| EmbeddingError::Task(e.to_string()))??;

        debug!(dim = values.len(), "Embedded query locally");
        Ok(Embedding::new(values))
    }
}
