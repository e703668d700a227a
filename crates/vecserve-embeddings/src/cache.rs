//! Model file caching for the local backend.
//!
//! Downloads model files from HuggingFace Hub once and keeps them under
//! the user cache directory.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Default model repository on HuggingFace
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Files the local backend needs on disk
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Resolved on-disk locations of the model files.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

/// Local model file cache.
#[derive(Debug, Clone)]
pub struct ModelCache {
    /// Cache directory root
    pub cache_dir: PathBuf,
    /// Model repository ID
    pub repo_id: String,
}

impl Default for ModelCache {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("vecserve")
            .join("models");

        Self {
            cache_dir,
            repo_id: DEFAULT_MODEL_REPO.to_string(),
        }
    }
}

impl ModelCache {
    /// Create a cache with custom settings.
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Directory holding this model's files.
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// Whether every required file is already on disk.
    pub fn is_cached(&self) -> bool {
        let model_dir = self.model_dir();
        MODEL_FILES.iter().all(|f| model_dir.join(f).exists())
    }

    /// Resolve model file paths, downloading any that are missing.
    pub fn ensure(&self) -> Result<ModelPaths, EmbeddingError> {
        let model_dir = self.model_dir();

        if self.is_cached() {
            debug!(path = ?model_dir, "Using cached model");
        } else {
            info!(repo = %self.repo_id, "Downloading model files...");
            self.download()?;
        }

        Ok(ModelPaths {
            config: model_dir.join("config.json"),
            tokenizer: model_dir.join("tokenizer.json"),
            weights: model_dir.join("model.safetensors"),
        })
    }

    fn download(&self) -> Result<(), EmbeddingError> {
        use hf_hub::api::sync::Api;

        let api = Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
        let repo = api.model(self.repo_id.clone());

        std::fs::create_dir_all(self.model_dir())?;

        for filename in MODEL_FILES {
            info!(file = filename, "Downloading...");
            let source = repo
                .get(filename)
                .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;

            let dest = self.model_dir().join(filename);
            std::fs::copy(&source, &dest)?;
            debug!(file = filename, "Downloaded to {:?}", dest);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_default() {
        let cache = ModelCache::default();
        assert!(cache.cache_dir.to_string_lossy().contains("vecserve"));
        assert_eq!(cache.repo_id, DEFAULT_MODEL_REPO);
    }

    #[test]
    fn test_model_dir_flattens_repo_id() {
        let cache = ModelCache::new("/tmp/cache", "org/model");
        assert!(cache.model_dir().ends_with("org_model"));
    }

    #[test]
    fn test_is_cached_empty() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCache::new(temp.path(), "test/model");
        assert!(!cache.is_cached());
    }
}
