//! # vecserve-embeddings
//!
//! Embedding backends for vecserve.
//!
//! Turns query text into a fixed-dimension float vector through one of two
//! backends: a remote call to the Gemini embedContent API, or a local
//! Candle model (all-MiniLM-L6-v2). Exactly one backend is active per
//! deployment, selected at startup; the query path never branches on
//! backend identity.
//!
//! Vectors are handed to the index untouched. The index's distance metric
//! is opaque to this crate, so no normalization or re-ranking happens here.

pub mod cache;
pub mod candle;
pub mod error;
pub mod gemini;
pub mod provider;

pub use crate::candle::CandleEmbedder;
pub use cache::{ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use error::EmbeddingError;
pub use gemini::{GeminiConfig, GeminiEmbedder};
pub use provider::{Embedding, EmbeddingProvider};
