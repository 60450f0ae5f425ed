//! Embedding capability — text in, fixed-dimension float vector out.
//!
//! The `EmbeddingClient` trait is the seam the memory manager and document
//! indexer depend on; `OllamaEmbeddingClient` talks to an Ollama-compatible
//! embeddings endpoint. Failures always surface as
//! `RecallError::EmbeddingService` so callers can tell a service failure
//! from an empty result.

mod ollama;

pub use ollama::OllamaEmbeddingClient;

use crate::error::RecallResult;

/// Capability for turning text into a fixed-dimension vector.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> RecallResult<Vec<f32>>;
}
