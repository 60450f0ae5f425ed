use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::error::{RecallError, RecallResult};

use super::EmbeddingClient;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";

/// Embedding client for an Ollama-compatible `/api/embeddings` endpoint.
pub struct OllamaEmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbeddingClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OllamaEmbeddingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> RecallResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecallError::EmbeddingService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RecallError::EmbeddingService(format!(
                "HTTP {status}: {text}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RecallError::EmbeddingService(e.to_string()))?;

        let vector: Vec<f32> = payload
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                RecallError::EmbeddingService("response missing 'embedding' field".into())
            })?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| {
                RecallError::EmbeddingService("non-numeric value in 'embedding'".into())
            })?;

        if vector.is_empty() {
            return Err(RecallError::EmbeddingService("empty embedding".into()));
        }

        debug!(dimension = vector.len(), "Generated embedding");
        Ok(vector)
    }
}
