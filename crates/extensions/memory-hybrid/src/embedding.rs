//! HTTP embedding provider for OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mnemo_memory_vector::{Embedding, EmbeddingError, EmbeddingProvider};

/// Configuration for HTTP embeddings.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingConfig {
    /// Base URL for API, without the `/embeddings` suffix.
    pub base_url: String,
    /// Model to use.
    pub model: String,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    /// Expected embedding dimension.
    pub dimension: usize,
}

impl HttpEmbeddingConfig {
    /// Create config for `base_url` with a 384-dimension default model.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: "all-MiniLM-L6-v2".to_string(),
            api_key: None,
            dimension: 384,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dimension = dim;
        self
    }
}

/// Embedding provider backed by a remote model server.
pub struct HttpEmbedding {
    client: reqwest::Client,
    config: HttpEmbeddingConfig,
}

impl HttpEmbedding {
    pub fn new(config: HttpEmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [&'a str],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let embeddings = self.embed_batch(&[text]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Failed("Empty response".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            input: texts,
            model: &self.config.model,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EmbeddingError::Failed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EmbeddingError::Failed(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Failed(format!("Parse error: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::Failed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|d| d.index);

        if let Some(bad) = parsed
            .data
            .iter()
            .find(|d| d.embedding.len() != self.config.dimension)
        {
            return Err(EmbeddingError::Failed(format!(
                "expected dimension {}, got {}",
                self.config.dimension,
                bad.embedding.len()
            )));
        }

        debug!("Generated {} embeddings via {}", parsed.data.len(), self.config.model);

        Ok(parsed
            .data
            .into_iter()
            .map(|d| Embedding::new(d.embedding))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
#[path = "embedding_tests.rs"]
mod tests;
