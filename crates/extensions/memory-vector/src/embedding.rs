//! Embedding generation contract.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mnemo_protocols::RetrievalError;

/// Error type for embedding operations.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding failed: {0}")]
    Failed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<EmbeddingError> for RetrievalError {
    fn from(err: EmbeddingError) -> Self {
        RetrievalError::EmbeddingUnavailable(err.to_string())
    }
}

/// Embedding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Vector representation.
    pub vector: Vec<f32>,
    /// Dimension of the embedding.
    pub dimension: usize,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        let dimension = vector.len();
        Self { vector, dimension }
    }
}

/// Trait for embedding providers.
///
/// Output must be deterministic for identical input and model version. Swapping the
/// model invalidates every vector already stored.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for text.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;
}

/// Bag-of-words feature hashing embedding (not semantic).
///
/// Each lowercase alphanumeric token adds 1.0 to a hashed bucket; the result is
/// L2-normalised. Texts sharing more words end up closer together.
pub struct SimpleHashEmbedding {
    dimension: usize,
}

impl SimpleHashEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return Embedding::new(vector);
        }

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Embedding::new(vector)
    }
}

impl Default for SimpleHashEmbedding {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for SimpleHashEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(self.hash_text(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.hash_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
#[path = "embedding_tests.rs"]
mod tests;
