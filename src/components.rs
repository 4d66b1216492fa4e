//! Construction of the retrieval and cache components from configuration.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use mnemo_cache::{CacheManager, CacheOptions};
use mnemo_config::{CacheConfig, Config};
use mnemo_memory_hybrid::{HttpEmbedding, HttpEmbeddingConfig, HybridRetriever};
use mnemo_memory_sqlite::MetadataStore;
use mnemo_memory_vector::{EmbeddingProvider, SimpleHashEmbedding};
use mnemo_protocols::ScopeLabel;

/// Embedding provider selected by `embedding.provider`.
pub(crate) fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let dimension = config.retrieval.dimension;
    match config.embedding.provider.as_str() {
        "hash" => Ok(Arc::new(SimpleHashEmbedding::new(dimension))),
        "http" => {
            let base_url = config
                .embedding
                .base_url
                .clone()
                .context("embedding.base_url is required for the http provider")?;
            let mut http = HttpEmbeddingConfig::new(base_url).with_dimension(dimension);
            if let Some(model) = &config.embedding.model {
                http = http.with_model(model.clone());
            }
            if let Some(key) = &config.embedding.api_key {
                http = http.with_api_key(key.clone());
            }
            info!("Using HTTP embeddings from {}", http.base_url);
            Ok(Arc::new(HttpEmbedding::new(http)))
        }
        other => anyhow::bail!("unknown embedding provider '{}'", other),
    }
}

/// Open the metadata store and rebuild the retriever over it.
pub(crate) async fn open_retriever<S: ScopeLabel>(
    config: &Config,
) -> anyhow::Result<HybridRetriever<S>> {
    let path = &config.retrieval.metadata_path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let store = MetadataStore::<S>::open(path).await?;
    let retriever = HybridRetriever::open(store, build_embedder(config)?).await?;
    info!(
        "Retriever ready: {} documents in {}",
        retriever.len(),
        path.display()
    );
    Ok(retriever)
}

pub(crate) fn cache_options(config: &CacheConfig) -> CacheOptions {
    CacheOptions {
        url: config.url.clone(),
        default_ttl: config.default_ttl(),
        fallback: config.fallback,
        capacity: config.capacity,
    }
}

pub(crate) async fn open_cache(config: &CacheConfig) -> anyhow::Result<CacheManager> {
    Ok(CacheManager::connect(&cache_options(config)).await?)
}
